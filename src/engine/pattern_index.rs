//! Pattern compilation and indexing.
//!
//! This module holds the *static* side of the engine: one compiled pattern per
//! table row, built once when the converter is constructed.
//!
//! Two kinds of index exist:
//!
//! - **Name index**: compiled from the `regex` column. Patterns are matched
//!   case-insensitively anywhere in the input (`Regex::is_match`), so a pattern
//!   can recognise a name inside a longer phrase.
//! - **Code index**: compiled from the `ISO2` column. Each `|` alternative of
//!   a cell is escaped and the whole set is anchored (`GB|UK` becomes
//!   `^(?:GB|UK)$`), so only the bare code matches.
//!
//! ## Invariants
//!
//! - `RowId` is an index into both the table rows and `PatternIndex::patterns`.
//!   Those vectors must stay aligned; the index is rebuilt whenever the table is.
//! - A row with a missing cell has no pattern (`None`) and never matches.

use regex::{Regex, RegexBuilder};
use tracing::{trace, warn};

use crate::error::{CocoError, Result};
use crate::table::ClassificationTable;

// --- Pattern index -----------------------------------------------------------

/// Row identifier (index into the table rows and the pattern vector).
pub(crate) type RowId = usize;

#[derive(Debug, Clone)]
pub(crate) struct PatternIndex {
    column: String,
    patterns: Vec<Option<Regex>>,
}

impl PatternIndex {
    /// Compile every cell of a pattern column as a case-insensitive regex.
    ///
    /// An invalid pattern aborts construction with [`CocoError::InvalidPattern`].
    pub(crate) fn from_regex_column(table: &ClassificationTable, col: usize) -> Result<Self> {
        let column = table.columns()[col].clone();
        let mut patterns = Vec::with_capacity(table.len());
        for (row, value) in table.column_values(col).enumerate() {
            let Some(pattern) = (!value.is_missing()).then(|| value.to_string()) else {
                warn!(column = %column, row, "row has no pattern and can never match by name");
                patterns.push(None);
                continue;
            };
            let compiled = compile(&pattern)
                .map_err(|source| CocoError::InvalidPattern { column: column.clone(), row, pattern, source })?;
            patterns.push(Some(compiled));
        }
        Ok(PatternIndex { column, patterns })
    }

    /// Compile every cell of a code column as an anchored set of literal
    /// alternatives.
    pub(crate) fn from_code_column(table: &ClassificationTable, col: usize) -> Result<Self> {
        let column = table.columns()[col].clone();
        let mut patterns = Vec::with_capacity(table.len());
        for (row, value) in table.column_values(col).enumerate() {
            let compiled = match value.match_text().as_deref().and_then(anchored_alternatives) {
                Some(pattern) => Some(compile(&pattern).map_err(|source| CocoError::InvalidPattern {
                    column: column.clone(),
                    row,
                    pattern,
                    source,
                })?),
                None => None,
            };
            patterns.push(compiled);
        }
        Ok(PatternIndex { column, patterns })
    }

    pub(crate) fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Compiled patterns with their row ids, skipping rows without one.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (RowId, &Regex)> + '_ {
        self.patterns.iter().enumerate().filter_map(|(row, p)| p.as_ref().map(|re| (row, re)))
    }

    /// Rows whose pattern matches `text`, in row order.
    pub(crate) fn matching_rows(&self, text: &str) -> Vec<RowId> {
        let rows: Vec<RowId> = self.iter().filter(|(_, re)| re.is_match(text)).map(|(row, _)| row).collect();
        trace!(column = %self.column, text, ?rows, "pattern scan");
        rows
    }
}

fn compile(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// `"GB|UK"` -> `"^(?:GB|UK)$"`. Alternatives are reduced to their
/// alphanumeric characters and escaped; `None` if nothing is left.
fn anchored_alternatives(cell: &str) -> Option<String> {
    let alternatives: Vec<String> = cell
        .split('|')
        .map(|alt| alt.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|alt| !alt.is_empty())
        .map(|alt| regex::escape(&alt))
        .collect();
    if alternatives.is_empty() { None } else { Some(format!("^(?:{})$", alternatives.join("|"))) }
}
