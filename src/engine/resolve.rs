//! Name resolution.
//!
//! Scanning produces an [`InputScan`]; resolution turns it into table rows and
//! then into user-facing values:
//!
//! ```text
//! InputScan ──┬─ pattern scheme (regex, ISO2) ──▶ PatternIndex::matching_rows
//!             └─ any other column            ──▶ exact token comparison
//!                                   │
//!                                   v
//!                     rows ──▶ target values ──▶ Resolution
//!                               - de-duplicate
//!                               - clean alphabetic codes
//!                               - integerize numbers
//!                               - fill when nothing matched
//! ```
//!
//! Multiple pattern matches are logged and all values are kept; a converter
//! built in strict mode turns them into [`CocoError::AmbiguousMatch`] instead.

use std::time::Instant;

use tracing::{debug, warn};

use super::metrics::{MatchFlags, NameTrace};
use super::pattern_index::{PatternIndex, RowId};
use super::scan::{Exclusions, InputScan, ShapeMask};
use crate::api::Resolution;
use crate::error::{CocoError, Result};
use crate::scheme::{self, NAME_SHORT, REGEX};
use crate::table::ClassificationTable;
use crate::Value;

/// Borrowed view of a converter's table and indexes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resolver<'a> {
    pub table: &'a ClassificationTable,
    pub regexes: &'a PatternIndex,
    pub codes: Option<&'a PatternIndex>,
    pub strict: bool,
}

/// Per-call settings shared by every name of one conversion.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConvertPlan<'p> {
    /// Canonical source column; `None` infers it per name.
    pub src: Option<&'p str>,
    pub to_col: usize,
    pub to_alpha: bool,
    /// Fill for unmatched names; `None` echoes the resolved head.
    pub not_found: Option<&'p str>,
    pub enforce_list: bool,
    pub exclusions: &'p Exclusions,
}

impl<'a> Resolver<'a> {
    /// Resolve one name. The trace is only built when `trace` is set.
    pub(crate) fn resolve(
        &self,
        name: &str,
        plan: &ConvertPlan<'_>,
        trace: bool,
    ) -> Result<(Resolution, Option<NameTrace>)> {
        let started = trace.then(Instant::now);
        let scan = InputScan::scan(name, plan.exclusions);
        let mut flags = MatchFlags::empty();
        if scan.shape.contains(ShapeMask::EXCLUDED) {
            flags |= MatchFlags::EXCLUDED;
        }

        let source = match plan.src {
            Some(src) => src.to_string(),
            None => {
                flags |= MatchFlags::INFERRED_SOURCE;
                let inferred = scheme::validate(scan.inferred_source(), self.table.columns())?;
                debug!(name = %scan.head, source = %inferred, "inferred source scheme");
                inferred
            }
        };

        let (rows, pattern) = if scan.shape.contains(ShapeMask::EMPTY) {
            (Vec::new(), scheme::is_pattern_scheme(&source))
        } else {
            self.rows_for(&scan.head, &source)?
        };
        if pattern {
            flags |= MatchFlags::PATTERN;
        }
        if pattern && rows.len() > 1 {
            flags |= MatchFlags::MULTIPLE;
            if self.strict {
                return Err(CocoError::AmbiguousMatch { name: scan.head, scheme: source, matches: rows.len() });
            }
            warn!("More than one pattern match for {}", scan.head);
        }

        let resolution = if rows.is_empty() {
            flags |= MatchFlags::NOT_FOUND;
            warn!("{} not found in {}", scan.head, source);
            let fill = Value::from(plan.not_found.filter(|s| !s.is_empty()).unwrap_or(scan.head.as_str()));
            if plan.enforce_list { Resolution::Many(vec![fill]) } else { Resolution::One(fill) }
        } else {
            let values = shape_values(self.table, &rows, plan.to_col, plan.to_alpha);
            Resolution::from_values(values, plan.enforce_list)
        };

        let details = started.map(|started| {
            let labels = match self.table.column_index(NAME_SHORT) {
                Some(col) => rows.iter().map(|&r| self.table.value(r, col).to_string()).collect(),
                None => Vec::new(),
            };
            NameTrace {
                input: name.to_string(),
                head: scan.head.clone(),
                excluded: scan.excluded.clone(),
                source: source.clone(),
                rows: rows.clone(),
                labels,
                flags,
                elapsed: started.elapsed(),
            }
        });
        Ok((resolution, details))
    }

    /// Rows matching `head` in the canonical `source` column, and whether a
    /// pattern index was used.
    pub(crate) fn rows_for(&self, head: &str, source: &str) -> Result<(Vec<RowId>, bool)> {
        if scheme::is_pattern_scheme(source) {
            let index = if source.eq_ignore_ascii_case(REGEX) { Some(self.regexes) } else { self.codes };
            if let Some(index) = index {
                return Ok((index.matching_rows(head), true));
            }
        }
        let col = self.table.column_index(source).ok_or_else(|| CocoError::UnknownScheme(source.to_string()))?;
        Ok((exact_rows(self.table, col, head), false))
    }
}

/// Rows whose cell equals `head` as a whole token (case-insensitive; each `|`
/// alternative is a token; integers compare numerically).
pub(crate) fn exact_rows(table: &ClassificationTable, col: usize, head: &str) -> Vec<RowId> {
    let Some(wanted) = Value::from(head.trim()).match_text().map(|s| s.to_lowercase()) else {
        return Vec::new();
    };
    let wanted_num = wanted.parse::<i64>().ok();
    table
        .column_values(col)
        .enumerate()
        .filter(|(_, value)| {
            value.match_text().is_some_and(|text| {
                text.split('|').map(str::trim).any(|tok| {
                    tok.to_lowercase() == wanted || (wanted_num.is_some() && tok.parse::<i64>().ok() == wanted_num)
                })
            })
        })
        .map(|(row, _)| row)
        .collect()
}

/// Target values of `rows`, de-duplicated in first-occurrence order.
pub(crate) fn shape_values(table: &ClassificationTable, rows: &[RowId], to_col: usize, to_alpha: bool) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(rows.len());
    for &row in rows {
        let mut value = table.value(row, to_col).clone();
        if to_alpha {
            value = clean_alpha_code(value);
        }
        let value = value.integerized();
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

/// `"GB|UK"` -> `"GB"`, `"^NA$"` -> `"NA"`, upper-cased.
pub(crate) fn clean_alpha_code(value: Value) -> Value {
    match value {
        Value::Text(s) => {
            let first = s.split('|').next().unwrap_or_default();
            Value::Text(first.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_uppercase())
        }
        other => other,
    }
}

/// Whether output values of `column` are alphabetic codes.
pub(crate) fn is_alpha_target(column: &str) -> bool {
    scheme::is_alpha_code(column)
}
