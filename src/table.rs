//! Classification table.
//!
//! One row per country or region, one column per classification scheme.
//! Rows are plain value vectors aligned with the header, so a row id indexes
//! both the table and every pattern index built from it.
//!
//! ```text
//!  row id   name_short   regex        ISO2     ISO3   ...
//!    0      Argentina    argentin     AR       ARG
//!    1      Australia    australia    AU       AUS
//!   ...
//!  PatternIndex[row id] ── compiled from the `regex` cell of the same row
//! ```
//!
//! Construction (loading, filtering, merging, de-duplication) happens once in
//! [`crate::CountryConverter::with_options`]; afterwards the table is read-only.

#[path = "table/load.rs"]
mod load;
#[path = "table/merge.rs"]
mod merge;

pub use load::{BUNDLED_COUNTRY_DATA, TableSource, read_tsv};
pub(crate) use merge::{drop_duplicates_keep_last, merge_tables, report_duplicates};

use crate::error::{CocoError, Result};
use crate::{Value, scheme};

static MISSING: Value = Value::Missing;

/// One table row. Values are positionally aligned with the table header.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRecord {
    values: Vec<Value>,
}

impl CountryRecord {
    pub fn new(values: Vec<Value>) -> Self {
        CountryRecord { values }
    }

    /// Value at column position `col`; missing when out of range.
    pub fn get(&self, col: usize) -> &Value {
        self.values.get(col).unwrap_or(&MISSING)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationTable {
    columns: Vec<String>,
    rows: Vec<CountryRecord>,
}

impl ClassificationTable {
    /// An empty table with the given header.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ClassificationTable { columns: columns.into_iter().map(Into::into).collect(), rows: Vec::new() }
    }

    /// Build a table from raw text cells, typed the same way as loaded files.
    ///
    /// ```
    /// use country_converter::ClassificationTable;
    ///
    /// let table = ClassificationTable::from_text_rows(
    ///     &["name_short", "name_official", "regex", "ISO3"],
    ///     &[&["xxx country", "longer xxx country name", "xxx country", "XXX"]],
    /// );
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn from_text_rows(columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = ClassificationTable::new(columns.iter().copied());
        for raw in rows {
            let values = columns
                .iter()
                .enumerate()
                .map(|(idx, col)| Value::parse_cell(raw.get(idx).copied().unwrap_or(""), is_text_column(col)))
                .collect();
            table.push(CountryRecord::new(values));
        }
        table
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push(&mut self, mut record: CountryRecord) {
        record.values.resize(self.columns.len(), Value::Missing);
        self.rows.push(record);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column, exact spelling.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CountryRecord] {
        &self.rows
    }

    pub fn value(&self, row: usize, col: usize) -> &Value {
        self.rows.get(row).map(|r| r.get(col)).unwrap_or(&MISSING)
    }

    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |r| r.get(col))
    }

    /// Distinct non-missing values of a column, in row order.
    pub fn distinct_values(&self, col: usize) -> Vec<Value> {
        let mut seen = std::collections::HashSet::new();
        self.column_values(col).filter(|v| !v.is_missing() && seen.insert(*v)).cloned().collect::<Vec<Value>>()
    }

    /// Boolean row mask from a predicate on one column.
    ///
    /// ```
    /// use country_converter::{CountryConverter, member_before};
    ///
    /// let cc = CountryConverter::new().unwrap();
    /// let early_oecd = cc.data().mask_where("OECD", member_before(1970)).unwrap();
    /// assert_eq!(early_oecd.len(), cc.data().len());
    /// ```
    pub fn mask_where(&self, column: &str, predicate: impl Fn(&Value) -> bool) -> Result<Vec<bool>> {
        let col = self.resolve_column(column)?;
        Ok(self.column_values(col).map(predicate).collect())
    }

    /// Column position for a scheme name (case-insensitive, aliases allowed).
    pub(crate) fn resolve_column(&self, name: &str) -> Result<usize> {
        let canonical = scheme::validate(name, &self.columns)?;
        self.column_index(&canonical).ok_or(CocoError::UnknownScheme(canonical))
    }

    pub(crate) fn retain_rows(&mut self, keep: impl Fn(&CountryRecord) -> bool) {
        self.rows.retain(|r| keep(r));
    }

    pub(crate) fn retain_by_index(&mut self, keep: &[bool]) {
        let mut idx = 0;
        self.rows.retain(|_| {
            let k = keep.get(idx).copied().unwrap_or(true);
            idx += 1;
            k
        });
    }
}

pub(crate) fn is_text_column(name: &str) -> bool {
    scheme::TEXT_COLUMNS.contains(&name)
}
