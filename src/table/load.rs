//! Table sources and the TSV reader.
//!
//! Country data is a tab-separated file with a header row. Cells of the
//! text columns (names, patterns, alphabetic codes, region labels) are kept
//! verbatim; every other cell is typed on load (integer, then float, then
//! text), and empty cells become [`Value::Missing`].

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use tracing::debug;

use super::{ClassificationTable, CountryRecord, is_text_column};
use crate::Value;
use crate::error::{CocoError, Result};
use crate::scheme::REQUIRED_COLUMNS;

/// The sample country table compiled into the crate.
pub static BUNDLED_COUNTRY_DATA: &str = include_str!("../../data/country_data.tsv");

/// Where a classification table comes from.
#[derive(Debug, Clone, Default)]
pub enum TableSource {
    /// [`BUNDLED_COUNTRY_DATA`].
    #[default]
    Bundled,
    /// A TSV file on disk.
    Path(PathBuf),
    /// TSV text held in memory.
    Tsv(String),
    /// A table that is already built.
    Table(ClassificationTable),
}

impl TableSource {
    /// Short description used in log lines and errors.
    pub fn origin(&self) -> String {
        match self {
            TableSource::Bundled => "bundled country data".to_string(),
            TableSource::Path(p) => p.display().to_string(),
            TableSource::Tsv(_) => "inline tsv".to_string(),
            TableSource::Table(_) => "in-memory table".to_string(),
        }
    }

    pub fn load(&self) -> Result<ClassificationTable> {
        let origin = self.origin();
        let table = match self {
            TableSource::Bundled => read_tsv(BUNDLED_COUNTRY_DATA.as_bytes(), &origin)?,
            TableSource::Path(path) => {
                let file = File::open(path).map_err(|source| CocoError::Io { path: path.clone(), source })?;
                read_tsv(file, &origin)?
            }
            TableSource::Tsv(text) => read_tsv(text.as_bytes(), &origin)?,
            TableSource::Table(table) => {
                check_required(table.columns(), &origin)?;
                table.clone()
            }
        };
        debug!(origin = %origin, rows = table.len(), columns = table.columns().len(), "loaded country table");
        Ok(table)
    }
}

impl From<PathBuf> for TableSource {
    fn from(path: PathBuf) -> Self {
        TableSource::Path(path)
    }
}

impl From<ClassificationTable> for TableSource {
    fn from(table: ClassificationTable) -> Self {
        TableSource::Table(table)
    }
}

/// Read a tab-separated table with a header row.
///
/// ```
/// use country_converter::read_tsv;
///
/// let tsv = "name_short\tname_official\tregex\tISO3\nxxx\tRepublic of xxx\txxx\tXXX\n";
/// let table = read_tsv(tsv.as_bytes(), "inline").unwrap();
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.value(0, 3), "XXX");
/// ```
pub fn read_tsv<R: Read>(reader: R, origin: &str) -> Result<ClassificationTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let csv_err = |source: csv::Error| CocoError::Csv { origin: origin.to_string(), source };

    let columns: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(CocoError::EmptyTable { origin: origin.to_string() });
    }
    check_required(&columns, origin)?;

    let text_cols: Vec<bool> = columns.iter().map(|c| is_text_column(c)).collect();
    let mut table = ClassificationTable::new(columns);
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let values =
            text_cols.iter().enumerate().map(|(idx, &keep)| Value::parse_cell(record.get(idx).unwrap_or(""), keep));
        table.push(CountryRecord::new(values.collect()));
    }
    Ok(table)
}

fn check_required(columns: &[String], origin: &str) -> Result<()> {
    match REQUIRED_COLUMNS.iter().find(|req| !columns.iter().any(|c| c == *req)) {
        Some(missing) => Err(CocoError::MissingColumn { column: missing.to_string(), origin: origin.to_string() }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bundled_table_has_required_columns() {
        let table = TableSource::Bundled.load().unwrap();
        for col in REQUIRED_COLUMNS {
            assert!(table.column_index(col).is_some(), "missing {col}");
        }
        assert_eq!(table.len(), 42);
    }

    #[test]
    fn namibia_code_is_not_missing() {
        let table = TableSource::Bundled.load().unwrap();
        let iso2 = table.column_index("ISO2").unwrap();
        assert!(table.column_values(iso2).any(|v| v == "NA"));
    }

    #[test]
    fn missing_required_column() {
        let err = read_tsv("name_short\tregex\nxxx\txxx\n".as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, CocoError::MissingColumn { ref column, .. } if column == "name_official"));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(read_tsv("".as_bytes(), "inline"), Err(CocoError::EmptyTable { .. })));
    }

    #[test]
    fn short_rows_are_padded_and_bom_stripped() {
        let tsv = "\u{feff}name_short\tname_official\tregex\tOECD\nxxx\tRepublic of xxx\txxx\n";
        let table = read_tsv(tsv.as_bytes(), "inline").unwrap();
        assert_eq!(table.columns()[0], "name_short");
        assert!(table.value(0, 3).is_missing());
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name_short\tname_official\tregex\tISO3\tpop").unwrap();
        writeln!(file, "xxx country\tRepublic of xxx\txxx\tXXX\t1.5").unwrap();
        let table = TableSource::Path(file.path().to_path_buf()).load().unwrap();
        assert_eq!(table.value(0, 4), &Value::Float(1.5));
    }

    #[test]
    fn unreadable_path() {
        let err = TableSource::Path(PathBuf::from("/nonexistent/coco.tsv")).load().unwrap_err();
        assert!(matches!(err, CocoError::Io { .. }));
    }
}
