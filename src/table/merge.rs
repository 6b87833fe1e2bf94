//! Merging additional tables and enforcing unique name/pattern columns.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::{ClassificationTable, CountryRecord};
use crate::Value;
use crate::scheme::UNIQUE_COLUMNS;

/// Append `extra` tables to `base`. Columns are the union in first-seen
/// order; cells a table does not provide are missing.
pub(crate) fn merge_tables(base: ClassificationTable, extra: Vec<ClassificationTable>) -> ClassificationTable {
    if extra.is_empty() {
        return base;
    }
    let mut columns = base.columns.clone();
    for table in &extra {
        for col in &table.columns {
            if !columns.contains(col) {
                columns.push(col.clone());
            }
        }
    }

    let mut merged = ClassificationTable::new(columns);
    for table in std::iter::once(base).chain(extra) {
        let positions: Vec<Option<usize>> = merged.columns.iter().map(|c| table.column_index(c)).collect();
        for row in table.rows {
            let values = positions.iter().map(|pos| pos.map_or(Value::Missing, |p| row.get(p).clone())).collect();
            merged.push(CountryRecord::new(values));
        }
    }
    merged
}

/// Log every value repeated within a unique column. Returns the number of
/// duplicated values found.
pub(crate) fn report_duplicates(table: &ClassificationTable, origin: &str) -> usize {
    let mut found = 0;
    for col_name in UNIQUE_COLUMNS {
        let Some(col) = table.column_index(col_name) else { continue };
        let mut counts: HashMap<&Value, usize> = HashMap::new();
        let mut order = Vec::new();
        for value in table.column_values(col).filter(|v| !v.is_missing()) {
            let n = counts.entry(value).or_insert(0);
            if *n == 1 {
                order.push(value);
            }
            *n += 1;
        }
        for value in order {
            warn!(column = col_name, value = %value, origin = origin, "duplicated entry in country data");
            found += 1;
        }
    }
    found
}

/// Drop rows whose unique-column value reappears further down, so the last
/// occurrence wins. Columns are processed in turn.
pub(crate) fn drop_duplicates_keep_last(table: &mut ClassificationTable) {
    for col_name in UNIQUE_COLUMNS {
        let Some(col) = table.column_index(col_name) else { continue };
        let mut seen = HashSet::new();
        let mut keep: Vec<bool> = table
            .rows
            .iter()
            .rev()
            .map(|row| {
                let value = row.get(col);
                value.is_missing() || seen.insert(value.clone())
            })
            .collect();
        keep.reverse();
        table.retain_by_index(&keep);
    }
}
