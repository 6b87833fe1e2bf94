//! Correspondence between two classification columns.

use indexmap::IndexMap;

use crate::error::{CocoError, Result};
use crate::{CountryConverter, Value};

/// Value of scheme A -> distinct values of scheme B over the rows carrying it.
pub type Correspondence = IndexMap<Value, Vec<Value>>;

/// Options for [`CountryConverter::get_correspondence_dict`].
#[derive(Debug, Clone, PartialEq)]
pub struct CorrespondenceOptions {
    /// Row mask; only flagged rows contribute values. Must match the table length.
    pub restrict: Option<Vec<bool>>,
    /// Replace numeric B values with the name of scheme B (`1995` -> `"EU"`).
    pub replace_numeric: bool,
    /// Same replacement for numeric A values.
    pub replace_numeric_keys: bool,
    /// Keep missing values, shown as this sentinel.
    pub replace_nan: Option<Value>,
}

impl Default for CorrespondenceOptions {
    fn default() -> Self {
        Self { restrict: None, replace_numeric: true, replace_numeric_keys: false, replace_nan: None }
    }
}

impl CorrespondenceOptions {
    pub fn with_restrict(mut self, mask: Vec<bool>) -> Self {
        self.restrict = Some(mask);
        self
    }

    pub fn with_replace_numeric(mut self, replace: bool) -> Self {
        self.replace_numeric = replace;
        self
    }

    pub fn with_replace_numeric_keys(mut self, replace: bool) -> Self {
        self.replace_numeric_keys = replace;
        self
    }

    pub fn with_replace_nan(mut self, sentinel: impl Into<Value>) -> Self {
        self.replace_nan = Some(sentinel.into());
        self
    }
}

impl CountryConverter {
    /// Correspondence from `class_a` to `class_b`.
    ///
    /// Keys are every distinct value of `class_a` in table order; a key whose
    /// rows are all masked out by `restrict` maps to an empty list.
    ///
    /// ```
    /// use country_converter::{CorrespondenceOptions, CountryConverter, Value};
    ///
    /// let cc = CountryConverter::new().unwrap();
    /// let eu = cc.get_correspondence_dict("ISO3", "EU", &CorrespondenceOptions::default()).unwrap();
    /// assert_eq!(eu[&Value::from("AUT")], vec![Value::from("EU")]);
    /// assert!(eu[&Value::from("USA")].is_empty());
    /// ```
    pub fn get_correspondence_dict(
        &self,
        class_a: &str,
        class_b: &str,
        options: &CorrespondenceOptions,
    ) -> Result<Correspondence> {
        let table = &self.table;
        let col_a = table.resolve_column(class_a)?;
        let col_b = table.resolve_column(class_b)?;
        let name_a = &table.columns()[col_a];
        let name_b = &table.columns()[col_b];

        if let Some(mask) = &options.restrict {
            if mask.len() != table.len() {
                return Err(CocoError::MaskLength { expected: table.len(), got: mask.len() });
            }
        }

        let key_of = |value: &Value| replace(value, options.replace_numeric_keys, name_a, &options.replace_nan);
        let value_of = |value: &Value| replace(value, options.replace_numeric, name_b, &options.replace_nan);

        let mut out = Correspondence::new();
        for row in table.rows() {
            if let Some(key) = key_of(row.get(col_a)) {
                out.entry(key).or_default();
            }
        }

        for (idx, row) in table.rows().iter().enumerate() {
            let selected = options.restrict.as_ref().is_none_or(|mask| mask[idx]);
            if !selected {
                continue;
            }
            let (Some(key), Some(value)) = (key_of(row.get(col_a)), value_of(row.get(col_b))) else { continue };
            let values = out.entry(key).or_default();
            if !values.contains(&value) {
                values.push(value);
            }
        }
        Ok(out)
    }
}

/// Apply the numeric/missing replacement policy to one cell. `None` drops it.
fn replace(value: &Value, numeric: bool, scheme: &str, nan: &Option<Value>) -> Option<Value> {
    match value {
        Value::Missing => nan.clone(),
        v if numeric && v.is_numeric() => Some(Value::from(scheme)),
        v => Some(v.clone()),
    }
}
