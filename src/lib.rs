//! Country classification converter.
//!
//! Resolves country identifiers (names in many spellings, ISO codes, numeric
//! codes, custom regional aggregates) to values of a target classification
//! scheme, using a reference table with one compiled pattern per country.
//!
//! ```
//! use country_converter::{ConvertOptions, CountryConverter};
//!
//! let cc = CountryConverter::new().unwrap();
//! let out = cc.convert("Federal Republic of Germany", &ConvertOptions::default()).unwrap();
//! assert_eq!(out, "DEU");
//! ```

#[macro_use]
mod macros;
mod aggregate;
mod api;
mod converter;
mod correspondence;
mod engine;
mod error;
mod matcher;
mod scheme;
mod table;
#[cfg(test)]
mod test_log;

pub use aggregate::{
    AggOptions, AggregateMapping, AggregatePair, Aggregation, ConcordanceMatrix, Entities, MissingPolicy,
};
pub use api::{
    ConvertDetails, ConvertOptions, ConvertOutput, ConvertRun, DEFAULT_EXCLUDE_PREFIX, MatchOptions, NameInput,
    Resolution, agg_conc, convert, convert_verbose, default_converter, match_names,
};
pub use converter::{ConverterOptions, CountryConverter, is_member, member_before};
pub use correspondence::{Correspondence, CorrespondenceOptions};
pub use engine::{MatchFlags, NameTrace};
pub use error::{CocoError, Result};
pub use scheme::{SCHEME_ALIASES, canonical_alias};
pub use table::{BUNDLED_COUNTRY_DATA, ClassificationTable, CountryRecord, TableSource, read_tsv};

use std::fmt;
use std::hash::{Hash, Hasher};

// --- Cell values ------------------------------------------------------------

/// A single cell of the classification table.
///
/// Text cells may carry several `|`-delimited alternatives (`"GB|UK"`).
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Interpret a raw cell. `keep_text` columns never become numbers, so
    /// codes like `"NA"` or `"040"` survive loading untouched.
    pub(crate) fn parse_cell(raw: &str, keep_text: bool) -> Value {
        if raw.is_empty() {
            return Value::Missing;
        }
        if keep_text {
            return Value::Text(raw.to_string());
        }
        if matches!(raw, "nan" | "NaN" | "NA" | "N/A" | "null") {
            return Value::Missing;
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Value::Int(i);
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Value::Float(f),
            _ => Value::Text(raw.to_string()),
        }
    }

    /// Text used for exact (whole-token) comparisons: numbers lose a
    /// trailing decimal part (`40.0` -> `40`).
    pub(crate) fn match_text(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(match regex!(r"^(-?\d+)\.0*$").captures(s) {
                Some(caps) => caps[1].to_string(),
                None => s.clone(),
            }),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
            Value::Float(f) => Some(f.to_string()),
            Value::Missing => None,
        }
    }

    /// Convert numeric-looking values to integers, leave everything else.
    pub(crate) fn integerized(self) -> Value {
        match self {
            Value::Text(s) => match s.trim().parse::<i64>() {
                Ok(i) => Value::Int(i),
                Err(_) => Value::Text(s),
            },
            Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::Int(f as i64),
            other => other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Missing => f.write_str("NaN"),
        }
    }
}

// Floats compare and hash by bit pattern so values can key a map.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Missing, Value::Missing) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Missing => {}
        }
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, Value::Int(i) if i == other)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}
