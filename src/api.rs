use crate::aggregate::{AggOptions, AggregateMapping, Aggregation, Entities};
use crate::engine::NameTrace;
use crate::{CocoError, CountryConverter, Result, Value};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::time::Duration;

pub use crate::engine::DEFAULT_EXCLUDE_PREFIX;

static DEFAULT_CONVERTER: OnceCell<CountryConverter> = OnceCell::new();

/// The converter over the bundled data, built on first use and shared.
pub fn default_converter() -> Result<&'static CountryConverter> {
    DEFAULT_CONVERTER.get_or_try_init(CountryConverter::new)
}

// --- Inputs ------------------------------------------------------------------

/// Accepted shapes for the names passed to [`convert`].
///
/// Numbers are stringified before resolution. Floats are rejected with
/// [`CocoError::InvalidInput`]: a country code is never fractional.
#[derive(Debug, Clone, PartialEq)]
pub enum NameInput {
    One(String),
    Many(Vec<String>),
    Set(BTreeSet<String>),
    Code(i64),
    Codes(Vec<i64>),
    Float(f64),
    Floats(Vec<f64>),
}

impl NameInput {
    /// Normalize to an ordered sequence of strings.
    pub fn into_strings(self) -> Result<Vec<String>> {
        match self {
            NameInput::One(s) => Ok(vec![s]),
            NameInput::Many(v) => Ok(v),
            NameInput::Set(s) => Ok(s.into_iter().collect()),
            NameInput::Code(i) => Ok(vec![i.to_string()]),
            NameInput::Codes(v) => Ok(v.into_iter().map(|i| i.to_string()).collect()),
            NameInput::Float(f) => Err(CocoError::InvalidInput(format!("float {f} is not a country name or code"))),
            NameInput::Floats(v) => {
                Err(CocoError::InvalidInput(format!("{} floats are not country names or codes", v.len())))
            }
        }
    }
}

impl From<&str> for NameInput {
    fn from(s: &str) -> Self {
        NameInput::One(s.to_string())
    }
}

impl From<String> for NameInput {
    fn from(s: String) -> Self {
        NameInput::One(s)
    }
}

impl From<&String> for NameInput {
    fn from(s: &String) -> Self {
        NameInput::One(s.clone())
    }
}

impl From<Vec<&str>> for NameInput {
    fn from(v: Vec<&str>) -> Self {
        NameInput::Many(v.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for NameInput {
    fn from(v: Vec<String>) -> Self {
        NameInput::Many(v)
    }
}

impl From<&[&str]> for NameInput {
    fn from(v: &[&str]) -> Self {
        NameInput::Many(v.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for NameInput {
    fn from(v: [&str; N]) -> Self {
        NameInput::Many(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<BTreeSet<String>> for NameInput {
    fn from(s: BTreeSet<String>) -> Self {
        NameInput::Set(s)
    }
}

// Hash sets have no order; sort them so output order is stable.
impl From<HashSet<String>> for NameInput {
    fn from(s: HashSet<String>) -> Self {
        NameInput::Set(s.into_iter().collect())
    }
}

impl From<i64> for NameInput {
    fn from(i: i64) -> Self {
        NameInput::Code(i)
    }
}

impl From<i32> for NameInput {
    fn from(i: i32) -> Self {
        NameInput::Code(i.into())
    }
}

impl From<u32> for NameInput {
    fn from(i: u32) -> Self {
        NameInput::Code(i.into())
    }
}

impl From<Vec<i64>> for NameInput {
    fn from(v: Vec<i64>) -> Self {
        NameInput::Codes(v)
    }
}

impl From<f64> for NameInput {
    fn from(f: f64) -> Self {
        NameInput::Float(f)
    }
}

impl From<f32> for NameInput {
    fn from(f: f32) -> Self {
        NameInput::Float(f.into())
    }
}

impl From<Vec<f64>> for NameInput {
    fn from(v: Vec<f64>) -> Self {
        NameInput::Floats(v)
    }
}

// --- Options -----------------------------------------------------------------

/// Options for [`convert`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Source scheme. `None` infers it from each name.
    pub src: Option<String>,
    /// Target scheme.
    pub to: String,
    /// Always return lists, even for a single name or a single match.
    pub enforce_list: bool,
    /// Fill for unmatched names. `None` or empty echoes the name.
    pub not_found: Option<String>,
    /// Markers that cut off the rest of a name before resolution.
    pub exclude_prefix: Vec<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            src: None,
            to: "ISO3".to_string(),
            enforce_list: false,
            not_found: Some("not found".to_string()),
            exclude_prefix: DEFAULT_EXCLUDE_PREFIX.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ConvertOptions {
    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to = to.into();
        self
    }

    pub fn with_enforce_list(mut self, enforce: bool) -> Self {
        self.enforce_list = enforce;
        self
    }

    pub fn with_not_found(mut self, fill: Option<&str>) -> Self {
        self.not_found = fill.map(str::to_string);
        self
    }

    pub fn with_exclude_prefix<S: AsRef<str>>(mut self, prefixes: &[S]) -> Self {
        self.exclude_prefix = prefixes.iter().map(|p| p.as_ref().to_string()).collect();
        self
    }
}

/// Options for [`match_names`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    /// Fill for entries without a counterpart. `None` or empty echoes the entry.
    pub not_found: Option<String>,
    /// Always map to a list.
    pub enforce_sublist: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self { not_found: Some("not_found".to_string()), enforce_sublist: false }
    }
}

impl MatchOptions {
    pub fn with_not_found(mut self, fill: Option<&str>) -> Self {
        self.not_found = fill.map(str::to_string);
        self
    }

    pub fn with_enforce_sublist(mut self, enforce: bool) -> Self {
        self.enforce_sublist = enforce;
        self
    }
}

// --- Results -----------------------------------------------------------------

/// Outcome for one name: a single value, or a list when several rows matched
/// (or a list was enforced).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    One(Value),
    Many(Vec<Value>),
}

impl Resolution {
    pub(crate) fn from_values(mut values: Vec<Value>, enforce_list: bool) -> Self {
        if values.len() == 1 && !enforce_list {
            Resolution::One(values.remove(0))
        } else {
            Resolution::Many(values)
        }
    }

    pub fn values(&self) -> &[Value] {
        match self {
            Resolution::One(v) => std::slice::from_ref(v),
            Resolution::Many(v) => v,
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, Resolution::Many(_))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::One(v) => write!(f, "{v}"),
            Resolution::Many(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl PartialEq<&str> for Resolution {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Resolution::One(v) if v == other)
    }
}

impl PartialEq<i64> for Resolution {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, Resolution::One(v) if v == other)
    }
}

/// Result of [`convert`]: one resolution for a single name, one per name
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutput {
    Single(Resolution),
    Batch(Vec<Resolution>),
}

impl ConvertOutput {
    pub fn into_vec(self) -> Vec<Resolution> {
        match self {
            ConvertOutput::Single(r) => vec![r],
            ConvertOutput::Batch(v) => v,
        }
    }

    pub fn as_single(&self) -> Option<&Resolution> {
        match self {
            ConvertOutput::Single(r) => Some(r),
            ConvertOutput::Batch(_) => None,
        }
    }
}

/// Resolutions separated by single spaces.
impl fmt::Display for ConvertOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertOutput::Single(r) => write!(f, "{r}"),
            ConvertOutput::Batch(v) => {
                let parts: Vec<String> = v.iter().map(|r| r.to_string()).collect();
                f.write_str(&parts.join(" "))
            }
        }
    }
}

impl PartialEq<&str> for ConvertOutput {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, ConvertOutput::Single(r) if r == other)
    }
}

impl PartialEq<i64> for ConvertOutput {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, ConvertOutput::Single(r) if r == other)
    }
}

/// Additional details returned by [`convert_verbose`].
#[derive(Debug, Clone)]
pub struct ConvertDetails {
    /// Total elapsed time.
    pub total: Duration,
    /// One trace per input name, in input order.
    pub names: Vec<NameTrace>,
}

/// Result from [`convert_verbose`].
#[derive(Debug, Clone)]
pub struct ConvertRun {
    pub output: ConvertOutput,
    pub details: ConvertDetails,
}

// --- Free functions ----------------------------------------------------------

/// Convert `names` with the shared default converter.
///
/// # Example
/// ```
/// use country_converter::{ConvertOptions, convert};
///
/// let out = convert("UK", &ConvertOptions::default().with_to("ISO2")).unwrap();
/// assert_eq!(out, "GB");
/// ```
pub fn convert(names: impl Into<NameInput>, options: &ConvertOptions) -> Result<ConvertOutput> {
    default_converter()?.convert(names, options)
}

/// Convert `names` and return a per-name trace alongside the output.
pub fn convert_verbose(names: impl Into<NameInput>, options: &ConvertOptions) -> Result<ConvertRun> {
    default_converter()?.convert_verbose(names, options)
}

/// Pair entries of two free-text lists through the default converter's
/// name patterns.
pub fn match_names<A, B>(list_a: &[A], list_b: &[B], options: &MatchOptions) -> Result<IndexMap<String, Resolution>>
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    Ok(default_converter()?.match_names(list_a, list_b, options))
}

/// Aggregation concordance through the default converter.
pub fn agg_conc(
    original: Entities,
    aggregates: &[AggregateMapping],
    options: &mut AggOptions<'_>,
) -> Result<Aggregation> {
    default_converter()?.agg_conc(original, aggregates, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_input_is_rejected() {
        let err = convert(3.5_f64, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, CocoError::InvalidInput(_)));
        assert!(convert(vec![1.0_f64, 2.0], &ConvertOptions::default()).is_err());
    }

    #[test]
    fn input_shapes() {
        assert_eq!(NameInput::from(40_i64).into_strings().unwrap(), vec!["40"]);
        let set: HashSet<String> = ["b".to_string(), "a".to_string()].into_iter().collect();
        assert_eq!(NameInput::from(set).into_strings().unwrap(), vec!["a", "b"]);
        assert_eq!(NameInput::from(["x", "y"]).into_strings().unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn single_vs_batch_output() {
        let opts = ConvertOptions::default();
        assert!(matches!(convert("Austria", &opts).unwrap(), ConvertOutput::Single(_)));
        assert!(matches!(convert(vec!["Austria"], &opts).unwrap(), ConvertOutput::Single(_)));
        let forced = convert("Austria", &opts.clone().with_enforce_list(true)).unwrap();
        assert_eq!(forced, ConvertOutput::Batch(vec![Resolution::Many(vec![Value::from("AUT")])]));
        let empty: Vec<String> = Vec::new();
        assert_eq!(convert(empty, &opts).unwrap(), ConvertOutput::Batch(Vec::new()));
    }

    #[test]
    fn resolution_display() {
        assert_eq!(Resolution::One(Value::Int(40)).to_string(), "40");
        let many = Resolution::Many(vec![Value::from("AUT"), Value::from("DEU")]);
        assert_eq!(many.to_string(), "[AUT, DEU]");
        assert!(many.is_many());
        assert_eq!(many.values().len(), 2);
    }

    #[test]
    fn options_builders() {
        let o = ConvertOptions::default().with_src("ISO2").with_to("continent").with_not_found(None);
        assert_eq!(o.src.as_deref(), Some("ISO2"));
        assert_eq!(o.to, "continent");
        assert_eq!(o.not_found, None);
        assert_eq!(o.exclude_prefix, vec!["excl\\w.*", "without", "w/o"]);
        assert_eq!(MatchOptions::default().not_found.as_deref(), Some("not_found"));
    }
}
