//! Classification scheme names and validation.
//!
//! A scheme is a column of the classification table. Callers may spell it in
//! any case and may use the aliases in [`SCHEME_ALIASES`].

use crate::error::{CocoError, Result};

pub(crate) const NAME_SHORT: &str = "name_short";
pub(crate) const NAME_OFFICIAL: &str = "name_official";
pub(crate) const REGEX: &str = "regex";
pub(crate) const ISO2: &str = "ISO2";
pub(crate) const ISO3: &str = "ISO3";
pub(crate) const ISO_NUMERIC: &str = "ISOnumeric";
pub(crate) const UN_MEMBER: &str = "UNmember";
pub(crate) const OBSOLETE: &str = "obsolete";

/// Columns every table source must provide.
pub(crate) const REQUIRED_COLUMNS: [&str; 3] = [NAME_SHORT, NAME_OFFICIAL, REGEX];

/// Columns whose values must be unique across rows (last row wins on merge).
pub(crate) const UNIQUE_COLUMNS: [&str; 3] = [NAME_SHORT, NAME_OFFICIAL, REGEX];

/// Columns loaded as text regardless of content.
pub(crate) const TEXT_COLUMNS: &[&str] =
    &[NAME_SHORT, NAME_OFFICIAL, REGEX, ISO2, ISO3, "continent", "UNregion", "EXIO1", "EXIO2", "EXIO3", "WIOD"];

/// Alphabetic code schemes: output values are cleaned to bare upper-case codes.
pub(crate) const ALPHA_CODE_SCHEMES: [&str; 2] = [ISO2, ISO3];

/// Alternative spellings accepted for scheme names, keyed by canonical column.
pub const SCHEME_ALIASES: &[(&str, &[&str])] = &[
    (NAME_SHORT, &["short", "short_name", "name", "names"]),
    (NAME_OFFICIAL, &["official", "long_name", "long"]),
    ("UNcode", &["un", "unnumeric"]),
    (ISO_NUMERIC, &["isocode"]),
];

/// Canonical column for an alias, if `name` is one.
pub fn canonical_alias(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    SCHEME_ALIASES.iter().find(|(_, aliases)| aliases.contains(&lower.as_str())).map(|(canonical, _)| *canonical)
}

/// Resolve `name` to the exact spelling of a table column.
pub(crate) fn validate(name: &str, columns: &[String]) -> Result<String> {
    let wanted = canonical_alias(name).unwrap_or(name).to_lowercase();
    columns
        .iter()
        .find(|c| c.to_lowercase() == wanted)
        .cloned()
        .ok_or_else(|| CocoError::UnknownScheme(name.to_string()))
}

/// Schemes resolved by scanning a pattern index rather than exact comparison.
pub(crate) fn is_pattern_scheme(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case(REGEX) || scheme.eq_ignore_ascii_case(ISO2)
}

pub(crate) fn is_alpha_code(scheme: &str) -> bool {
    ALPHA_CODE_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme))
}
