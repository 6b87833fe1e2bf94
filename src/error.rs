//! Error types for table construction and resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the converter.
///
/// Resolution misses (no match, several matches) are not errors: they are
/// filled by policy and logged. The exception is [`CocoError::AmbiguousMatch`],
/// which only a converter built with `strict` mode returns.
#[derive(Debug, Error)]
pub enum CocoError {
    // === Construction ===
    /// A table pattern does not compile. The converter cannot be built.
    #[error("invalid pattern '{pattern}' in column '{column}' (row {row}): {source}")]
    InvalidPattern {
        column: String,
        row: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An exclusion marker does not compile.
    #[error("invalid exclusion marker '{pattern}': {source}")]
    InvalidExclusion {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A table source lacks one of the required columns.
    #[error("required column '{column}' not found in {origin}")]
    MissingColumn { column: String, origin: String },

    /// A table source has no header row.
    #[error("country data is empty: {origin}")]
    EmptyTable { origin: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse country data {origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },

    // === Resolution ===
    /// Input that cannot be coerced to a sequence of strings.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// `src`/`to` (or an aggregation column) names no classification.
    #[error("{0} is not a valid country classification")]
    UnknownScheme(String),

    /// Several rows match one name while the converter runs in strict mode.
    #[error("'{name}' matches {matches} rows in {scheme}")]
    AmbiguousMatch { name: String, scheme: String, matches: usize },

    /// A row filter does not line up with the table.
    #[error("row filter has {got} entries but the table has {expected} rows")]
    MaskLength { expected: usize, got: usize },
}

/// Result type for converter operations.
pub type Result<T> = std::result::Result<T, CocoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_scheme_names_the_scheme() {
        let err = CocoError::UnknownScheme("abc".to_string());
        assert_eq!(err.to_string(), "abc is not a valid country classification");
    }

    #[test]
    fn invalid_pattern_keeps_source() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let err = CocoError::InvalidPattern { column: "regex".into(), row: 3, pattern: "(unclosed".into(), source };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("invalid pattern '(unclosed' in column 'regex' (row 3)"));
    }
}
