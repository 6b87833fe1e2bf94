//! Input scanning (pre-classification of a single name).
//!
//! Before a name is resolved it is scanned once to produce:
//!
//! - the **head**: the part of the input left of the first exclusion marker
//!   (`"Asia excluding China"` -> `"Asia"`), trimmed;
//! - the **excluded tail**: the marker and everything after it, kept for
//!   reporting only;
//! - a coarse **shape** (`ShapeMask`) of the head, used to infer the source
//!   scheme when the caller did not name one.
//!
//! ## Inference order
//!
//! ```text
//! head ──┬─ parses as integer ──▶ ISOnumeric
//!        ├─ 2 characters      ──▶ ISO2
//!        ├─ 3 characters      ──▶ ISO3
//!        └─ anything else     ──▶ regex
//! ```

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::error::{CocoError, Result};
use crate::scheme::{ISO_NUMERIC, ISO2, ISO3, REGEX};

/// Markers that negate the rest of a name, matched case-insensitively.
pub const DEFAULT_EXCLUDE_PREFIX: [&str; 3] = ["excl\\w.*", "without", "w/o"];

static DEFAULT_EXCLUSIONS: Lazy<Exclusions> = Lazy::new(|| {
    Exclusions::compile(&DEFAULT_EXCLUDE_PREFIX).unwrap_or_else(|_| Exclusions { markers: Vec::new() })
});

bitflags::bitflags! {
    /// Coarse shape of a (trimmed) name.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShapeMask: u8 {
        const NUMERIC     = 1 << 0;
        const TWO_CHARS   = 1 << 1;
        const THREE_CHARS = 1 << 2;
        const EXCLUDED    = 1 << 3;
        const EMPTY       = 1 << 4;
    }
}

/// Compiled exclusion markers.
#[derive(Debug, Clone)]
pub(crate) struct Exclusions {
    markers: Vec<Regex>,
}

impl Exclusions {
    pub(crate) fn compile<S: AsRef<str>>(prefixes: &[S]) -> Result<Self> {
        let markers = prefixes
            .iter()
            .map(|p| {
                RegexBuilder::new(p.as_ref())
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| CocoError::InvalidExclusion { pattern: p.as_ref().to_string(), source })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Exclusions { markers })
    }

    /// The process-wide default marker set.
    pub(crate) fn default_set() -> &'static Exclusions {
        &DEFAULT_EXCLUSIONS
    }

    /// Byte offset of the earliest marker match.
    fn first_match(&self, name: &str) -> Option<usize> {
        self.markers.iter().filter_map(|re| re.find(name)).map(|m| m.start()).min()
    }
}

/// Result of scanning one input name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InputScan {
    pub head: String,
    pub excluded: Option<String>,
    pub shape: ShapeMask,
}

impl InputScan {
    pub(crate) fn scan(name: &str, exclusions: &Exclusions) -> Self {
        let mut shape = ShapeMask::empty();
        let (head, excluded) = match exclusions.first_match(name) {
            Some(at) => {
                shape |= ShapeMask::EXCLUDED;
                (name[..at].trim(), Some(name[at..].to_string()))
            }
            None => (name.trim(), None),
        };

        if head.is_empty() {
            shape |= ShapeMask::EMPTY;
        }
        if head.parse::<i64>().is_ok() {
            shape |= ShapeMask::NUMERIC;
        }
        match head.chars().count() {
            2 => shape |= ShapeMask::TWO_CHARS,
            3 => shape |= ShapeMask::THREE_CHARS,
            _ => {}
        }

        InputScan { head: head.to_string(), excluded, shape }
    }

    /// Source scheme implied by the head's shape.
    pub(crate) fn inferred_source(&self) -> &'static str {
        if self.shape.contains(ShapeMask::NUMERIC) {
            ISO_NUMERIC
        } else if self.shape.contains(ShapeMask::TWO_CHARS) {
            ISO2
        } else if self.shape.contains(ShapeMask::THREE_CHARS) {
            ISO3
        } else {
            REGEX
        }
    }
}
