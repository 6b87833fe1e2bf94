//! Per-name resolution traces.
//!
//! Traces are *opt-in*: the plain conversion path never builds them, while
//! [`crate::convert_verbose`] collects one [`NameTrace`] per input for
//! `coco --explain` and for debugging table patterns.

use std::time::Duration;

// --- Traces ------------------------------------------------------------------

bitflags::bitflags! {
    /// What happened while resolving one name.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MatchFlags: u8 {
        /// The source scheme was inferred from the name's shape.
        const INFERRED_SOURCE = 1 << 0;
        /// An exclusion marker truncated the name.
        const EXCLUDED        = 1 << 1;
        /// No row matched; the result is the fill value.
        const NOT_FOUND       = 1 << 2;
        /// More than one row matched.
        const MULTIPLE        = 1 << 3;
        /// Resolved through a pattern index rather than exact comparison.
        const PATTERN         = 1 << 4;
    }
}

/// How one input name was resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NameTrace {
    /// The input as given.
    pub input: String,
    /// The part that was actually resolved.
    pub head: String,
    /// Exclusion marker and everything after it, if any.
    pub excluded: Option<String>,
    /// Source scheme used for the lookup.
    pub source: String,
    /// Matching table rows.
    pub rows: Vec<usize>,
    /// `name_short` of each matching row.
    pub labels: Vec<String>,
    pub flags: MatchFlags,
    pub elapsed: Duration,
}

impl NameTrace {
    pub fn found(&self) -> bool {
        !self.flags.contains(MatchFlags::NOT_FOUND)
    }
}
