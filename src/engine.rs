//! Resolution engine.
//!
//! The engine turns a raw country identifier into rows of the classification
//! table. It is split into focused submodules under `src/engine/`.
//!
//! ## How the parts work together
//!
//! ```text
//! table rows ──┐
//!              │  PatternIndex::from_regex_column   (pattern_index.rs)
//!              │  PatternIndex::from_code_column
//!              └───────────────┬──────────────
//!                              │
//! name ── InputScan::scan ─────┼─ strip exclusions, infer source scheme
//!         (scan.rs)            │
//!                              v
//!                    Resolver::resolve (resolve.rs)
//!                      - pattern scan or exact token match
//!                      - ambiguity policy (warn / strict)
//!                      - shape target values
//!                              │
//!                              v
//!                 Resolution (+ NameTrace, metrics.rs)
//! ```
//!
//! Indexes are built once per converter and only read afterwards, so a
//! converter can be shared across threads.
//!
//! ## Responsibilities by module
//!
//! - `pattern_index.rs`: one compiled pattern per table row, aligned by row id.
//! - `scan.rs`: exclusion splitting and the coarse shape used for inference.
//! - `resolve.rs`: row lookup and output shaping for a single name.
//! - `metrics.rs`: optional per-name traces for verbose conversion.

#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/pattern_index.rs"]
mod pattern_index;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/scan.rs"]
mod scan;

#[cfg(test)]
#[path = "engine/tests.rs"]
mod tests;

pub use metrics::{MatchFlags, NameTrace};
pub use scan::DEFAULT_EXCLUDE_PREFIX;

pub(crate) use pattern_index::PatternIndex;
pub(crate) use resolve::{ConvertPlan, Resolver, clean_alpha_code, is_alpha_target};
pub(crate) use scan::{Exclusions, InputScan};
