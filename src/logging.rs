//! Log output for the `coco` binary.
//!
//! The library only emits `tracing` events; this module installs the
//! subscriber that prints them on stderr. Levels used by the library:
//!
//! - `warn`: names matching several rows or none, duplicated table keys
//! - `debug`: inferred source schemes, table construction summaries
//! - `trace`: every pattern hit

use std::io;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    /// Include the module path of each event.
    pub with_target: bool,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: Level::WARN, with_target: false, with_ansi: false }
    }
}

impl LogConfig {
    /// `-q` wins over any number of `-v`.
    ///
    /// - `-q`: errors only
    /// - none: warnings
    /// - `-v`: debug
    /// - `-vv`: trace
    #[must_use]
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => Level::ERROR,
            (false, 0) => Level::WARN,
            (false, 1) => Level::DEBUG,
            (false, _) => Level::TRACE,
        };
        Self { level, ..Default::default() }
    }

    #[must_use]
    pub fn with_target(mut self, enable: bool) -> Self {
        self.with_target = enable;
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

/// Install the global subscriber. Call once, before the first conversion.
pub fn init_logging(config: &LogConfig) {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target)
        .without_time();
    tracing_subscriber::registry().with(build_env_filter(config.level)).with(layer).init();
}

/// `RUST_LOG` overrides the configured level.
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Dependencies stay at warn.
        let level = level.as_str().to_lowercase();
        EnvFilter::new(format!("warn,country_converter={level},coco={level}"))
    })
}
