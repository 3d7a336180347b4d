//! Structured logging setup for buildsense
//!
//! Logs always go to stderr so that machine-readable command output on stdout
//! stays clean. `RUST_LOG` is honoured on top of the configured level.
//!
//! ```no_run
//! use buildsense::util::logging;
//!
//! logging::init_from_env();
//! tracing::info!(root = "/repo", "Classifying project");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

pub const LOG_LEVEL_ENV: &str = "BUILDSENSE_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "BUILDSENSE_LOG_JSON";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for the `buildsense` target
    pub level: Level,

    /// JSON lines instead of the human formatter
    pub use_json: bool,

    /// Include the module target (e.g. buildsense::cache) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with source locations, for CI logs
    pub fn structured() -> Self {
        Self {
            use_json: true,
            include_location: true,
            ..Default::default()
        }
    }

    fn directive(&self) -> Option<Directive> {
        format!("buildsense={}", self.level.as_str().to_lowercase())
            .parse()
            .ok()
    }
}

/// Parses a log level, case-insensitively. Unknown names fall back to INFO.
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if let Some(directive) = config.directive() {
            filter = filter.add_directive(directive);
        }

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        let registry = tracing_subscriber::registry().with(filter);
        let result = if config.use_json {
            registry.with(layer.json()).try_init()
        } else {
            registry.with(layer).try_init()
        };

        if let Err(e) = result {
            eprintln!("Logging already initialised elsewhere: {}", e);
        }
    });
}

/// Reads `BUILDSENSE_LOG_LEVEL` and `BUILDSENSE_LOG_JSON`
pub fn config_from_env() -> LoggingConfig {
    let level = env::var(LOG_LEVEL_ENV)
        .map(|v| parse_level(&v))
        .unwrap_or(Level::INFO);

    let use_json = env::var(LOG_JSON_ENV)
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    LoggingConfig {
        level,
        use_json,
        ..Default::default()
    }
}

pub fn init_from_env() {
    init_logging(config_from_env());
}
