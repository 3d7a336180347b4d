//! Configuration management for buildsense
//!
//! Tool settings are loaded from environment variables with sensible defaults.
//! Build configuration types and layering live in the submodules.
//!
//! # Environment Variables
//!
//! - `BUILDSENSE_CACHE_ENABLED`: Enable the build cache (true|false) - default: "true"
//! - `BUILDSENSE_CACHE_DIR`: Cache directory - default: user cache dir + "buildsense"
//! - `BUILDSENSE_CACHE_TTL`: Cache entry time-to-live in seconds - default: "86400"
//! - `BUILDSENSE_CACHE_MAX_SIZE`: Persistent cache budget in bytes, 0 for unbounded - default: 512 MiB
//! - `BUILDSENSE_MIN_CONFIDENCE`: Minimum classification confidence - default: "0.6"
//! - `BUILDSENSE_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use buildsense::BuildsenseConfig;
//!
//! let config = BuildsenseConfig::default();
//! config.validate().expect("Invalid configuration");
//! let cache_config = config.cache_config();
//! ```

pub mod build_config;
pub mod merge;
pub mod overrides;

pub use build_config::{
    BuildConfig, BuildMode, OutputFormat, OutputOptions, PluginDescriptor, StyleOptions,
    TypeScriptOptions, VueOptions,
};
pub use merge::{ConfigLayer, ConfigMerger, MergeOptions};
pub use overrides::load_overrides;

use crate::cache::CacheConfig;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CACHE_ENABLED: bool = true;
const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_CACHE_MAX_SIZE: u64 = 512 * 1024 * 1024;
const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Evidence weights are malformed
    #[error("Detection weights must be non-negative and sum to 1.0 (got {sum})")]
    InvalidWeights { sum: f64 },

    /// Failed to parse a configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    /// Override file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Override file has an extension we cannot decode
    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Tool-level settings for buildsense
#[derive(Debug, Clone)]
pub struct BuildsenseConfig {
    /// Enable the build cache
    pub cache_enabled: bool,

    /// Persistent cache directory
    pub cache_dir: PathBuf,

    /// Maximum age of a cache entry
    pub cache_ttl: Duration,

    /// Persistent tier budget in bytes; `None` disables eviction
    pub cache_max_size: Option<u64>,

    /// Minimum confidence for a classification to stand
    pub min_confidence: f64,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("buildsense")
}

impl Default for BuildsenseConfig {
    /// Loads BUILDSENSE_* environment variables, falling back to defaults
    fn default() -> Self {
        let cache_enabled = env::var("BUILDSENSE_CACHE_ENABLED")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(DEFAULT_CACHE_ENABLED);

        let cache_dir = env::var("BUILDSENSE_CACHE_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(default_cache_dir);

        let cache_ttl = env::var("BUILDSENSE_CACHE_TTL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_CACHE_TTL_SECS));

        let cache_max_size = match env::var("BUILDSENSE_CACHE_MAX_SIZE")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            Some(0) => None,
            Some(bytes) => Some(bytes),
            None => Some(DEFAULT_CACHE_MAX_SIZE),
        };

        let min_confidence = env::var("BUILDSENSE_MIN_CONFIDENCE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(DEFAULT_MIN_CONFIDENCE);

        let log_level = env::var("BUILDSENSE_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            cache_enabled,
            cache_dir,
            cache_ttl,
            cache_max_size,
            min_confidence,
            log_level,
        }
    }
}

impl BuildsenseConfig {
    /// Checks numeric ranges and the log level
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::ValidationFailed(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }

        if self.cache_ttl.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "cache_ttl must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            dir: self.cache_dir.clone(),
            ttl: self.cache_ttl,
            max_size: self.cache_max_size,
        }
    }
}

impl fmt::Display for BuildsenseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "buildsense configuration:")?;
        writeln!(f, "  cache enabled:  {}", self.cache_enabled)?;
        writeln!(f, "  cache dir:      {}", self.cache_dir.display())?;
        writeln!(f, "  cache ttl:      {}s", self.cache_ttl.as_secs())?;
        match self.cache_max_size {
            Some(bytes) => writeln!(f, "  cache max size: {} bytes", bytes)?,
            None => writeln!(f, "  cache max size: unbounded")?,
        }
        writeln!(f, "  min confidence: {}", self.min_confidence)?;
        write!(f, "  log level:      {}", self.log_level)
    }
}
