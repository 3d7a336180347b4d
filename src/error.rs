//! Error taxonomy for buildsense
//!
//! | Error | Stage | Fatal |
//! |-------|-------|-------|
//! | [`EvidenceReadError`] | evidence collection | never, degrades to zero evidence |
//! | [`StrategyError`] | configuration | yes, raised before any engine work |
//! | [`ConfigError`](crate::config::ConfigError) | configuration | yes |
//! | [`CacheError`] | caching | never, logged by the cache |
//! | [`BuildEngineError`] | engine | reported in `BuildResult::errors` |

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read project evidence. Always absorbed by the collector.
#[derive(Debug, Error)]
pub enum EvidenceReadError {
    #[error("Failed to read manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Manifest {path} is not valid JSON: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to walk source tree {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Strategy resolution failures. Both variants carry a suggestion for the user.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("No build strategy registered for category '{category}'. {suggestion}")]
    NoStrategy {
        category: String,
        suggestion: String,
    },

    #[error("Strategy '{strategy}' is not applicable to this configuration: {reason}. {suggestion}")]
    NotApplicable {
        strategy: String,
        reason: String,
        suggestion: String,
    },
}

impl StrategyError {
    pub fn suggestion(&self) -> &str {
        match self {
            Self::NoStrategy { suggestion, .. } | Self::NotApplicable { suggestion, .. } => {
                suggestion
            }
        }
    }
}

/// Persistent cache tier failures
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to write cache record {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read cache record {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove cache record {key}: {source}")]
    Remove {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list cache directory {dir}: {source}")]
    List {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt cache record {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Opaque wrapper around an external build engine failure
#[derive(Debug, Error)]
#[error("Build engine '{engine}' failed")]
pub struct BuildEngineError {
    pub engine: String,
    #[source]
    pub source: anyhow::Error,
}

impl BuildEngineError {
    pub fn new(engine: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            engine: engine.into(),
            source,
        }
    }

    /// Human-readable message including the whole cause chain
    pub fn chain_message(&self) -> String {
        format!("{}: {:#}", self, self.source)
    }
}

/// Fail-fast errors raised by the orchestrator before any engine work starts
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid build configuration: {}", .errors.join("; "))]
    InvalidConfig {
        errors: Vec<String>,
        suggestions: Vec<String>,
    },

    #[error("Merged configuration could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_error_messages_carry_suggestion() {
        let err = StrategyError::NoStrategy {
            category: "angular".to_string(),
            suggestion: "Register a strategy for 'angular'".to_string(),
        };
        assert!(err.to_string().contains("angular"));
        assert_eq!(err.suggestion(), "Register a strategy for 'angular'");
    }

    #[test]
    fn test_build_engine_error_preserves_chain() {
        let cause = anyhow::anyhow!("exit status 2").context("rollup crashed");
        let err = BuildEngineError::new("command:rollup", cause);

        let message = err.chain_message();
        assert!(message.contains("command:rollup"));
        assert!(message.contains("rollup crashed"));
        assert!(message.contains("exit status 2"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_config_joins_errors() {
        let err = BuildError::InvalidConfig {
            errors: vec!["no formats".to_string(), "empty input".to_string()],
            suggestions: vec![],
        };
        assert_eq!(
            err.to_string(),
            "Invalid build configuration: no formats; empty input"
        );
    }
}
