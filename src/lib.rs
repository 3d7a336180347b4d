//! buildsense - project classification and cached build orchestration
//!
//! Given a project directory, buildsense decides what kind of JavaScript or
//! TypeScript library it is, turns that decision into a concrete build
//! configuration, and delegates the build to an external engine behind a
//! content-addressed result cache.
//!
//! # Pipeline
//!
//! 1. [`classify::EvidenceCollector`] gathers file, dependency, config and
//!    manifest-field matches per category
//! 2. [`classify::Classifier`] scores them into a [`classify::ClassificationResult`]
//! 3. [`strategy::StrategyRegistry`] transforms a base config for the category
//! 4. [`config::ConfigMerger`] layers defaults, recommendations, strategy output,
//!    user overrides and the active mode
//! 5. [`cache::BuildCache`] short-circuits unchanged builds; otherwise an
//!    [`engine::BuildEngine`] runs
//!
//! # Example
//!
//! ```no_run
//! use buildsense::cache::{BuildCache, CacheConfig};
//! use buildsense::engine::CommandEngine;
//! use buildsense::pipeline::Orchestrator;
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = BuildCache::new(CacheConfig {
//!     dir: "/tmp/buildsense".into(),
//!     ttl: Duration::from_secs(3600),
//!     max_size: Some(64 * 1024 * 1024),
//! });
//! let engine = CommandEngine::new("node").with_args(["scripts/build.mjs"]);
//! let orchestrator = Orchestrator::new(Arc::new(engine), Arc::new(cache));
//!
//! let result = orchestrator
//!     .build(Path::new("."), &serde_json::json!({ "output": { "minify": true } }))
//!     .await?;
//! println!("{} outputs, cache hit: {}", result.outputs.len(), result.cache_hit);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod category;
pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod fs;
pub mod pipeline;
pub mod progress;
pub mod strategy;
pub mod util;

pub use cache::{BuildCache, CacheConfig, CacheKey, CacheLookup};
pub use category::{Category, LibraryType, ProjectType};
pub use classify::{ClassificationResult, Classifier, EvidenceCollector, Taxonomy};
pub use config::{BuildConfig, BuildsenseConfig, ConfigError, ConfigMerger};
pub use engine::{BuildEngine, CommandEngine, EngineOutput};
pub use error::{BuildEngineError, BuildError, CacheError, EvidenceReadError, StrategyError};
pub use pipeline::{BuildResult, BuildState, Orchestrator, ResolvedBuild};
pub use strategy::{Strategy, StrategyRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
