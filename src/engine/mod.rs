//! External build engine seam
//!
//! The actual bundling is performed outside this crate. An engine receives the
//! fully resolved [`BuildConfig`] and reports the files it produced.

mod command;

pub use command::CommandEngine;

use crate::config::BuildConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What an engine reports back after a successful build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOutput {
    pub outputs: Vec<String>,
    pub warnings: Vec<String>,
}

#[async_trait]
pub trait BuildEngine: Send + Sync {
    /// Stable identifier; part of the build cache key
    fn identifier(&self) -> String;

    async fn build(&self, config: &BuildConfig) -> anyhow::Result<EngineOutput>;
}
