use crate::category::LibraryType;
use crate::classify::ClassificationResult;
use crate::config::{BuildConfig, PluginDescriptor};
use serde::Serialize;
use uuid::Uuid;

/// Output of the configuration stage, before any engine work
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBuild {
    pub classification: ClassificationResult<LibraryType>,
    /// Detected category, or the one forced through `libraryType`
    pub category: LibraryType,
    pub forced: bool,
    pub strategy: String,
    pub config: BuildConfig,
    pub plugins: Vec<PluginDescriptor>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStats {
    pub duration_ms: u64,
    pub output_count: usize,
    pub engine: String,
    pub cache_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    pub build_id: Uuid,
    pub success: bool,
    pub category: LibraryType,
    pub confidence: f64,
    pub outputs: Vec<String>,
    pub stats: BuildStats,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub cache_hit: bool,
}
