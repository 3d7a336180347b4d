//! Command handlers. Each returns the process exit code.

use super::commands::{BuildArgs, CacheAction, CacheArgs, ClassifyArgs, ResolveArgs, TaxonomyArg};
use super::output::{OutputFormat, OutputFormatter};
use crate::cache::BuildCache;
use crate::classify::{Classifier, DetectionWeights};
use crate::config::{load_overrides, BuildMode, BuildsenseConfig};
use crate::engine::{BuildEngine, CommandEngine, EngineOutput};
use crate::error::BuildError;
use crate::pipeline::Orchestrator;
use crate::progress::LoggingObserver;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Stand-in engine for commands that stop before the build stage
struct NoEngine;

#[async_trait]
impl BuildEngine for NoEngine {
    fn identifier(&self) -> String {
        "none".to_string()
    }

    async fn build(&self, _config: &crate::config::BuildConfig) -> Result<EngineOutput> {
        Err(anyhow!("No build engine configured"))
    }
}

fn load_config() -> Result<BuildsenseConfig> {
    let config = BuildsenseConfig::default();
    config.validate().context("Invalid buildsense configuration")?;
    debug!("{}", config);
    Ok(config)
}

fn orchestrator(
    config: &BuildsenseConfig,
    engine: Arc<dyn BuildEngine>,
    use_cache: bool,
) -> Result<Orchestrator> {
    let classifier = Classifier::new(DetectionWeights::default(), config.min_confidence)?;
    let cache = Arc::new(BuildCache::new(config.cache_config()));
    let orchestrator = Orchestrator::new(engine, cache)
        .with_classifier(classifier)
        .with_observer(Arc::new(LoggingObserver));

    Ok(if use_cache && config.cache_enabled {
        orchestrator
    } else {
        orchestrator.without_cache()
    })
}

fn project_path(path: &Option<PathBuf>) -> PathBuf {
    path.clone().unwrap_or_else(|| PathBuf::from("."))
}

/// Loads the override file and applies `--mode` on top
fn user_overrides(args: &ResolveArgs) -> Result<Value> {
    let mut overrides = match &args.config {
        Some(path) => load_overrides(path)?,
        None => Value::Null,
    };

    if let Some(mode) = &args.mode {
        let mode: BuildMode = mode.parse().map_err(|e: String| anyhow!(e))?;
        if !overrides.is_object() {
            overrides = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut overrides {
            map.insert("mode".to_string(), Value::String(mode.as_str().to_string()));
        }
    }
    Ok(overrides)
}

fn report_error(err: &anyhow::Error) -> i32 {
    eprintln!("Error: {:#}", err);
    if let Some(BuildError::InvalidConfig { suggestions, .. }) = err.downcast_ref::<BuildError>() {
        for suggestion in suggestions {
            eprintln!("  hint: {}", suggestion);
        }
    }
    1
}

fn print(output: Result<String>) -> i32 {
    match output {
        Ok(text) => {
            println!("{}", text.trim_end());
            0
        }
        Err(e) => report_error(&e),
    }
}

pub async fn handle_classify(args: &ClassifyArgs, format: OutputFormat) -> i32 {
    print(classify(args, format))
}

fn classify(args: &ClassifyArgs, format: OutputFormat) -> Result<String> {
    let config = load_config()?;
    let orchestrator = orchestrator(&config, Arc::new(NoEngine), false)?;
    let path = project_path(&args.path);
    let formatter = OutputFormatter::new(format);

    match args.taxonomy {
        TaxonomyArg::Library => formatter.format_classification(&orchestrator.classify(&path)),
        TaxonomyArg::Project => {
            formatter.format_classification(&orchestrator.classify_project(&path))
        }
    }
}

pub async fn handle_resolve(args: &ResolveArgs, format: OutputFormat) -> i32 {
    print(resolve(args, format))
}

fn resolve(args: &ResolveArgs, format: OutputFormat) -> Result<String> {
    let config = load_config()?;
    let orchestrator = orchestrator(&config, Arc::new(NoEngine), false)?;
    let overrides = user_overrides(args)?;
    let resolved = orchestrator.resolve(&project_path(&args.path), &overrides)?;
    OutputFormatter::new(format).format_resolved(&resolved)
}

pub async fn handle_build(args: &BuildArgs, format: OutputFormat) -> i32 {
    match build(args, format).await {
        Ok((text, success)) => {
            println!("{}", text.trim_end());
            if success {
                0
            } else {
                1
            }
        }
        Err(e) => report_error(&e),
    }
}

async fn build(args: &BuildArgs, format: OutputFormat) -> Result<(String, bool)> {
    let config = load_config()?;
    let engine = CommandEngine::new(args.engine.clone()).with_args(args.engine_args.clone());
    let orchestrator = orchestrator(&config, Arc::new(engine), !args.no_cache)?;
    let overrides = user_overrides(&args.resolve)?;

    let result = orchestrator
        .build(&project_path(&args.resolve.path), &overrides)
        .await?;
    let text = OutputFormatter::new(format).format_build(&result)?;
    Ok((text, result.success))
}

pub async fn handle_cache(args: &CacheArgs, format: OutputFormat) -> i32 {
    print(cache(args, format).await)
}

async fn cache(args: &CacheArgs, format: OutputFormat) -> Result<String> {
    let config = load_config()?;
    let cache = BuildCache::new(config.cache_config());

    match args.action {
        CacheAction::Stats => {
            let stats = cache.stats().await?;
            OutputFormatter::new(format).format_cache_stats(&stats)
        }
        CacheAction::Clear => {
            cache.clear().await?;
            Ok(format!("Cleared cache at {}", config.cache_dir.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn resolve_args(config: Option<PathBuf>, mode: Option<&str>) -> ResolveArgs {
        ResolveArgs {
            path: None,
            config,
            mode: mode.map(str::to_string),
        }
    }

    #[test]
    fn test_mode_flag_without_file() {
        let overrides = user_overrides(&resolve_args(None, Some("dev"))).unwrap();
        assert_eq!(overrides["mode"], "development");
    }

    #[test]
    fn test_mode_flag_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overrides.json");
        fs::write(&path, r#"{"mode": "production", "input": "src/lib.ts"}"#).unwrap();

        let overrides = user_overrides(&resolve_args(Some(path), Some("development"))).unwrap();
        assert_eq!(overrides["mode"], "development");
        assert_eq!(overrides["input"], "src/lib.ts");
    }

    #[test]
    fn test_invalid_mode_is_rejected() {
        assert!(user_overrides(&resolve_args(None, Some("staging"))).is_err());
    }

    #[test]
    fn test_no_overrides() {
        assert_eq!(user_overrides(&resolve_args(None, None)).unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_no_engine_refuses_to_build() {
        let err = NoEngine
            .build(&crate::config::BuildConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No build engine"));
    }
}
