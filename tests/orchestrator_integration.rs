//! End-to-end pipeline runs against on-disk projects

mod support;

use anyhow::bail;
use async_trait::async_trait;
use buildsense::cache::{BuildCache, CacheConfig};
use buildsense::config::BuildConfig;
use buildsense::engine::{BuildEngine, CommandEngine, EngineOutput};
use buildsense::progress::{BuildEvent, BuildObserver};
use buildsense::{BuildError, BuildState, LibraryType, Orchestrator};
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use support::{canonical, project, write_files};
use tempfile::TempDir;

/// Engine that records the configurations it was asked to build
#[derive(Default)]
struct RecordingEngine {
    configs: Mutex<Vec<BuildConfig>>,
    fail: bool,
}

impl RecordingEngine {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.configs.lock().unwrap().len()
    }
}

#[async_trait]
impl BuildEngine for RecordingEngine {
    fn identifier(&self) -> String {
        "recording".to_string()
    }

    async fn build(&self, config: &BuildConfig) -> anyhow::Result<EngineOutput> {
        self.configs.lock().unwrap().push(config.clone());
        if self.fail {
            bail!("out of memory");
        }
        Ok(EngineOutput {
            outputs: vec!["dist/index.mjs".to_string(), "dist/index.cjs".to_string()],
            warnings: vec!["large chunk".to_string()],
        })
    }
}

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<BuildEvent>>,
    completed: AtomicUsize,
}

impl BuildObserver for EventLog {
    fn on_event(&self, event: &BuildEvent) {
        if matches!(event, BuildEvent::Completed { .. }) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
        self.events.lock().unwrap().push(event.clone());
    }
}

fn cache_in(dir: &TempDir) -> Arc<BuildCache> {
    Arc::new(BuildCache::new(CacheConfig {
        dir: dir.path().join("cache"),
        ttl: Duration::from_secs(3600),
        max_size: None,
    }))
}

#[tokio::test]
async fn test_vue3_project_builds_then_hits_cache() {
    let proj = project(support::VUE3_LIBRARY);
    let cache_dir = TempDir::new().unwrap();
    let engine = Arc::new(RecordingEngine::default());
    let log = Arc::new(EventLog::default());
    let orch = Orchestrator::new(engine.clone(), cache_in(&cache_dir)).with_observer(log.clone());

    let first = orch.build(proj.path(), &json!({})).await.unwrap();
    assert!(first.success);
    assert!(!first.cache_hit);
    assert_eq!(first.category, LibraryType::Vue3);
    assert_eq!(first.outputs.len(), 2);
    assert!(first.warnings.iter().any(|w| w == "large chunk"));
    assert_eq!(first.stats.engine, "recording");

    let second = orch.build(proj.path(), &json!({})).await.unwrap();
    assert!(second.success);
    assert!(second.cache_hit);
    assert_eq!(second.outputs, first.outputs);
    assert_eq!(second.stats.cache_key, first.stats.cache_key);
    assert_ne!(second.build_id, first.build_id);

    assert_eq!(engine.calls(), 1);
    assert_eq!(log.completed.load(Ordering::SeqCst), 2);

    let built = engine.configs.lock().unwrap()[0].clone();
    assert_eq!(built.library_type, Some(LibraryType::Vue3));
    assert!(built.external.iter().any(|e| e == "vue"));
    assert!(built.has_plugin("vue3"));
    assert_eq!(canonical(built.cwd.as_deref().unwrap()), canonical(proj.path()));
    assert!(built.output.dir.is_absolute());
}

#[tokio::test]
async fn test_manifest_change_invalidates_cache() {
    let proj = project(support::REACT_LIBRARY);
    let cache_dir = TempDir::new().unwrap();
    let engine = Arc::new(RecordingEngine::default());
    let orch = Orchestrator::new(engine.clone(), cache_in(&cache_dir));

    let first = orch.build(proj.path(), &json!({})).await.unwrap();
    write_files(
        proj.path(),
        &[(
            "package.json",
            r#"{"name":"ui-kit","version":"2.0.0","dependencies":{"react":"^18.2.0","react-dom":"^18.2.0"},"devDependencies":{"@vitejs/plugin-react":"^4.0.0"}}"#,
        )],
    );
    let second = orch.build(proj.path(), &json!({})).await.unwrap();

    assert!(!second.cache_hit);
    assert_ne!(first.stats.cache_key, second.stats.cache_key);
    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn test_cache_shared_between_orchestrators() {
    let proj = project(support::SVELTE_LIBRARY);
    let cache_dir = TempDir::new().unwrap();

    let first_engine = Arc::new(RecordingEngine::default());
    Orchestrator::new(first_engine.clone(), cache_in(&cache_dir))
        .build(proj.path(), &json!({}))
        .await
        .unwrap();

    let second_engine = Arc::new(RecordingEngine::default());
    let result = Orchestrator::new(second_engine.clone(), cache_in(&cache_dir))
        .build(proj.path(), &json!({}))
        .await
        .unwrap();

    assert!(result.cache_hit);
    assert_eq!(result.category, LibraryType::Svelte);
    assert_eq!(second_engine.calls(), 0);
}

#[tokio::test]
async fn test_engine_failure_reported_and_retried() {
    let proj = project(support::TYPESCRIPT_LIBRARY);
    let cache_dir = TempDir::new().unwrap();
    let engine = Arc::new(RecordingEngine::failing());
    let log = Arc::new(EventLog::default());
    let orch = Orchestrator::new(engine.clone(), cache_in(&cache_dir)).with_observer(log.clone());

    let result = orch.build(proj.path(), &json!({})).await.unwrap();
    assert!(!result.success);
    assert!(result.outputs.is_empty());
    assert!(result.errors[0].contains("out of memory"));

    let events = log.events.lock().unwrap().clone();
    assert!(events.iter().any(|e| matches!(
        e,
        BuildEvent::StateChanged { to: BuildState::Failed, .. }
    )));
    assert!(events.iter().any(|e| matches!(e, BuildEvent::Failed { .. })));

    orch.build(proj.path(), &json!({})).await.unwrap();
    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn test_forced_library_type_beats_detection() {
    let proj = project(support::REACT_LIBRARY);
    let cache_dir = TempDir::new().unwrap();
    let engine = Arc::new(RecordingEngine::default());
    let orch = Orchestrator::new(engine.clone(), cache_in(&cache_dir));

    let resolved = orch
        .resolve(proj.path(), &json!({"libraryType": "style"}))
        .unwrap();
    assert!(resolved.forced);
    assert_eq!(resolved.category, LibraryType::Style);
    assert_eq!(resolved.classification.category, LibraryType::React);
    assert_eq!(resolved.config.library_type, Some(LibraryType::Style));
}

#[tokio::test]
async fn test_unknown_library_type_fails_before_engine() {
    let proj = project(support::REACT_LIBRARY);
    let cache_dir = TempDir::new().unwrap();
    let engine = Arc::new(RecordingEngine::default());
    let orch = Orchestrator::new(engine.clone(), cache_in(&cache_dir));

    let err = orch
        .build(proj.path(), &json!({"libraryType": "cobol"}))
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::Config(_)));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_unclassifiable_project_warns_and_uses_mixed() {
    let proj = project(&[("package.json", r#"{"name":"bare"}"#), ("index.js", "module.exports = 1;\n")]);
    let cache_dir = TempDir::new().unwrap();
    let orch = Orchestrator::new(Arc::new(RecordingEngine::default()), cache_in(&cache_dir));

    let resolved = orch.resolve(proj.path(), &json!({})).unwrap();
    assert_eq!(resolved.category, LibraryType::Mixed);
    assert!(resolved.classification.fallback);
    assert!(resolved
        .warnings
        .iter()
        .any(|w| w.contains("confidence threshold")));
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_engine_runs_in_project_dir() {
    let proj = project(support::REACT_LIBRARY);
    let cache_dir = TempDir::new().unwrap();
    let engine = CommandEngine::new("sh").with_args(vec![
        "-c".to_string(),
        "cat > /dev/null; pwd; echo 'warning: sourcemaps disabled'".to_string(),
    ]);
    let orch = Orchestrator::new(Arc::new(engine), cache_in(&cache_dir)).without_cache();

    let result = orch.build(proj.path(), &json!({})).await.unwrap();
    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.outputs.len(), 1);
    assert_eq!(
        canonical(&PathBuf::from(&result.outputs[0])),
        canonical(proj.path())
    );
    assert!(result
        .warnings
        .iter()
        .any(|w| w.contains("sourcemaps disabled")));
    assert!(result.stats.cache_key.is_some());
}
