use super::result::{BuildResult, BuildStats, ResolvedBuild};
use super::state::BuildState;
use crate::cache::{sha256_hex, BuildCache, CacheKey, CacheLookup, ENGINE_BUILD_RESULT};
use crate::category::{Category, LibraryType, ProjectType};
use crate::classify::{ClassificationResult, Classifier, EvidenceCollector, Taxonomy};
use crate::config::{BuildConfig, ConfigError, ConfigMerger};
use crate::engine::{BuildEngine, EngineOutput};
use crate::error::{BuildEngineError, BuildError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::progress::{BuildEvent, BuildObserver};
use crate::strategy::StrategyRegistry;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Override key that forces a library category
const LIBRARY_TYPE_KEY: &str = "libraryType";

/// Sequences classification, strategy resolution, config merge, cache and engine
pub struct Orchestrator {
    engine: Arc<dyn BuildEngine>,
    cache: Option<Arc<BuildCache>>,
    registry: Arc<StrategyRegistry>,
    classifier: Classifier,
    collector: EvidenceCollector,
    merger: ConfigMerger,
    library: Taxonomy<LibraryType>,
    project: Taxonomy<ProjectType>,
    observers: Vec<Arc<dyn BuildObserver>>,
}

/// Tracks one invocation's state and publishes its events
struct Run<'a> {
    id: Uuid,
    state: BuildState,
    observers: &'a [Arc<dyn BuildObserver>],
}

impl<'a> Run<'a> {
    fn start(observers: &'a [Arc<dyn BuildObserver>], root: &Path) -> Self {
        let run = Self {
            id: Uuid::new_v4(),
            state: BuildState::Idle,
            observers,
        };
        run.publish(BuildEvent::Started {
            build_id: run.id,
            root: root.to_path_buf(),
        });
        run
    }

    fn publish(&self, event: BuildEvent) {
        for observer in self.observers {
            observer.on_event(&event);
        }
    }

    fn transition(&mut self, to: BuildState) {
        if !self.state.can_transition_to(to) {
            debug!("Unexpected build state transition {} -> {}", self.state, to);
        }
        let from = std::mem::replace(&mut self.state, to);
        self.publish(BuildEvent::StateChanged {
            build_id: self.id,
            from,
            to,
        });
    }

    fn fail(&mut self, error: String) {
        self.transition(BuildState::Failed);
        self.publish(BuildEvent::Failed {
            build_id: self.id,
            error,
        });
        self.transition(BuildState::Idle);
    }
}

impl Orchestrator {
    pub fn new(engine: Arc<dyn BuildEngine>, cache: Arc<BuildCache>) -> Self {
        Self {
            engine,
            cache: Some(cache),
            registry: Arc::new(StrategyRegistry::with_defaults()),
            classifier: Classifier::default(),
            collector: EvidenceCollector::new(Arc::new(RealFileSystem)),
            merger: ConfigMerger::default(),
            library: Taxonomy::library(),
            project: Taxonomy::project(),
            observers: Vec::new(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<StrategyRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_collector(mut self, collector: EvidenceCollector) -> Self {
        self.collector = collector;
        self
    }

    /// Replaces the collector with one reading through `fs`
    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.collector = EvidenceCollector::new(fs);
        self
    }

    pub fn with_merger(mut self, merger: ConfigMerger) -> Self {
        self.merger = merger;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn BuildObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Skips cache lookups and writes
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn cache(&self) -> Option<&Arc<BuildCache>> {
        self.cache.as_ref()
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Classifies `root` against the library taxonomy
    pub fn classify(&self, root: &Path) -> ClassificationResult<LibraryType> {
        let evidence = self.collector.collect(root, &self.library);
        self.classifier.classify(&evidence, &self.library)
    }

    /// Classifies `root` against the generated-project taxonomy
    pub fn classify_project(&self, root: &Path) -> ClassificationResult<ProjectType> {
        let evidence = self.collector.collect(root, &self.project);
        self.classifier.classify(&evidence, &self.project)
    }

    /// Runs the configuration stage without touching the cache or engine
    pub fn resolve(&self, root: &Path, overrides: &Value) -> Result<ResolvedBuild, BuildError> {
        let classification = self.classify(root);
        self.resolve_classified(classification, overrides)
    }

    fn resolve_classified(
        &self,
        classification: ClassificationResult<LibraryType>,
        overrides: &Value,
    ) -> Result<ResolvedBuild, BuildError> {
        let forced = forced_category(overrides)?;
        let category = forced.unwrap_or(classification.category);
        let root = classification.root.clone();

        let mut warnings = Vec::new();
        match forced {
            Some(forced) if forced != classification.category => {
                info!(
                    "Using forced library type {} (detected {})",
                    forced.id(),
                    classification.category.id()
                );
            }
            None if classification.fallback => warnings.push(format!(
                "No library type reached the confidence threshold (best {:.2}); using {} defaults",
                classification.confidence,
                category.id()
            )),
            _ => {}
        }

        let defaults = BuildConfig::defaults_value();
        let recommended = self
            .library
            .profile(category)
            .map(|p| p.recommended.clone())
            .unwrap_or_else(|| Value::Object(Map::new()));
        let empty = Value::Object(Map::new());

        // The strategy sees everything the user asked for
        let base = self
            .merger
            .resolve(&defaults, &recommended, &empty, overrides, &root)?;

        let strategy = self.registry.get_strategy(category)?;
        let outcome = self.registry.apply_strategy(category, &base)?;
        let mut transformed = outcome.config;
        transformed.library_type = Some(category);
        let strategy_output = transformed.to_value()?;

        let config = self
            .merger
            .resolve(&defaults, &recommended, &strategy_output, overrides, &root)?;

        let report = strategy.validate_config(&config);
        if !report.valid {
            return Err(BuildError::InvalidConfig {
                errors: report.errors,
                suggestions: report.suggestions,
            });
        }

        warnings.extend(outcome.warnings);
        warnings.extend(report.warnings);
        debug!(
            "Resolved {} build with {} plugins",
            category.id(),
            config.plugins.len()
        );

        Ok(ResolvedBuild {
            classification,
            category,
            forced: forced.is_some(),
            strategy: outcome.strategy,
            config,
            plugins: outcome.plugins,
            warnings,
        })
    }

    /// Content-addressed key over manifest, resolved config and engine
    fn cache_key(&self, resolved: &ResolvedBuild) -> Result<CacheKey, BuildError> {
        let manifest = self
            .collector
            .read_manifest(&resolved.classification.root, self.library.manifest_file())
            .unwrap_or_default();
        let config = serde_json::to_vec(&resolved.config)?;

        Ok(CacheKey::new(
            ENGINE_BUILD_RESULT,
            &[
                sha256_hex(manifest),
                sha256_hex(config),
                self.engine.identifier(),
            ],
        ))
    }

    /// Resolves, consults the cache, and runs the engine on a miss
    ///
    /// Configuration problems are returned as errors before any engine work.
    /// Engine failures produce a result with `success == false` and are not
    /// cached.
    pub async fn build(&self, root: &Path, overrides: &Value) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let mut run = Run::start(&self.observers, root);

        run.transition(BuildState::Classifying);
        let classification = self.classify(root);

        run.transition(BuildState::Resolving);
        let resolved = match self
            .resolve_classified(classification, overrides)
            .and_then(|resolved| self.cache_key(&resolved).map(|key| (resolved, key)))
        {
            Ok(resolved) => resolved,
            Err(err) => {
                run.fail(err.to_string());
                return Err(err);
            }
        };
        let (resolved, key) = resolved;

        let mut result = BuildResult {
            build_id: run.id,
            success: false,
            category: resolved.category,
            confidence: resolved.classification.confidence,
            outputs: Vec::new(),
            stats: BuildStats {
                engine: self.engine.identifier(),
                cache_key: Some(key.as_str().to_string()),
                ..Default::default()
            },
            warnings: resolved.warnings.clone(),
            errors: Vec::new(),
            cache_hit: false,
        };

        run.transition(BuildState::CacheLookup);
        if let Some(cached) = self.lookup(&key).await {
            run.publish(BuildEvent::CacheHit {
                build_id: run.id,
                key: key.to_string(),
            });
            run.transition(BuildState::Done);

            result.success = true;
            result.cache_hit = true;
            result.outputs = cached.outputs;
            result.warnings.extend(cached.warnings);
            return Ok(self.finish(run, result, start));
        }

        run.transition(BuildState::Building);
        info!(
            "Building {} as {} with {}",
            root.display(),
            resolved.category.id(),
            self.engine.identifier()
        );
        match self.engine.build(&resolved.config).await {
            Ok(output) => {
                if let Some(cache) = &self.cache {
                    match serde_json::to_value(&output) {
                        Ok(value) => cache.set(&key, value).await,
                        Err(e) => warn!("Build result not cacheable: {}", e),
                    }
                }
                run.transition(BuildState::Done);

                result.success = true;
                result.outputs = output.outputs;
                result.warnings.extend(output.warnings);
                Ok(self.finish(run, result, start))
            }
            Err(source) => {
                let err = BuildEngineError::new(self.engine.identifier(), source);
                let message = err.chain_message();
                result.errors.push(message.clone());
                result.stats.duration_ms = start.elapsed().as_millis() as u64;
                run.fail(message);
                Ok(result)
            }
        }
    }

    async fn lookup(&self, key: &CacheKey) -> Option<EngineOutput> {
        let cache = self.cache.as_ref()?;
        match cache.get(key).await {
            CacheLookup::Hit(entry) => match serde_json::from_value(entry.value) {
                Ok(output) => Some(output),
                Err(e) => {
                    warn!("Ignoring undecodable cached build result {}: {}", key, e);
                    None
                }
            },
            CacheLookup::Miss => None,
        }
    }

    fn finish(&self, mut run: Run<'_>, mut result: BuildResult, start: Instant) -> BuildResult {
        let duration = start.elapsed();
        result.stats.duration_ms = duration.as_millis() as u64;
        result.stats.output_count = result.outputs.len();

        run.publish(BuildEvent::Completed {
            build_id: run.id,
            duration,
            outputs: result.outputs.len(),
            cache_hit: result.cache_hit,
        });
        run.transition(BuildState::Idle);
        result
    }
}

fn forced_category(overrides: &Value) -> Result<Option<LibraryType>, ConfigError> {
    match overrides.get(LIBRARY_TYPE_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) => LibraryType::from_name(name).map(Some).ok_or_else(|| {
            ConfigError::ParseError {
                field: LIBRARY_TYPE_KEY.to_string(),
                error: format!(
                    "unknown library type '{}'; expected one of: {}",
                    name,
                    LibraryType::all()
                        .iter()
                        .map(|c| c.id())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            }
        }),
        Some(other) => Err(ConfigError::ParseError {
            field: LIBRARY_TYPE_KEY.to_string(),
            error: format!("expected a string, got {}", other),
        }),
    }
}
