use super::{ComponentStrategy, MixedStrategy, Strategy, StyleStrategy, TypeScriptStrategy, VueStrategy};
use crate::category::{Category, LibraryType};
use crate::config::{BuildConfig, PluginDescriptor};
use crate::error::StrategyError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Transformed config plus the plugins and advisories produced for it
#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    pub strategy: String,
    pub config: BuildConfig,
    pub plugins: Vec<PluginDescriptor>,
    pub warnings: Vec<String>,
}

/// Category-keyed strategy table, populated once at startup
pub struct StrategyRegistry {
    strategies: HashMap<LibraryType, Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(TypeScriptStrategy));
        registry.register(Arc::new(StyleStrategy));
        registry.register(Arc::new(VueStrategy));
        for strategy in ComponentStrategy::all() {
            registry.register(Arc::new(strategy));
        }
        registry.register(Arc::new(MixedStrategy));

        registry
    }

    /// Binds the strategy to every category it supports
    pub fn register(&mut self, strategy: Arc<dyn Strategy>) {
        let categories = strategy.supported_categories().to_vec();
        for category in categories {
            self.register_for(category, strategy.clone());
        }
    }

    /// Binds a strategy to one category; the last registration wins
    pub fn register_for(&mut self, category: LibraryType, strategy: Arc<dyn Strategy>) {
        debug!("Registering {} strategy for {}", strategy.name(), category.id());
        if let Some(previous) = self.strategies.insert(category, strategy) {
            warn!(
                "Strategy for '{}' replaced (previously {})",
                category.id(),
                previous.name()
            );
        }
    }

    pub fn get_strategy(&self, category: LibraryType) -> Result<Arc<dyn Strategy>, StrategyError> {
        self.strategies
            .get(&category)
            .cloned()
            .ok_or_else(|| StrategyError::NoStrategy {
                category: category.id().to_string(),
                suggestion: format!(
                    "Register a strategy for '{}' or force one of: {}",
                    category.id(),
                    self.category_ids().join(", ")
                ),
            })
    }

    /// Resolves the strategy for `category` and applies it to `base`
    pub fn apply_strategy(
        &self,
        category: LibraryType,
        base: &BuildConfig,
    ) -> Result<StrategyOutcome, StrategyError> {
        let strategy = self.get_strategy(category)?;

        if let Some(reason) = strategy.unsupported_reason(base) {
            let supported: Vec<String> = strategy
                .supported_formats()
                .iter()
                .map(|f| f.to_string())
                .collect();
            return Err(StrategyError::NotApplicable {
                strategy: strategy.name().to_string(),
                reason,
                suggestion: format!(
                    "Use output formats from [{}] or set `libraryType` to a category the {} strategy handles",
                    supported.join(", "),
                    strategy.name()
                ),
            });
        }

        let transformed = strategy.apply(base);
        let plugins = strategy.recommended_plugins(&transformed.config);
        let mut config = transformed.config;
        config.add_plugins(plugins.iter().cloned());

        debug!(
            "Applied {} strategy: {} plugins, {} warnings",
            strategy.name(),
            plugins.len(),
            transformed.warnings.len()
        );

        Ok(StrategyOutcome {
            strategy: strategy.name().to_string(),
            config,
            plugins,
            warnings: transformed.warnings,
        })
    }

    /// Registered categories, in identifier order
    pub fn categories(&self) -> Vec<LibraryType> {
        let mut categories: Vec<LibraryType> = self.strategies.keys().copied().collect();
        categories.sort_by_key(|c| c.id());
        categories
    }

    fn category_ids(&self) -> Vec<&'static str> {
        self.categories().iter().map(|c| c.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
