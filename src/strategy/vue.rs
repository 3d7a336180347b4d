use super::typescript::is_typescript_entry;
use super::{validate_common, Strategy, Transformed, ValidationReport};
use crate::category::{Category, LibraryType};
use crate::config::{BuildConfig, PluginDescriptor};

/// Vue component libraries, both majors
pub struct VueStrategy;

impl VueStrategy {
    fn version_for(config: &BuildConfig) -> u8 {
        match config.library_type {
            Some(LibraryType::Vue2) => 2,
            Some(LibraryType::Vue3) => 3,
            _ => config.vue.as_ref().and_then(|v| v.version).unwrap_or(3),
        }
    }
}

impl Strategy for VueStrategy {
    fn name(&self) -> &str {
        "vue"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn supported_categories(&self) -> &[LibraryType] {
        &[LibraryType::Vue2, LibraryType::Vue3]
    }

    fn apply(&self, config: &BuildConfig) -> Transformed {
        let mut transformed = Transformed::new(config.clone());
        let version = Self::version_for(config);

        let mut vue = transformed.config.vue.take().unwrap_or_default();
        vue.version = Some(version);
        transformed.config.vue = Some(vue);

        transformed.config.add_externals(&["vue"]);
        transformed
            .config
            .globals
            .entry("vue".to_string())
            .or_insert_with(|| "Vue".to_string());

        transformed
    }

    fn recommended_plugins(&self, config: &BuildConfig) -> Vec<PluginDescriptor> {
        let sfc = if Self::version_for(config) == 2 {
            "vue2"
        } else {
            "vue3"
        };
        let mut plugins = vec![PluginDescriptor::new(sfc), PluginDescriptor::new("vue-jsx")];
        if config.typescript.is_some() || is_typescript_entry(&config.input) {
            plugins.push(PluginDescriptor::new("typescript"));
        }
        plugins.push(PluginDescriptor::new("postcss"));
        plugins
    }

    fn validate_config(&self, config: &BuildConfig) -> ValidationReport {
        let mut report = validate_common(config);
        if !config.external.iter().any(|e| e == "vue") {
            report.warning("`vue` is not external; it will be bundled into the library");
            report.suggest("Add `vue` to `external`");
        }
        if let Some(category) = config.library_type {
            let detected = Self::version_for(config);
            let requested = config.vue.as_ref().and_then(|v| v.version);
            if let Some(requested) = requested.filter(|v| *v != detected) {
                report.warning(format!(
                    "`vue.version` {} does not match library type {}; SFCs compile for Vue {}",
                    requested,
                    category.id(),
                    detected
                ));
            }
        }
        report
    }
}
