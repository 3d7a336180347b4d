use super::{Strategy, Transformed};
use crate::category::LibraryType;
use crate::config::{BuildConfig, PluginDescriptor, TypeScriptOptions};

/// Libraries with no dominant category: declarations plus style extraction
pub struct MixedStrategy;

impl Strategy for MixedStrategy {
    fn name(&self) -> &str {
        "mixed"
    }

    fn priority(&self) -> i32 {
        2
    }

    fn supported_categories(&self) -> &[LibraryType] {
        &[LibraryType::Mixed]
    }

    fn apply(&self, config: &BuildConfig) -> Transformed {
        let mut transformed = Transformed::new(config.clone());
        let out = &mut transformed.config;

        let mut typescript = out.typescript.take().unwrap_or(TypeScriptOptions {
            declaration: true,
            isolated_declarations: false,
        });
        typescript.declaration = true;
        out.typescript = Some(typescript);

        let mut style = out.style.take().unwrap_or_default();
        style.extract = true;
        out.style = Some(style);

        transformed.warn("No dominant library type detected; using mixed defaults");
        transformed
    }

    fn recommended_plugins(&self, config: &BuildConfig) -> Vec<PluginDescriptor> {
        let mut plugins = vec![PluginDescriptor::new("typescript")];
        if config.vue.is_some() || config.external.iter().any(|e| e == "vue") {
            plugins.push(PluginDescriptor::new("vue3"));
        }
        plugins.push(PluginDescriptor::new("postcss"));
        plugins.push(PluginDescriptor::new("dts"));
        plugins
    }
}
