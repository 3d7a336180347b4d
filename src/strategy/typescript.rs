use super::{validate_common, warn_unused_option, Strategy, Transformed, ValidationReport};
use crate::category::LibraryType;
use crate::config::{BuildConfig, PluginDescriptor, TypeScriptOptions};
use serde_json::json;

/// Plain TypeScript libraries: declarations on, no framework handling
pub struct TypeScriptStrategy;

impl Strategy for TypeScriptStrategy {
    fn name(&self) -> &str {
        "typescript"
    }

    fn priority(&self) -> i32 {
        6
    }

    fn supported_categories(&self) -> &[LibraryType] {
        &[LibraryType::TypeScript]
    }

    fn apply(&self, config: &BuildConfig) -> Transformed {
        let mut transformed = Transformed::new(config.clone());
        let out = &mut transformed.config;

        let mut typescript = out.typescript.take().unwrap_or_default();
        typescript.declaration = true;
        out.typescript = Some(typescript);

        out.vue = None;

        if transformed.config.style.is_some() {
            transformed.warn("`style` options only apply to imported stylesheets");
        }

        transformed
    }

    fn recommended_plugins(&self, config: &BuildConfig) -> Vec<PluginDescriptor> {
        let mut plugins = vec![PluginDescriptor::new("typescript")];
        let declarations = config
            .typescript
            .as_ref()
            .map(|ts| ts.declaration)
            .unwrap_or(false);
        if declarations {
            plugins.push(PluginDescriptor::new("dts").with_options(json!({
                "isolatedDeclarations": config
                    .typescript
                    .as_ref()
                    .map(|ts| ts.isolated_declarations)
                    .unwrap_or(false)
            })));
        }
        plugins
    }

    fn validate_config(&self, config: &BuildConfig) -> ValidationReport {
        let mut report = validate_common(config);
        if !is_typescript_entry(&config.input) {
            report.warning(format!(
                "Entry '{}' is not a TypeScript file",
                config.input
            ));
            report.suggest("Point `input` at a .ts or .tsx entry to emit declarations");
        }
        if matches!(
            config.typescript,
            Some(TypeScriptOptions {
                declaration: false,
                ..
            })
        ) {
            report.warning("Declaration output is disabled");
        }
        if config.vue.is_some() {
            warn_unused_option(&mut report, "vue", "TypeScript");
        }
        report
    }
}

pub(super) fn is_typescript_entry(input: &str) -> bool {
    input.ends_with(".ts") || input.ends_with(".tsx") || input.ends_with(".mts")
}
