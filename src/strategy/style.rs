use super::{
    validate_common, warn_unused_option, Strategy, Transformed, ValidationReport, MODULE_FORMATS,
};
use crate::category::LibraryType;
use crate::config::{BuildConfig, OutputFormat, PluginDescriptor, StyleOptions};
use serde_json::json;

/// Stylesheet libraries, built bundleless with extraction
pub struct StyleStrategy;

impl Strategy for StyleStrategy {
    fn name(&self) -> &str {
        "style"
    }

    fn priority(&self) -> i32 {
        8
    }

    fn supported_categories(&self) -> &[LibraryType] {
        &[LibraryType::Style]
    }

    fn supported_formats(&self) -> &[OutputFormat] {
        MODULE_FORMATS
    }

    fn apply(&self, config: &BuildConfig) -> Transformed {
        let mut transformed = Transformed::new(config.clone());
        let out = &mut transformed.config;

        out.bundleless = true;
        out.style = Some(out.style.take().unwrap_or(StyleOptions {
            extract: true,
            minimize: true,
            autoprefixer: true,
        }));

        out.typescript = None;
        out.vue = None;

        transformed
    }

    fn recommended_plugins(&self, config: &BuildConfig) -> Vec<PluginDescriptor> {
        let style = config.style.clone().unwrap_or_default();
        vec![
            PluginDescriptor::new("postcss").with_options(json!({
                "extract": style.extract,
                "minimize": style.minimize,
                "autoprefixer": style.autoprefixer
            })),
            PluginDescriptor::new("less"),
            PluginDescriptor::new("sass"),
            PluginDescriptor::new("stylus"),
        ]
    }

    fn validate_config(&self, config: &BuildConfig) -> ValidationReport {
        let mut report = validate_common(config);
        if config.typescript.is_some() {
            warn_unused_option(&mut report, "typescript", "style");
        }
        if config.vue.is_some() {
            warn_unused_option(&mut report, "vue", "style");
        }
        report
    }
}
