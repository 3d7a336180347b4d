use super::typescript::is_typescript_entry;
use super::{
    validate_common, warn_unused_option, Strategy, Transformed, ValidationReport, ALL_FORMATS,
    MODULE_FORMATS,
};
use crate::category::LibraryType;
use crate::config::{BuildConfig, OutputFormat, PluginDescriptor, TypeScriptOptions};
use std::slice;

/// Table-driven strategy for single-framework component libraries
#[derive(Debug, Clone)]
pub struct ComponentStrategy {
    category: LibraryType,
    name: &'static str,
    priority: i32,
    externals: &'static [&'static str],
    globals: &'static [(&'static str, &'static str)],
    plugins: &'static [&'static str],
    formats: &'static [OutputFormat],
    advisory: Option<&'static str>,
}

impl ComponentStrategy {
    pub fn react() -> Self {
        Self {
            category: LibraryType::React,
            name: "react",
            priority: 10,
            externals: &["react", "react-dom", "react/jsx-runtime"],
            globals: &[("react", "React"), ("react-dom", "ReactDOM")],
            plugins: &["react", "typescript", "postcss", "dts"],
            formats: ALL_FORMATS,
            advisory: None,
        }
    }

    pub fn preact() -> Self {
        Self {
            category: LibraryType::Preact,
            name: "preact",
            priority: 9,
            externals: &["preact", "preact/hooks"],
            globals: &[("preact", "preact")],
            plugins: &["preact", "typescript", "postcss", "dts"],
            formats: ALL_FORMATS,
            advisory: None,
        }
    }

    pub fn solid() -> Self {
        Self {
            category: LibraryType::Solid,
            name: "solid",
            priority: 9,
            externals: &["solid-js", "solid-js/web"],
            globals: &[],
            plugins: &["solid", "typescript", "postcss", "dts"],
            formats: ALL_FORMATS,
            advisory: None,
        }
    }

    pub fn svelte() -> Self {
        Self {
            category: LibraryType::Svelte,
            name: "svelte",
            priority: 9,
            externals: &["svelte"],
            globals: &[],
            plugins: &["svelte", "postcss", "dts"],
            formats: ALL_FORMATS,
            advisory: None,
        }
    }

    pub fn lit() -> Self {
        Self {
            category: LibraryType::Lit,
            name: "lit",
            priority: 8,
            externals: &["lit"],
            globals: &[("lit", "Lit")],
            plugins: &["typescript", "postcss", "dts"],
            formats: ALL_FORMATS,
            advisory: None,
        }
    }

    pub fn angular() -> Self {
        Self {
            category: LibraryType::Angular,
            name: "angular",
            priority: 7,
            externals: &["@angular/core", "@angular/common"],
            globals: &[],
            plugins: &["typescript", "dts"],
            formats: MODULE_FORMATS,
            advisory: Some(
                "Angular libraries are best packaged with ng-packagr; only minimal bundling is provided",
            ),
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::react(),
            Self::preact(),
            Self::solid(),
            Self::svelte(),
            Self::lit(),
            Self::angular(),
        ]
    }

    pub fn category(&self) -> LibraryType {
        self.category
    }
}

impl Strategy for ComponentStrategy {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn supported_categories(&self) -> &[LibraryType] {
        slice::from_ref(&self.category)
    }

    fn supported_formats(&self) -> &[OutputFormat] {
        self.formats
    }

    fn apply(&self, config: &BuildConfig) -> Transformed {
        let mut transformed = Transformed::new(config.clone());

        transformed.config.add_externals(self.externals);
        for (module, global) in self.globals {
            transformed
                .config
                .globals
                .entry(module.to_string())
                .or_insert_with(|| global.to_string());
        }

        if transformed.config.typescript.is_none() && is_typescript_entry(&config.input) {
            transformed.config.typescript = Some(TypeScriptOptions {
                declaration: true,
                isolated_declarations: false,
            });
        }
        transformed.config.vue = None;
        if let Some(advisory) = self.advisory {
            transformed.warn(advisory);
        }

        transformed
    }

    fn recommended_plugins(&self, _config: &BuildConfig) -> Vec<PluginDescriptor> {
        self.plugins.iter().map(|p| PluginDescriptor::new(*p)).collect()
    }

    fn validate_config(&self, config: &BuildConfig) -> ValidationReport {
        let mut report = validate_common(config);
        if let Some(framework) = self.externals.first() {
            if !config.external.iter().any(|e| e == framework) {
                report.warning(format!(
                    "`{}` is not external; it will be bundled into the library",
                    framework
                ));
            }
        }
        if config.vue.is_some() {
            warn_unused_option(&mut report, "vue", self.name);
        }
        report
    }
}
