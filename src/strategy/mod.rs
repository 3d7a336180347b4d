//! Build strategies
//!
//! A strategy is bound to one or more [`LibraryType`]s and knows how to turn
//! a generic [`BuildConfig`] into a category-specific one. Strategies are
//! registered once in a [`StrategyRegistry`] and dispatched by category.

mod component;
mod mixed;
mod registry;
mod style;
mod typescript;
mod vue;

pub use component::ComponentStrategy;
pub use mixed::MixedStrategy;
pub use registry::{StrategyOutcome, StrategyRegistry};
pub use style::StyleStrategy;
pub use typescript::TypeScriptStrategy;
pub use vue::VueStrategy;

use crate::category::{Category, LibraryType};
use crate::config::{BuildConfig, OutputFormat, PluginDescriptor};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

pub const ALL_FORMATS: &[OutputFormat] = &[
    OutputFormat::Esm,
    OutputFormat::Cjs,
    OutputFormat::Umd,
    OutputFormat::Iife,
];

pub const MODULE_FORMATS: &[OutputFormat] = &[OutputFormat::Esm, OutputFormat::Cjs];

/// Result of a strategy transform before plugins are attached
#[derive(Debug, Clone)]
pub struct Transformed {
    pub config: BuildConfig,
    /// Non-fatal advisories, e.g. framework tooling to prefer
    pub warnings: Vec<String>,
}

impl Transformed {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Outcome of [`Strategy::validate_config`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            valid: true,
            ..Default::default()
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn suggest(&mut self, message: impl Into<String>) {
        self.suggestions.push(message.into());
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.valid &= other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.suggestions.extend(other.suggestions);
    }
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid regex"))
}

/// Checks shared by every strategy
/// Options a strategy strips can come back through user overrides, so the
/// warning is raised against the final config rather than during `apply`
pub(super) fn warn_unused_option(report: &mut ValidationReport, option: &str, kind: &str) {
    report.warning(format!(
        "`{}` options have no effect on {} libraries and are passed through unchanged",
        option, kind
    ));
}

pub fn validate_common(config: &BuildConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    if config.input.trim().is_empty() {
        report.error("No build input configured");
        report.suggest("Set `input` to the library entry point, e.g. src/index.ts");
    }

    if config.output.format.is_empty() {
        report.error("No output formats configured");
        report.suggest("Set `output.format` to at least one of: esm, cjs, umd, iife");
    }

    let global_formats: Vec<String> = config
        .output
        .format
        .iter()
        .filter(|f| f.needs_global_name())
        .map(|f| f.to_string())
        .collect();
    match &config.output.name {
        None if !global_formats.is_empty() => {
            report.warning(format!(
                "{} output without `output.name`",
                global_formats.join("/")
            ));
            report.suggest("Set `output.name` to the global variable name of the bundle");
        }
        Some(name) if !identifier_re().is_match(name) => {
            report.error(format!(
                "`output.name` '{}' is not a valid JavaScript identifier",
                name
            ));
        }
        _ => {}
    }

    report
}

/// Category-specific build behavior
pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    /// Higher priority strategies are preferred when several could serve
    fn priority(&self) -> i32;

    fn supported_categories(&self) -> &[LibraryType];

    fn supported_formats(&self) -> &[OutputFormat] {
        ALL_FORMATS
    }

    /// Why the strategy cannot serve `config`, if it cannot
    fn unsupported_reason(&self, config: &BuildConfig) -> Option<String> {
        if let Some(forced) = config.library_type {
            if !self.supported_categories().contains(&forced) {
                return Some(format!(
                    "library type '{}' is not handled by the {} strategy",
                    forced.id(),
                    self.name()
                ));
            }
        }
        config
            .output
            .format
            .iter()
            .find(|f| !self.supported_formats().contains(f))
            .map(|f| format!("output format '{}' is not supported", f))
    }

    fn is_applicable(&self, config: &BuildConfig) -> bool {
        self.unsupported_reason(config).is_none()
    }

    fn apply(&self, config: &BuildConfig) -> Transformed;

    fn recommended_plugins(&self, config: &BuildConfig) -> Vec<PluginDescriptor>;

    fn validate_config(&self, config: &BuildConfig) -> ValidationReport {
        validate_common(config)
    }
}
