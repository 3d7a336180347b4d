//! Typed view of the merged build configuration handed to the engine

use crate::category::LibraryType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Esm,
    Cjs,
    Umd,
    Iife,
}

impl OutputFormat {
    /// Formats that bundle into a single global and need `output.name`
    pub fn needs_global_name(&self) -> bool {
        matches!(self, Self::Umd | Self::Iife)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Esm => "esm",
            Self::Cjs => "cjs",
            Self::Umd => "umd",
            Self::Iife => "iife",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    #[default]
    Production,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("Unknown build mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    pub dir: PathBuf,
    pub format: Vec<OutputFormat>,
    pub sourcemap: bool,
    pub minify: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("dist"),
            format: vec![OutputFormat::Esm, OutputFormat::Cjs],
            sourcemap: true,
            minify: false,
            name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Value::Null,
        }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypeScriptOptions {
    pub declaration: bool,
    pub isolated_declarations: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    pub extract: bool,
    pub minimize: bool,
    pub autoprefixer: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VueOptions {
    pub version: Option<u8>,
    pub on_demand: bool,
}

/// Merged configuration; immutable once resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfig {
    pub input: String,
    pub output: OutputOptions,
    pub external: Vec<String>,
    pub globals: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_type: Option<LibraryType>,
    pub mode: BuildMode,
    pub bundleless: bool,
    pub plugins: Vec<PluginDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typescript: Option<TypeScriptOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vue: Option<VueOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    /// Keys this crate does not interpret, passed through to the engine
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            input: "src/index.ts".to_string(),
            output: OutputOptions::default(),
            external: Vec::new(),
            globals: BTreeMap::new(),
            library_type: None,
            mode: BuildMode::default(),
            bundleless: false,
            plugins: Vec::new(),
            typescript: None,
            style: None,
            vue: None,
            cwd: None,
            extra: Map::new(),
        }
    }
}

impl BuildConfig {
    /// Built-in defaults as the lowest merge layer
    pub fn defaults_value() -> Value {
        serde_json::to_value(Self::default()).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name == name)
    }

    /// Appends plugins not already present by name
    pub fn add_plugins(&mut self, plugins: impl IntoIterator<Item = PluginDescriptor>) {
        for plugin in plugins {
            if !self.has_plugin(&plugin.name) {
                self.plugins.push(plugin);
            }
        }
    }

    /// Appends externals not already present
    pub fn add_externals(&mut self, names: &[&str]) {
        for name in names {
            if !self.external.iter().any(|e| e == name) {
                self.external.push(name.to_string());
            }
        }
    }
}
