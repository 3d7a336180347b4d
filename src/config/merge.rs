//! Layered configuration merge
//!
//! Layers apply in increasing precedence:
//! defaults < category recommended < strategy output < user overrides < active mode.
//! Objects merge key by key; arrays are replaced unless their dotted path is
//! opted into concatenation. Inputs are never mutated.

use super::build_config::{BuildConfig, BuildMode};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key holding per-mode override blocks in user overrides
pub const MODES_KEY: &str = "modes";

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Dotted paths whose arrays concatenate instead of being replaced
    pub concat_paths: Vec<String>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            concat_paths: vec!["plugins".to_string()],
        }
    }
}

/// A named merge input
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub name: &'static str,
    pub value: Value,
}

impl ConfigLayer {
    pub fn new(name: &'static str, value: Value) -> Self {
        Self { name, value }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMerger {
    options: MergeOptions,
}

impl ConfigMerger {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merges `overlay` over `base`, returning a new value
    pub fn merge(&self, base: &Value, overlay: &Value) -> Value {
        self.merge_at("", base, overlay)
    }

    fn merge_at(&self, path: &str, base: &Value, overlay: &Value) -> Value {
        match (base, overlay) {
            (Value::Object(base_map), Value::Object(overlay_map)) => {
                let mut merged = base_map.clone();
                for (key, value) in overlay_map {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };
                    let next = match base_map.get(key) {
                        Some(existing) => self.merge_at(&child_path, existing, value),
                        None => value.clone(),
                    };
                    merged.insert(key.clone(), next);
                }
                Value::Object(merged)
            }
            (Value::Array(base_items), Value::Array(overlay_items))
                if self.options.concat_paths.iter().any(|p| p == path) =>
            {
                let mut merged: Vec<Value> = Vec::with_capacity(base_items.len() + overlay_items.len());
                for item in base_items.iter().chain(overlay_items) {
                    if !merged.contains(item) {
                        merged.push(item.clone());
                    }
                }
                Value::Array(merged)
            }
            (_, overlay) => overlay.clone(),
        }
    }

    /// Folds layers left to right. A `null` layer contributes nothing.
    pub fn merge_layers(&self, layers: &[ConfigLayer]) -> Value {
        layers.iter().fold(Value::Object(Map::new()), |acc, layer| {
            if layer.value.is_null() {
                return acc;
            }
            debug!("Merging config layer '{}'", layer.name);
            self.merge(&acc, &layer.value)
        })
    }

    /// Produces the final configuration for `root`
    ///
    /// `modes` is stripped from the user overrides and the block for the
    /// active mode is merged last. `cwd` and an absolute `output.dir` are
    /// derived from the root.
    pub fn resolve(
        &self,
        defaults: &Value,
        recommended: &Value,
        strategy_output: &Value,
        user_overrides: &Value,
        root: &Path,
    ) -> Result<BuildConfig, serde_json::Error> {
        let (overrides, modes) = split_modes(user_overrides);

        let mut merged = self.merge_layers(&[
            ConfigLayer::new("defaults", defaults.clone()),
            ConfigLayer::new("recommended", recommended.clone()),
            ConfigLayer::new("strategy", strategy_output.clone()),
            ConfigLayer::new("overrides", overrides),
        ]);

        let mode = active_mode(&merged);
        if let Some(block) = modes.as_ref().and_then(|m| m.get(mode.as_str())) {
            debug!("Applying '{}' mode overrides", mode);
            merged = self.merge(&merged, block);
        }
        if let Value::Object(map) = &mut merged {
            map.remove(MODES_KEY);
        }

        apply_derived_fields(&mut merged, root);
        BuildConfig::from_value(merged)
    }
}

/// Splits user overrides into the overrides proper and their `modes` block
pub fn split_modes(user_overrides: &Value) -> (Value, Option<Value>) {
    match user_overrides {
        Value::Object(map) => {
            let mut overrides = map.clone();
            let modes = overrides.remove(MODES_KEY);
            (Value::Object(overrides), modes)
        }
        other => (other.clone(), None),
    }
}

fn active_mode(merged: &Value) -> BuildMode {
    merged
        .get("mode")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

fn absolute(root: &Path) -> PathBuf {
    if root.is_absolute() {
        return root.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(root))
        .unwrap_or_else(|_| root.to_path_buf())
}

fn apply_derived_fields(merged: &mut Value, root: &Path) {
    let Value::Object(map) = merged else {
        return;
    };
    let root = absolute(root);
    map.insert(
        "cwd".to_string(),
        Value::String(root.to_string_lossy().into_owned()),
    );

    let output = map
        .entry("output")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(output) = output {
        let dir = output
            .get("dir")
            .and_then(Value::as_str)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("dist"));
        let dir = if dir.is_absolute() { dir } else { root.join(dir) };
        output.insert(
            "dir".to_string(),
            Value::String(dir.to_string_lossy().into_owned()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_objects_merge_recursively() {
        let merger = ConfigMerger::default();
        let base = json!({"output": {"dir": "dist", "sourcemap": true}, "input": "a.ts"});
        let overlay = json!({"output": {"sourcemap": false}});

        let merged = merger.merge(&base, &overlay);
        assert_eq!(
            merged,
            json!({"output": {"dir": "dist", "sourcemap": false}, "input": "a.ts"})
        );
        // inputs untouched
        assert_eq!(base["output"]["sourcemap"], json!(true));
    }

    #[test]
    fn test_arrays_replace_by_default() {
        let merger = ConfigMerger::default();
        let merged = merger.merge(
            &json!({"external": ["vue"], "output": {"format": ["esm", "cjs"]}}),
            &json!({"external": ["react"], "output": {"format": ["umd"]}}),
        );
        assert_eq!(merged["external"], json!(["react"]));
        assert_eq!(merged["output"]["format"], json!(["umd"]));
    }

    #[test]
    fn test_concat_paths_dedupe() {
        let merger = ConfigMerger::default();
        let merged = merger.merge(
            &json!({"plugins": [{"name": "typescript"}, {"name": "dts"}]}),
            &json!({"plugins": [{"name": "dts"}, {"name": "postcss"}]}),
        );
        assert_eq!(
            merged["plugins"],
            json!([{"name": "typescript"}, {"name": "dts"}, {"name": "postcss"}])
        );
    }

    #[test]
    fn test_nested_concat_path() {
        let merger = ConfigMerger::new(MergeOptions {
            concat_paths: vec!["output.banner".to_string()],
        });
        let merged = merger.merge(
            &json!({"output": {"banner": ["a"]}, "plugins": ["x"]}),
            &json!({"output": {"banner": ["b"]}, "plugins": ["y"]}),
        );
        assert_eq!(merged["output"]["banner"], json!(["a", "b"]));
        assert_eq!(merged["plugins"], json!(["y"]));
    }

    #[test]
    fn test_null_replaces() {
        let merger = ConfigMerger::default();
        let merged = merger.merge(&json!({"output": {"name": "Lib"}}), &json!({"output": null}));
        assert_eq!(merged["output"], Value::Null);
    }

    #[test]
    fn test_layers_precedence() {
        let merger = ConfigMerger::default();
        let merged = merger.merge_layers(&[
            ConfigLayer::new("defaults", json!({"input": "a", "minify": false})),
            ConfigLayer::new("recommended", json!({"input": "b"})),
            ConfigLayer::new("strategy", json!({"input": "c", "minify": true})),
            ConfigLayer::new("overrides", json!({"input": "d"})),
        ]);
        assert_eq!(merged, json!({"input": "d", "minify": true}));
    }

    #[test]
    fn test_resolve_applies_active_mode_last() {
        let merger = ConfigMerger::default();
        let overrides = json!({
            "mode": "development",
            "output": {"minify": true},
            "modes": {
                "development": {"output": {"minify": false, "sourcemap": true}},
                "production": {"output": {"minify": true}}
            }
        });
        let config = merger
            .resolve(
                &BuildConfig::defaults_value(),
                &json!({"output": {"sourcemap": false}}),
                &json!({}),
                &overrides,
                Path::new("/work/lib"),
            )
            .unwrap();

        assert_eq!(config.mode, BuildMode::Development);
        assert!(!config.output.minify);
        assert!(config.output.sourcemap);
        assert!(!config.extra.contains_key("modes"));
    }

    #[test]
    fn test_resolve_derives_paths() {
        let merger = ConfigMerger::default();
        let config = merger
            .resolve(
                &BuildConfig::defaults_value(),
                &json!({}),
                &json!({}),
                &json!({"output": {"dir": "out"}}),
                Path::new("/work/lib"),
            )
            .unwrap();

        assert_eq!(config.cwd, Some(PathBuf::from("/work/lib")));
        assert_eq!(config.output.dir, PathBuf::from("/work/lib/out"));

        let absolute_dir = merger
            .resolve(
                &BuildConfig::defaults_value(),
                &json!({}),
                &json!({}),
                &json!({"output": {"dir": "/tmp/out"}}),
                Path::new("/work/lib"),
            )
            .unwrap();
        assert_eq!(absolute_dir.output.dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_split_modes() {
        let (overrides, modes) = split_modes(&json!({"input": "x", "modes": {"production": {}}}));
        assert_eq!(overrides, json!({"input": "x"}));
        assert!(modes.is_some());

        let (overrides, modes) = split_modes(&Value::Null);
        assert_eq!(overrides, Value::Null);
        assert!(modes.is_none());
    }
}
