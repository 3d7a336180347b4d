//! Category tables consumed by the evidence collector and classifier

use crate::category::Category;
use serde::Serialize;
use serde_json::Value;

/// Exclude globs applied to every category's file patterns
pub const COMMON_EXCLUDES: &[&str] = &[
    "node_modules/**",
    "dist/**",
    "build/**",
    "**/*.test.*",
    "**/*.spec.*",
    "**/*.d.ts",
];

/// Signals that indicate a category
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionPatterns {
    /// Globs matched against root-relative source paths
    pub files: Vec<String>,
    /// Dependency names; a version qualifier (`vue@^2`) is ignored when matching
    pub dependencies: Vec<String>,
    /// Config files that must exist at the project root
    pub configs: Vec<String>,
    /// Top-level manifest keys
    pub manifest_fields: Vec<String>,
    /// Globs removed from the file matches for this category only
    pub excludes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportLevel {
    Excellent,
    Good,
    Fair,
}

/// How well external engines handle a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Compatibility {
    pub rollup: SupportLevel,
    pub rolldown: SupportLevel,
    pub treeshaking: bool,
    pub code_splitting: bool,
    pub bundleless: bool,
}

impl Compatibility {
    pub const fn new(
        rollup: SupportLevel,
        rolldown: SupportLevel,
        treeshaking: bool,
        code_splitting: bool,
        bundleless: bool,
    ) -> Self {
        Self {
            rollup,
            rolldown,
            treeshaking,
            code_splitting,
            bundleless,
        }
    }
}

/// Everything the engine knows about one category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryProfile<C: Category> {
    pub category: C,
    pub patterns: DetectionPatterns,
    /// Distinctiveness of the category's evidence, applied to the weighted sum
    pub multiplier: f64,
    /// Tie-break priority, higher wins
    pub priority: i32,
    /// Recommended config fragment merged above the built-in defaults
    pub recommended: Value,
    pub compatibility: Option<Compatibility>,
    /// Recommended plugin names
    pub plugins: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl<C: Category> CategoryProfile<C> {
    pub fn new(category: C) -> Self {
        Self {
            category,
            patterns: DetectionPatterns::default(),
            multiplier: 1.0,
            priority: 0,
            recommended: Value::Object(Default::default()),
            compatibility: None,
            plugins: Vec::new(),
        }
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn files(mut self, files: &[&str]) -> Self {
        self.patterns.files = owned(files);
        self
    }

    pub fn dependencies(mut self, dependencies: &[&str]) -> Self {
        self.patterns.dependencies = owned(dependencies);
        self
    }

    pub fn configs(mut self, configs: &[&str]) -> Self {
        self.patterns.configs = owned(configs);
        self
    }

    pub fn manifest_fields(mut self, fields: &[&str]) -> Self {
        self.patterns.manifest_fields = owned(fields);
        self
    }

    pub fn excludes(mut self, excludes: &[&str]) -> Self {
        self.patterns.excludes = owned(excludes);
        self
    }

    pub fn recommended(mut self, recommended: Value) -> Self {
        self.recommended = recommended;
        self
    }

    pub fn compatibility(mut self, compatibility: Compatibility) -> Self {
        self.compatibility = Some(compatibility);
        self
    }

    pub fn plugins(mut self, plugins: &[&str]) -> Self {
        self.plugins = owned(plugins);
        self
    }
}

/// A closed set of category profiles sharing a manifest file and fallback
#[derive(Debug, Clone)]
pub struct Taxonomy<C: Category> {
    name: &'static str,
    manifest_file: String,
    fallback: C,
    common_excludes: Vec<String>,
    profiles: Vec<CategoryProfile<C>>,
}

impl<C: Category> Taxonomy<C> {
    pub fn new(name: &'static str, manifest_file: impl Into<String>, fallback: C) -> Self {
        Self {
            name,
            manifest_file: manifest_file.into(),
            fallback,
            common_excludes: owned(COMMON_EXCLUDES),
            profiles: Vec::new(),
        }
    }

    /// Adds a profile, replacing any earlier profile for the same category
    pub fn with_profile(mut self, profile: CategoryProfile<C>) -> Self {
        self.profiles.retain(|p| p.category != profile.category);
        self.profiles.push(profile);
        self
    }

    pub fn with_common_excludes(mut self, excludes: &[&str]) -> Self {
        self.common_excludes = owned(excludes);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn manifest_file(&self) -> &str {
        &self.manifest_file
    }

    /// Category reported when no score clears the threshold
    pub fn fallback(&self) -> C {
        self.fallback
    }

    pub fn common_excludes(&self) -> &[String] {
        &self.common_excludes
    }

    pub fn profiles(&self) -> &[CategoryProfile<C>] {
        &self.profiles
    }

    pub fn profile(&self, category: C) -> Option<&CategoryProfile<C>> {
        self.profiles.iter().find(|p| p.category == category)
    }

    pub fn priority(&self, category: C) -> i32 {
        self.profile(category).map(|p| p.priority).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::LibraryType;
    use serde_json::json;

    #[test]
    fn test_profile_builder() {
        let profile = CategoryProfile::new(LibraryType::React)
            .multiplier(0.95)
            .priority(10)
            .files(&["src/**/*.tsx"])
            .dependencies(&["react", "react-dom"])
            .recommended(json!({"external": ["react"]}))
            .plugins(&["typescript"]);

        assert_eq!(profile.priority, 10);
        assert_eq!(profile.patterns.dependencies.len(), 2);
        assert!(profile.patterns.configs.is_empty());
        assert_eq!(profile.recommended["external"][0], "react");
    }

    #[test]
    fn test_with_profile_replaces_same_category() {
        let taxonomy = Taxonomy::new("test", "package.json", LibraryType::Mixed)
            .with_profile(CategoryProfile::new(LibraryType::Lit).priority(1))
            .with_profile(CategoryProfile::new(LibraryType::Lit).priority(8));

        assert_eq!(taxonomy.profiles().len(), 1);
        assert_eq!(taxonomy.priority(LibraryType::Lit), 8);
        assert_eq!(taxonomy.priority(LibraryType::React), 0);
        assert_eq!(taxonomy.fallback(), LibraryType::Mixed);
        assert_eq!(taxonomy.common_excludes().len(), COMMON_EXCLUDES.len());
    }

    #[test]
    fn test_compatibility_serializes_camel_case() {
        let compat = Compatibility::new(
            SupportLevel::Excellent,
            SupportLevel::Good,
            true,
            true,
            false,
        );
        let value = serde_json::to_value(compat).unwrap();
        assert_eq!(value["rollup"], "excellent");
        assert_eq!(value["codeSplitting"], true);
    }
}
