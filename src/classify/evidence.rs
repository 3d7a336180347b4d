//! Evidence collection
//!
//! Gathers the raw signals the classifier scores: source files matching each
//! category's globs, declared dependencies, config files and manifest fields.
//! Collection never fails; unreadable inputs degrade to zero evidence.

use super::taxonomy::{CategoryProfile, Taxonomy};
use crate::category::Category;
use crate::error::EvidenceReadError;
use crate::fs::{FileSystem, WalkOptions};
use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Ancestor levels searched above the starting directory for a manifest
pub const MAX_ASCENT_LEVELS: usize = 10;

const MEMO_TTL: Duration = Duration::from_secs(5 * 60);
const MEMO_CAPACITY: usize = 100;

/// Matched count against the number of patterns that could have matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceMatch {
    pub matched: usize,
    pub possible: usize,
}

impl SourceMatch {
    pub fn new(matched: usize, possible: usize) -> Self {
        Self { matched, possible }
    }

    /// `matched / possible`, capped at 1.0; zero when nothing was possible
    pub fn ratio(&self) -> f64 {
        if self.possible == 0 {
            return 0.0;
        }
        (self.matched as f64 / self.possible as f64).min(1.0)
    }
}

/// Per-category evidence over the four sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEvidence {
    pub files: SourceMatch,
    pub dependencies: SourceMatch,
    pub configs: SourceMatch,
    pub manifest_fields: SourceMatch,
}

impl CategoryEvidence {
    pub fn is_empty(&self) -> bool {
        self.files.matched == 0
            && self.dependencies.matched == 0
            && self.configs.matched == 0
            && self.manifest_fields.matched == 0
    }
}

/// Evidence for every category of a taxonomy, computed for one project root
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence<C: Category> {
    pub root: PathBuf,
    pub manifest_found: bool,
    pub categories: BTreeMap<C, CategoryEvidence>,
}

impl<C: Category> Evidence<C> {
    pub fn empty(root: PathBuf) -> Self {
        Self {
            root,
            manifest_found: false,
            categories: BTreeMap::new(),
        }
    }

    pub fn get(&self, category: C) -> CategoryEvidence {
        self.categories.get(&category).copied().unwrap_or_default()
    }
}

/// Bounded TTL memo of file-pattern counts keyed by (root, category)
#[derive(Debug)]
pub struct GlobMemo {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<(PathBuf, String), (Instant, usize)>>,
}

impl Default for GlobMemo {
    fn default() -> Self {
        Self::new(MEMO_TTL, MEMO_CAPACITY)
    }
}

impl GlobMemo {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(PathBuf, String), (Instant, usize)>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, root: &Path, category: &str) -> Option<usize> {
        let mut entries = self.lock();
        let key = (root.to_path_buf(), category.to_string());
        match entries.get(&key) {
            Some((at, count)) if at.elapsed() < self.ttl => Some(*count),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, root: &Path, category: &str, count: usize) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.lock();
        let key = (root.to_path_buf(), category.to_string());
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, (at, _))| *at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(key, (Instant::now(), count));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Strips a version qualifier: `vue@^2` -> `vue`, `@scope/pkg@1` -> `@scope/pkg`
pub fn bare_dependency_name(pattern: &str) -> &str {
    match pattern.rfind('@') {
        Some(idx) if idx > 0 => &pattern[..idx],
        _ => pattern,
    }
}

/// Parsed view of the manifest
#[derive(Debug, Default)]
struct Manifest {
    found: bool,
    dependencies: HashSet<String>,
    fields: HashSet<String>,
}

impl Manifest {
    fn from_value(value: &Value) -> Self {
        let mut dependencies = HashSet::new();
        for section in ["dependencies", "devDependencies", "peerDependencies"] {
            if let Some(deps) = value.get(section).and_then(Value::as_object) {
                dependencies.extend(deps.keys().cloned());
            }
        }
        let fields = value
            .as_object()
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default();

        Self {
            found: true,
            dependencies,
            fields,
        }
    }
}

/// Collects [`Evidence`] for a taxonomy through a [`FileSystem`] capability
pub struct EvidenceCollector {
    fs: Arc<dyn FileSystem>,
    fallback_dir: PathBuf,
    walk_options: WalkOptions,
    memo: Arc<GlobMemo>,
}

impl EvidenceCollector {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        let fallback_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            fs,
            fallback_dir,
            walk_options: WalkOptions::default(),
            memo: Arc::new(GlobMemo::default()),
        }
    }

    /// Directory used as the project root when no manifest is found
    pub fn with_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback_dir = dir.into();
        self
    }

    pub fn with_walk_options(mut self, options: WalkOptions) -> Self {
        self.walk_options = options;
        self
    }

    pub fn with_memo(mut self, memo: Arc<GlobMemo>) -> Self {
        self.memo = memo;
        self
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn memo(&self) -> &GlobMemo {
        &self.memo
    }

    /// Finds the nearest ancestor holding `manifest_file`, starting from the
    /// path itself (or its parent when it names a file)
    pub fn resolve_project_root(&self, path: &Path, manifest_file: &str) -> PathBuf {
        let absolute = self.absolute(path);
        let path = absolute.as_path();
        let start = if self.fs.is_file(path) {
            path.parent().unwrap_or(path)
        } else {
            path
        };

        for dir in start.ancestors().take(MAX_ASCENT_LEVELS + 1) {
            if self.fs.is_file(&dir.join(manifest_file)) {
                debug!("Project root resolved to {}", dir.display());
                return dir.to_path_buf();
            }
        }

        debug!(
            "No {} within {} levels of {}, using {}",
            manifest_file,
            MAX_ASCENT_LEVELS,
            start.display(),
            self.fallback_dir.display()
        );
        self.fallback_dir.clone()
    }

    /// Relative paths such as `.` have no ancestors to climb, so anchor them
    /// first. Paths that cannot be canonicalized are joined onto the cwd.
    fn absolute(&self, path: &Path) -> PathBuf {
        match self.fs.canonicalize(path) {
            Ok(resolved) => resolved,
            Err(_) if path.is_relative() => std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf()),
            Err(_) => path.to_path_buf(),
        }
    }

    /// Reads the raw manifest at `root`, if present
    pub fn read_manifest(&self, root: &Path, manifest_file: &str) -> Option<String> {
        let path = root.join(manifest_file);
        if !self.fs.is_file(&path) {
            return None;
        }
        match self.fs.read_to_string(&path) {
            Ok(content) => Some(content),
            Err(source) => {
                let err = EvidenceReadError::Manifest { path, source };
                warn!("{}", err);
                None
            }
        }
    }

    fn load_manifest(&self, root: &Path, manifest_file: &str) -> Manifest {
        let Some(content) = self.read_manifest(root, manifest_file) else {
            return Manifest::default();
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(value) => Manifest::from_value(&value),
            Err(source) => {
                let err = EvidenceReadError::ManifestParse {
                    path: root.join(manifest_file),
                    source,
                };
                warn!("{}", err);
                Manifest::default()
            }
        }
    }

    /// Collects evidence for every profile in the taxonomy
    pub fn collect<C: Category>(&self, path: &Path, taxonomy: &Taxonomy<C>) -> Evidence<C> {
        let root = self.resolve_project_root(path, taxonomy.manifest_file());
        let manifest = self.load_manifest(&root, taxonomy.manifest_file());

        let mut evidence = Evidence::empty(root.clone());
        evidence.manifest_found = manifest.found;

        let mut walked: Option<Vec<PathBuf>> = None;
        for profile in taxonomy.profiles() {
            let memo_key = format!("{}:{}", taxonomy.name(), profile.category.id());
            let file_matches = match self.memo.get(&root, &memo_key) {
                Some(count) => count,
                None => {
                    let files = walked.get_or_insert_with(|| self.walk(&root));
                    let count = count_file_patterns(files, profile, taxonomy.common_excludes());
                    self.memo.insert(&root, &memo_key, count);
                    count
                }
            };

            let patterns = &profile.patterns;
            let dependencies = patterns
                .dependencies
                .iter()
                .filter(|dep| manifest.dependencies.contains(bare_dependency_name(dep)))
                .count();
            let configs = patterns
                .configs
                .iter()
                .filter(|config| self.fs.is_file(&root.join(config.as_str())))
                .count();
            let fields = patterns
                .manifest_fields
                .iter()
                .filter(|field| manifest.fields.contains(field.as_str()))
                .count();

            let category_evidence = CategoryEvidence {
                files: SourceMatch::new(file_matches, patterns.files.len()),
                dependencies: SourceMatch::new(dependencies, patterns.dependencies.len()),
                configs: SourceMatch::new(configs, patterns.configs.len()),
                manifest_fields: SourceMatch::new(fields, patterns.manifest_fields.len()),
            };
            if !category_evidence.is_empty() {
                debug!("{} evidence: {:?}", profile.category.id(), category_evidence);
            }
            evidence
                .categories
                .insert(profile.category, category_evidence);
        }

        evidence
    }

    fn walk(&self, root: &Path) -> Vec<PathBuf> {
        match self.fs.walk_files(root, &self.walk_options) {
            Ok(files) => {
                debug!("Walked {} files under {}", files.len(), root.display());
                files
            }
            Err(source) => {
                let err = EvidenceReadError::Walk {
                    root: root.to_path_buf(),
                    source,
                };
                warn!("{}", err);
                Vec::new()
            }
        }
    }
}

fn compile(pattern: &str) -> Result<Glob, EvidenceReadError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| EvidenceReadError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn exclude_set(common: &[String], specific: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in common.iter().chain(specific) {
        match compile(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(err) => warn!("{}", err),
        }
    }
    builder.build().unwrap_or_else(|e| {
        warn!("Failed to build exclude set: {}", e);
        GlobSet::empty()
    })
}

/// Number of file patterns matching at least one non-excluded file
fn count_file_patterns<C: Category>(
    files: &[PathBuf],
    profile: &CategoryProfile<C>,
    common_excludes: &[String],
) -> usize {
    if files.is_empty() || profile.patterns.files.is_empty() {
        return 0;
    }

    let excludes = exclude_set(common_excludes, &profile.patterns.excludes);
    let candidates: Vec<&PathBuf> = files.iter().filter(|f| !excludes.is_match(f)).collect();

    let matchers: Vec<GlobMatcher> = profile
        .patterns
        .files
        .iter()
        .filter_map(|pattern| match compile(pattern) {
            Ok(glob) => Some(glob.compile_matcher()),
            Err(err) => {
                warn!("{}", err);
                None
            }
        })
        .collect();

    matchers
        .iter()
        .filter(|matcher| candidates.iter().any(|f| matcher.is_match(f)))
        .count()
}
