//! Read-only file system capability used by evidence collection

use anyhow::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub file_type: FileType,
}

impl FileMetadata {
    pub fn is_file(&self) -> bool {
        matches!(self.file_type, FileType::File)
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.file_type, FileType::Directory)
    }

    /// Size in bytes
    pub fn len(&self) -> u64 {
        self.size
    }
}

/// One child of a listed directory
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }
}

/// Bounds for a recursive source tree walk
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub max_depth: usize,
    pub max_files: usize,
    /// Directory names that are never descended into
    pub skip_dirs: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_files: 5000,
            skip_dirs: ["node_modules", ".git", "dist", "build"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl WalkOptions {
    pub fn skips(&self, dir_name: &str) -> bool {
        self.skip_dirs.iter().any(|d| d == dir_name)
    }
}

/// Everything classification needs to know about a project tree.
///
/// Probes (`exists`, `is_file`, `is_dir`) never fail; a path that cannot be
/// inspected simply reports `false`.
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Immediate children of `path`, sorted by name
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Files below `root` as root-relative paths, honouring `options`
    fn walk_files(&self, root: &Path, options: &WalkOptions) -> Result<Vec<PathBuf>>;
}
