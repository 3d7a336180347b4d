use super::{DirEntry, FileMetadata, FileSystem, FileType, WalkOptions};
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn file_type_of(path: &Path) -> FileType {
    if path.is_file() {
        FileType::File
    } else if path.is_dir() {
        FileType::Directory
    } else {
        FileType::Symlink
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let meta = fs::metadata(path).context(format!("Failed to get metadata for {:?}", path))?;

        let file_type = if meta.is_file() {
            FileType::File
        } else if meta.is_dir() {
            FileType::Directory
        } else {
            FileType::Symlink
        };

        Ok(FileMetadata {
            size: meta.len(),
            file_type,
        })
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let entries = fs::read_dir(path).context(format!("Failed to read directory {:?}", path))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            let file_type = file_type_of(&path);

            result.push(DirEntry {
                path,
                name,
                file_type,
            });
        }

        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        path.canonicalize()
            .context(format!("Failed to canonicalize path {:?}", path))
    }

    fn walk_files(&self, root: &Path, options: &WalkOptions) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            anyhow::bail!("Walk root is not a directory: {:?}", root);
        }

        let has_git_dir = root.join(".git").exists();
        let skip = options.clone();

        let mut files = Vec::new();
        for result in WalkBuilder::new(root)
            .max_depth(Some(options.max_depth))
            .hidden(false)
            .git_ignore(has_git_dir)
            .git_global(false)
            .git_exclude(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                !(is_dir && entry.depth() > 0 && skip.skips(&entry.file_name().to_string_lossy()))
            })
            .build()
        {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            if files.len() >= options.max_files {
                warn!(
                    files_scanned = files.len(),
                    max_files = options.max_files,
                    "Reached file limit, stopping walk"
                );
                break;
            }

            let rel_path = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();
            trace!(path = %rel_path.display(), "Walked file");
            files.push(rel_path);
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let base = dir.path();

        fs::create_dir_all(base.join("src/components")).unwrap();
        fs::create_dir_all(base.join("node_modules/vue")).unwrap();
        fs::File::create(base.join("package.json"))
            .unwrap()
            .write_all(b"{\"name\":\"demo\"}")
            .unwrap();
        fs::File::create(base.join("src/index.ts"))
            .unwrap()
            .write_all(b"export {}")
            .unwrap();
        fs::File::create(base.join("src/components/Button.vue"))
            .unwrap()
            .write_all(b"<template></template>")
            .unwrap();
        fs::File::create(base.join("node_modules/vue/index.js"))
            .unwrap()
            .write_all(b"module.exports = {}")
            .unwrap();

        dir
    }

    #[test]
    fn test_exists_and_kinds() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        assert!(fs.exists(temp.path()));
        assert!(fs.is_dir(&temp.path().join("src")));
        assert!(fs.is_file(&temp.path().join("package.json")));
        assert!(!fs.exists(&temp.path().join("nonexistent")));
    }

    #[test]
    fn test_metadata() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let meta = fs.metadata(&temp.path().join("src/index.ts")).unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.len(), 9);
    }

    #[test]
    fn test_read_to_string() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let content = fs.read_to_string(&temp.path().join("package.json")).unwrap();
        assert_eq!(content, "{\"name\":\"demo\"}");
    }

    #[test]
    fn test_read_dir() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let entries = fs.read_dir(temp.path()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.file_name()).collect();

        assert!(names.contains(&"package.json"));
        assert!(names.contains(&"src"));
    }

    #[test]
    fn test_walk_files_skips_dependency_dirs() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let mut files = fs.walk_files(temp.path(), &WalkOptions::default()).unwrap();
        files.sort();

        assert_eq!(
            files,
            vec![
                PathBuf::from("package.json"),
                PathBuf::from("src/components/Button.vue"),
                PathBuf::from("src/index.ts"),
            ]
        );
    }

    #[test]
    fn test_walk_files_respects_max_files() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();
        let options = WalkOptions {
            max_files: 1,
            ..Default::default()
        };

        let files = fs.walk_files(temp.path(), &options).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_walk_files_missing_root() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();

        assert!(fs
            .walk_files(&temp.path().join("missing"), &WalkOptions::default())
            .is_err());
    }
}
