use super::{DirEntry, FileSystem, FileType, WalkOptions};
use anyhow::{Context, Result};
use ignore::{overrides::OverrideBuilder, WalkBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

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
            let file_type = if path.is_file() {
                FileType::File
            } else if path.is_dir() {
                FileType::Directory
            } else {
                FileType::Symlink
            };

            result.push(DirEntry {
                path,
                name,
                file_type,
            });
        }

        result.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(result)
    }

    fn walk_files(&self, root: &Path, options: &WalkOptions) -> Result<Vec<PathBuf>> {
        fs::read_dir(root).context(format!("Failed to read root directory {:?}", root))?;

        let mut override_builder = OverrideBuilder::new(root);
        for excluded in &options.excluded_dirs {
            override_builder
                .add(&format!("!{}/", excluded))
                .context(format!("Invalid exclusion pattern for {:?}", excluded))?;
        }
        let overrides = override_builder
            .build()
            .context("Failed to build directory exclusions")?;

        let mut files = Vec::new();
        for result in WalkBuilder::new(root)
            .hidden(false)
            .parents(false)
            .ignore(false)
            .git_global(false)
            .git_exclude(false)
            .git_ignore(options.respect_gitignore)
            .require_git(false)
            .overrides(overrides)
            .build()
        {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    continue;
                }
            };

            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                files.push(entry.into_path());
            }
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

        fs::create_dir_all(base.join("subdir")).unwrap();
        fs::create_dir_all(base.join("node_modules/left-pad")).unwrap();
        fs::File::create(base.join("test.txt"))
            .unwrap()
            .write_all(b"hello world")
            .unwrap();
        fs::File::create(base.join("subdir/nested.txt"))
            .unwrap()
            .write_all(b"nested content")
            .unwrap();
        fs::write(base.join("node_modules/left-pad/index.js"), "module.exports = 1").unwrap();

        dir
    }

    #[test]
    fn test_exists_and_kinds() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        assert!(fs.exists(temp.path()));
        assert!(fs.is_dir(&temp.path().join("subdir")));
        assert!(fs.is_file(&temp.path().join("test.txt")));
        assert!(!fs.exists(&temp.path().join("nonexistent")));
    }

    #[test]
    fn test_read_to_string() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let content = fs.read_to_string(&temp.path().join("test.txt")).unwrap();
        assert_eq!(content, "hello world");
    }

    #[test]
    fn test_read_dir() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let entries = fs.read_dir(temp.path()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.file_name()).collect();

        assert!(names.contains(&"test.txt"));
        assert!(names.contains(&"subdir"));
    }

    #[test]
    fn test_walk_files_skips_excluded_dirs() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let options = WalkOptions::new(vec!["node_modules".to_string()]);
        let files = fs.walk_files(temp.path(), &options).unwrap();

        assert!(files.contains(&temp.path().join("test.txt")));
        assert!(files.contains(&temp.path().join("subdir/nested.txt")));
        assert!(!files.iter().any(|f| f.to_string_lossy().contains("node_modules")));
    }

    #[test]
    fn test_walk_files_honors_gitignore() {
        let temp = create_test_dir();
        fs::write(temp.path().join(".gitignore"), "subdir/\n").unwrap();
        let fs = RealFileSystem::new();

        let files = fs.walk_files(temp.path(), &WalkOptions::default().with_gitignore(true)).unwrap();
        assert!(!files.contains(&temp.path().join("subdir/nested.txt")));

        let files = fs
            .walk_files(temp.path(), &WalkOptions::default().with_gitignore(false))
            .unwrap();
        assert!(files.contains(&temp.path().join("subdir/nested.txt")));
    }

    #[test]
    fn test_walk_missing_root_fails() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();

        let result = fs.walk_files(&temp.path().join("missing"), &WalkOptions::default());
        assert!(result.is_err());
    }
}
