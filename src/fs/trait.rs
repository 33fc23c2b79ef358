//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// A directory entry returned by read_dir
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

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// Options for a recursive file listing
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Directory names skipped wherever they appear in the tree
    pub excluded_dirs: Vec<String>,
    /// Honor `.gitignore` files found in the tree
    pub respect_gitignore: bool,
}

impl WalkOptions {
    pub fn new(excluded_dirs: Vec<String>) -> Self {
        Self {
            excluded_dirs,
            respect_gitignore: true,
        }
    }

    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    pub(crate) fn is_excluded(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == name)
    }
}

/// Abstraction over file system operations for testability
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// List directory contents
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// List every regular file below `root`. Fails when `root` cannot be read.
    fn walk_files(&self, root: &Path, options: &WalkOptions) -> Result<Vec<PathBuf>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_entry() {
        let entry = DirEntry {
            path: PathBuf::from("/test/sub"),
            name: "sub".to_string(),
            file_type: FileType::Directory,
        };
        assert_eq!(entry.path(), Path::new("/test/sub"));
        assert_eq!(entry.file_name(), "sub");
        assert!(entry.is_dir());
    }

    #[test]
    fn test_walk_options_exclusion() {
        let options = WalkOptions::new(vec!["node_modules".into()]).with_gitignore(false);
        assert!(options.is_excluded("node_modules"));
        assert!(!options.is_excluded("src"));
        assert!(!options.respect_gitignore);
    }
}
