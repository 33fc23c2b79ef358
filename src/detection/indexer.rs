use super::context::DetectionContext;
use crate::error::{DetectionError, Result};
use crate::fs::{FileSystem, WalkOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Walks a root once and hands out the regular files below it.
///
/// Listings are ordered by depth, then path, so files at the root come first
/// and a directory's files always precede those of its subdirectories.
#[derive(Clone)]
pub struct FileIndexer {
    fs: Arc<dyn FileSystem>,
    options: WalkOptions,
}

impl FileIndexer {
    pub fn new(fs: Arc<dyn FileSystem>, options: WalkOptions) -> Self {
        Self { fs, options }
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !self.fs.exists(root) {
            return Err(DetectionError::RootNotFound(root.to_path_buf()));
        }
        if !self.fs.is_dir(root) {
            return Err(DetectionError::NotADirectory(root.to_path_buf()));
        }

        let start = Instant::now();
        let mut files = self
            .fs
            .walk_files(root, &self.options)
            .map_err(|e| DetectionError::io(root, e))?;
        sort_by_depth(&mut files);

        info!(
            root = %root.display(),
            files = files.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Indexed source tree"
        );
        Ok(files)
    }

    /// Same as [`list_files`](Self::list_files), reusing the listing stored in `ctx`
    pub fn list_files_cached(&self, root: &Path, ctx: &DetectionContext) -> Result<Arc<Vec<PathBuf>>> {
        if ctx.is_cancelled() {
            return Err(DetectionError::Cancelled);
        }
        if let Some(files) = ctx.cached_files(root) {
            debug!(root = %root.display(), "Using cached file listing");
            return Ok(files);
        }

        let files = Arc::new(self.list_files(root)?);
        ctx.store_files(root, Arc::clone(&files));
        Ok(files)
    }

    /// Regular files directly inside `root`
    pub fn list_root_files(&self, root: &Path, ctx: &DetectionContext) -> Result<Vec<PathBuf>> {
        let files = self.list_files_cached(root, ctx)?;
        Ok(files
            .iter()
            .filter(|f| f.parent() == Some(root))
            .cloned()
            .collect())
    }
}

fn sort_by_depth(files: &mut [PathBuf]) {
    files.sort_by(|a, b| {
        a.components()
            .count()
            .cmp(&b.components().count())
            .then_with(|| a.cmp(b))
    });
}
