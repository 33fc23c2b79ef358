use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use tracing::debug;

/// Session handle shared by one top-level detection call.
///
/// Holds the per-root file listing cache and a cancellation flag. Cancelling
/// drops every cached listing and wakes any task awaiting [`cancelled`](Self::cancelled).
#[derive(Clone, Default)]
pub struct DetectionContext {
    inner: Arc<ContextInner>,
}

#[derive(Default)]
struct ContextInner {
    files: Mutex<HashMap<PathBuf, Arc<Vec<PathBuf>>>>,
    cancelled: AtomicBool,
    notify: Notify,
}

impl DetectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        let dropped = {
            let mut files = self.lock_files();
            let count = files.len();
            files.clear();
            count
        };
        debug!(dropped_roots = dropped, "Detection context cancelled");
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Cached listing for `root`, if one was stored in this session
    pub fn cached_files(&self, root: &Path) -> Option<Arc<Vec<PathBuf>>> {
        self.lock_files().get(root).cloned()
    }

    /// Cached files located under `dir`, looked up through the listing of `root`
    pub fn cached_files_under(&self, root: &Path, dir: &Path) -> Vec<PathBuf> {
        self.cached_files(root)
            .map(|files| files.iter().filter(|f| f.starts_with(dir)).cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn store_files(&self, root: &Path, files: Arc<Vec<PathBuf>>) {
        if self.is_cancelled() {
            return;
        }
        self.lock_files().insert(root.to_path_buf(), files);
    }

    fn lock_files(&self) -> MutexGuard<'_, HashMap<PathBuf, Arc<Vec<PathBuf>>>> {
        self.inner
            .files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for DetectionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionContext")
            .field("cancelled", &self.is_cancelled())
            .field("cached_roots", &self.lock_files().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancel_drops_cache() {
        let ctx = DetectionContext::new();
        let root = PathBuf::from("/repo");
        ctx.store_files(&root, Arc::new(vec![root.join("a.py")]));
        assert!(ctx.cached_files(&root).is_some());

        ctx.cancel();
        assert!(ctx.is_cancelled());
        assert!(ctx.cached_files(&root).is_none());

        ctx.store_files(&root, Arc::new(vec![]));
        assert!(ctx.cached_files(&root).is_none());
    }

    #[test]
    fn test_cached_files_under() {
        let ctx = DetectionContext::new();
        let root = PathBuf::from("/repo");
        ctx.store_files(
            &root,
            Arc::new(vec![root.join("a/x.go"), root.join("ab/y.go"), root.join("b/z.go")]),
        );

        assert_eq!(ctx.cached_files_under(&root, &root.join("a")), vec![root.join("a/x.go")]);
        assert!(ctx.cached_files_under(Path::new("/other"), &root).is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiter() {
        let ctx = DetectionContext::new();
        let waiter = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.cancelled().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        ctx.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_returns_immediately_when_already_cancelled() {
        let ctx = DetectionContext::new();
        ctx.cancel();
        tokio::time::timeout(Duration::from_millis(100), ctx.cancelled())
            .await
            .expect("already cancelled");
    }
}
