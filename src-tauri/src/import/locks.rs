use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OwnedMutexGuard;

type LockMap = HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>;

/// One async mutex per target directory.
///
/// Imports, normalizations and moves into the same folder take the folder's
/// lock so that concurrent calls (e.g. from two windows) never hand out the
/// same name. Keys are lexical: `a/./b` and `a/b` share a lock, symlinked
/// aliases do not. An entry lives only while someone holds or waits on it.
#[derive(Default)]
pub struct DirLocks {
    inner: Mutex<LockMap>,
}

/// Exclusive hold on one directory. Released on drop.
pub struct DirLease<'a> {
    locks: &'a DirLocks,
    key: PathBuf,
    guard: Option<OwnedMutexGuard<()>>,
}

impl DirLocks {
    fn map(&self) -> MutexGuard<'_, LockMap> {
        match self.inner.lock() {
            Ok(m) => m,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Wait until `dir` is free and take it.
    pub async fn acquire(&self, dir: &Path) -> DirLease<'_> {
        let key: PathBuf = dir.components().collect();
        let lock = Arc::clone(self.map().entry(key.clone()).or_default());
        let guard = lock.lock_owned().await;
        DirLease {
            locks: self,
            key,
            guard: Some(guard),
        }
    }

    /// Number of directories currently held or waited on.
    pub fn tracked(&self) -> usize {
        self.map().len()
    }
}

impl Drop for DirLease<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut map = self.locks.map();
        // The map holds one reference; any other belongs to a waiter.
        if map
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&self.key);
        }
    }
}
