//! In-memory bookmark repository.
//!
//! Allows tests to run the bookmark store without touching the disk, and to
//! inject load, save or backup failures.  Clones share the same contents, so a test
//! can hand one clone to the store and inspect another.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tor_launcher_core::{Bookmark, StoredBookmark};

use crate::application::manage_bookmarks::{BookmarkRepository, StoreError};

#[derive(Default)]
struct Inner {
    contents: Option<Vec<Bookmark>>,
    /// Raw records served by `load` until the next save.
    stored: Option<Vec<StoredBookmark>>,
    save_count: u32,
    backup_count: u32,
    fail_loads: bool,
    fail_saves: bool,
    fail_backups: bool,
}

/// A [`BookmarkRepository`] that keeps the persisted list in memory.
#[derive(Clone, Default)]
pub struct MemoryBookmarkRepository {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBookmarkRepository {
    /// Creates a repository with nothing persisted yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository that already holds `items`.
    pub fn with_contents(items: Vec<Bookmark>) -> Self {
        let repo = Self::new();
        repo.set_contents(Some(items));
        repo
    }

    /// Replaces what [`load`](BookmarkRepository::load) will return.
    pub fn set_contents(&self, contents: Option<Vec<Bookmark>>) {
        self.inner.lock().expect("lock poisoned").contents = contents;
    }

    /// Serves `records` from [`load`](BookmarkRepository::load) as written,
    /// ids missing or repeated, until the next save.
    pub fn set_stored(&self, records: Vec<StoredBookmark>) {
        self.inner.lock().expect("lock poisoned").stored = Some(records);
    }

    /// Returns the last persisted list.
    pub fn contents(&self) -> Option<Vec<Bookmark>> {
        self.inner.lock().expect("lock poisoned").contents.clone()
    }

    /// Returns the number of successful saves.
    pub fn save_count(&self) -> u32 {
        self.inner.lock().expect("lock poisoned").save_count
    }

    /// Returns the number of successful backups.
    pub fn backup_count(&self) -> u32 {
        self.inner.lock().expect("lock poisoned").backup_count
    }

    /// Makes every subsequent load fail.
    pub fn fail_loads(&self, fail: bool) {
        self.inner.lock().expect("lock poisoned").fail_loads = fail;
    }

    /// Makes every subsequent save fail.
    pub fn fail_saves(&self, fail: bool) {
        self.inner.lock().expect("lock poisoned").fail_saves = fail;
    }

    /// Makes every subsequent backup fail.
    pub fn fail_backups(&self, fail: bool) {
        self.inner.lock().expect("lock poisoned").fail_backups = fail;
    }
}

fn injected_failure(kind: std::io::ErrorKind) -> StoreError {
    StoreError::Io {
        path: PathBuf::from("<memory>"),
        source: std::io::Error::new(kind, "injected failure"),
    }
}

impl BookmarkRepository for MemoryBookmarkRepository {
    fn load(&self) -> Result<Option<Vec<StoredBookmark>>, StoreError> {
        let guard = self.inner.lock().expect("lock poisoned");
        if guard.fail_loads {
            return Err(injected_failure(std::io::ErrorKind::PermissionDenied));
        }
        if let Some(stored) = &guard.stored {
            return Ok(Some(stored.clone()));
        }
        Ok(guard
            .contents
            .clone()
            .map(|items| items.into_iter().map(StoredBookmark::from).collect()))
    }

    fn save(&self, bookmarks: &[Bookmark]) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().expect("lock poisoned");
        if guard.fail_saves {
            return Err(injected_failure(std::io::ErrorKind::Other));
        }
        guard.contents = Some(bookmarks.to_vec());
        guard.stored = None;
        guard.save_count += 1;
        Ok(())
    }

    fn backup(&self) -> Result<Option<PathBuf>, StoreError> {
        let mut guard = self.inner.lock().expect("lock poisoned");
        if guard.fail_backups {
            return Err(injected_failure(std::io::ErrorKind::PermissionDenied));
        }
        guard.contents = None;
        guard.stored = None;
        guard.backup_count += 1;
        Ok(Some(PathBuf::from("<memory>.bak")))
    }
}
