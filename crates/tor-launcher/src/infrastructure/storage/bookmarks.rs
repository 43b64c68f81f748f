//! JSON file adapter for the bookmark list.
//!
//! The file holds a single JSON array of bookmark objects, pretty-printed
//! with two-space indentation.  Every save rewrites the whole file.
//!
//! A file that cannot be read is renamed to `<file>.bak` (or `<file>.bak.1`,
//! `<file>.bak.2`, ... if taken) before it would be overwritten.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tor_launcher_core::{Bookmark, StoredBookmark};
use tracing::{debug, info};

use crate::application::manage_bookmarks::{BookmarkRepository, StoreError};

/// [`BookmarkRepository`] backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonBookmarkFile {
    path: PathBuf,
}

impl JsonBookmarkFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// First `<file>.bak[.N]` name not already present on disk.
    fn free_backup_path(&self) -> PathBuf {
        let mut n = 0u32;
        loop {
            let mut name = OsString::from(self.path.as_os_str());
            name.push(".bak");
            if n > 0 {
                name.push(format!(".{n}"));
            }
            let candidate = PathBuf::from(name);
            if !candidate.exists() {
                return candidate;
            }
            n += 1;
        }
    }
}

impl BookmarkRepository for JsonBookmarkFile {
    fn load(&self) -> Result<Option<Vec<StoredBookmark>>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "bookmarks file absent");
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let items: Vec<StoredBookmark> =
            serde_json::from_str(&content).map_err(StoreError::Parse)?;
        debug!(path = %self.path.display(), count = items.len(), "bookmarks file read");
        Ok(Some(items))
    }

    fn save(&self, bookmarks: &[Bookmark]) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(bookmarks).map_err(StoreError::Serialize)?;
        std::fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), count = bookmarks.len(), "bookmarks file written");
        Ok(())
    }

    fn backup(&self) -> Result<Option<PathBuf>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let target = self.free_backup_path();
        std::fs::rename(&self.path, &target).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(from = %self.path.display(), to = %target.display(), "bookmarks file backed up");
        Ok(Some(target))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
