//! ManageBookmarksUseCase: the write-through bookmark store.
//!
//! [`BookmarkBook`] loads the bookmark list once from a
//! [`BookmarkRepository`] and keeps it in memory for the lifetime of the
//! process.  Every successful mutation immediately re-serializes the entire
//! list; there is no batching and no partial write.
//!
//! # Load states
//!
//! Loading distinguishes three situations through [`StoreStatus`]:
//!
//! ```text
//! file present + parses   ──►  Ready
//! file absent             ──►  Fresh        (first run, empty store)
//! read or parse failure   ──►  Unavailable  (empty store, reason kept)
//! ```
//!
//! `Unavailable` still yields an empty, usable store, but the front end can
//! tell it apart from a genuinely empty one.  The first save after an
//! `Unavailable` load asks the repository to move the unreadable data aside
//! ([`BookmarkRepository::backup`]); if that fails the change is refused, so
//! the old file is never silently overwritten.  [`BookmarkBook::take_backup`]
//! hands the backup location to the front end once.
//!
//! # Id repair
//!
//! Records stored without an id, or repeating an earlier record's id, get a
//! fresh id on load.  When that happens the list is saved straight away so
//! the ids stay the same in the next process.
//!
//! # Save failures
//!
//! If persisting fails after a mutation, the in-memory list is rolled back
//! to its previous state and the error is returned, so memory and disk never
//! disagree.

use std::path::PathBuf;

use thiserror::Error;
use tor_launcher_core::{
    validate_draft, Bookmark, BookmarkDraft, BookmarkId, BookmarkList, ListError,
    StoredBookmark, ValidationError, ValidationMode,
};
use tracing::{debug, info, warn};

/// Error type for bookmark store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing bookmarks at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bookmarks file is not a JSON array of bookmark records.
    #[error("failed to parse bookmarks JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// The bookmark list could not be serialized.
    #[error("failed to serialize bookmarks: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The submitted form did not pass validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The unreadable bookmarks file could not be moved aside, so it was
    /// left untouched and the change refused.
    #[error("could not back up the unreadable bookmarks file, leaving it untouched: {0}")]
    Backup(#[source] Box<StoreError>),

    /// No bookmark with the given id exists.
    #[error("Bookmark not found")]
    NotFound(BookmarkId),
}

impl From<ListError> for StoreError {
    fn from(e: ListError) -> Self {
        match e {
            ListError::NotFound(id) => StoreError::NotFound(id),
        }
    }
}

/// Persistence port for the bookmark list.
///
/// The production implementation is the JSON file adapter in
/// `infrastructure::storage::bookmarks`; tests use the in-memory adapter in
/// `infrastructure::storage::memory`.
pub trait BookmarkRepository: Send {
    /// Reads the persisted list.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet.  Records
    /// may lack an id; [`BookmarkList::from_stored`] assigns one.
    fn load(&self) -> Result<Option<Vec<StoredBookmark>>, StoreError>;

    /// Overwrites the persisted list with `bookmarks`.
    fn save(&self, bookmarks: &[Bookmark]) -> Result<(), StoreError>;

    /// Moves the persisted data out of the way without reading it.
    ///
    /// Called before the first save that would replace data [`load`] could
    /// not read.  Returns where the data went, or `Ok(None)` if there was
    /// nothing to move.
    ///
    /// [`load`]: BookmarkRepository::load
    fn backup(&self) -> Result<Option<PathBuf>, StoreError>;
}

/// Outcome of the initial load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    /// The persisted list was read successfully.
    Ready,
    /// Nothing was persisted yet; the store starts empty.
    Fresh,
    /// The persisted list could not be read; the store starts empty.
    Unavailable { reason: String },
}

impl StoreStatus {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreStatus::Unavailable { .. })
    }
}

/// Loads the persisted list, treating every failure as an empty list.
///
/// Failures are logged at `warn` level and otherwise swallowed.  Prefer
/// [`BookmarkBook::open`], which keeps the failure visible as
/// [`StoreStatus::Unavailable`].
pub fn load_or_empty(repository: &dyn BookmarkRepository) -> Vec<Bookmark> {
    match repository.load() {
        Ok(Some(records)) => BookmarkList::from_stored(records).0.into_vec(),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("bookmark store unavailable, starting empty: {e}");
            Vec::new()
        }
    }
}

/// The in-memory bookmark list mirrored to a repository on every change.
pub struct BookmarkBook {
    repository: Box<dyn BookmarkRepository>,
    list: BookmarkList,
    status: StoreStatus,
    mode: ValidationMode,
    /// Set while the unreadable persisted data has not been moved aside yet.
    backup_pending: bool,
    backup: Option<PathBuf>,
}

impl BookmarkBook {
    /// Loads the list once from `repository`.
    ///
    /// Never fails: read and parse errors produce an empty store with
    /// [`StoreStatus::Unavailable`].  If any stored id had to be assigned,
    /// the repaired list is saved once; a failure there is only logged.
    pub fn open(repository: Box<dyn BookmarkRepository>, mode: ValidationMode) -> Self {
        let (list, status) = match repository.load() {
            Ok(Some(records)) => {
                let (list, repairs) = BookmarkList::from_stored(records);
                info!("loaded {} bookmarks", list.len());
                if !repairs.is_empty() {
                    info!(
                        missing = repairs.missing,
                        duplicated = repairs.duplicated,
                        "assigned fresh bookmark ids, rewriting the store"
                    );
                    if let Err(e) = repository.save(list.as_slice()) {
                        warn!("failed to persist repaired bookmark ids: {e}");
                    }
                }
                (list, StoreStatus::Ready)
            }
            Ok(None) => {
                info!("no bookmarks file yet, starting with an empty store");
                (BookmarkList::new(), StoreStatus::Fresh)
            }
            Err(e) => {
                warn!("bookmark store unavailable, starting empty: {e}");
                (
                    BookmarkList::new(),
                    StoreStatus::Unavailable {
                        reason: e.to_string(),
                    },
                )
            }
        };

        let backup_pending = status.is_unavailable();
        Self {
            repository,
            list,
            status,
            mode,
            backup_pending,
            backup: None,
        }
    }

    pub fn status(&self) -> &StoreStatus {
        &self.status
    }

    /// Where the unreadable persisted data was moved, reported once.
    pub fn take_backup(&mut self) -> Option<PathBuf> {
        self.backup.take()
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn bookmarks(&self) -> &BookmarkList {
        &self.list
    }

    pub fn get(&self, id: BookmarkId) -> Option<&Bookmark> {
        self.list.get(id)
    }

    /// See [`BookmarkList::resolve`].
    pub fn resolve(&self, id_or_name: &str) -> Option<&Bookmark> {
        self.list.resolve(id_or_name)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Validates `draft`, appends it with a fresh id, and persists the list.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] if the draft is rejected (nothing changes),
    /// or the repository error if saving fails (the append is rolled back).
    pub fn add(&mut self, draft: &BookmarkDraft) -> Result<Bookmark, StoreError> {
        let fields = validate_draft(draft, self.mode)?;
        let bookmark = Bookmark::new(fields);
        let previous = self.list.clone();
        self.list.push(bookmark.clone());
        self.commit(previous)?;
        info!(id = %bookmark.id, "bookmark added");
        Ok(bookmark)
    }

    /// Validates `draft` and replaces the bookmark with `id` in place.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] for a rejected draft,
    /// [`StoreError::NotFound`] for an unknown id (the list is unchanged in
    /// both cases), or the repository error if saving fails (rolled back).
    pub fn update(&mut self, id: BookmarkId, draft: &BookmarkDraft) -> Result<Bookmark, StoreError> {
        let fields = validate_draft(draft, self.mode)?;
        let updated = Bookmark::with_id(id, fields);
        let previous = self.list.clone();
        self.list.replace(id, updated.clone())?;
        self.commit(previous)?;
        info!(%id, "bookmark updated");
        Ok(updated)
    }

    /// Removes the bookmark with `id` and persists the list.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] for an unknown id, or the repository error if
    /// saving fails (the removal is rolled back).
    pub fn delete(&mut self, id: BookmarkId) -> Result<Bookmark, StoreError> {
        let previous = self.list.clone();
        let removed = self.list.remove(id)?;
        self.commit(previous)?;
        info!(%id, "bookmark deleted");
        Ok(removed)
    }

    /// Case-insensitive substring search over names and URLs, in list order.
    pub fn find_matching(&self, query: &str) -> Vec<&Bookmark> {
        self.list.find_matching(query)
    }

    /// One visibility flag per bookmark for the given search text.
    pub fn visibility_mask(&self, query: &str) -> Vec<bool> {
        self.list.visibility_mask(query)
    }

    /// Persists the current list, restoring `previous` if that fails.
    fn commit(&mut self, previous: BookmarkList) -> Result<(), StoreError> {
        if self.backup_pending {
            match self.repository.backup() {
                Ok(path) => {
                    if let Some(path) = &path {
                        info!(path = %path.display(), "moved unreadable bookmarks aside");
                    }
                    self.backup_pending = false;
                    self.backup = path;
                }
                Err(e) => {
                    warn!("refusing to overwrite unreadable bookmarks: {e}");
                    self.list = previous;
                    return Err(StoreError::Backup(Box::new(e)));
                }
            }
        }

        match self.repository.save(self.list.as_slice()) {
            Ok(()) => {
                debug!("persisted {} bookmarks", self.list.len());
                self.status = StoreStatus::Ready;
                Ok(())
            }
            Err(e) => {
                warn!("failed to persist bookmarks, rolling back: {e}");
                self.list = previous;
                Err(e)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
