//! The bookmark record.
//!
//! A [`Bookmark`] is a named URL with an optional custom icon.  Each record
//! carries a [`BookmarkId`] assigned once at creation time; edit and delete
//! operations locate records by that id, never by comparing field values, so
//! two bookmarks with identical names and URLs stay independently editable.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::ValidatedFields;

/// Stable opaque identifier for a bookmark, derived from UUID v4.
pub type BookmarkId = Uuid;

/// A named URL record.
///
/// The serialized shape is `{"id", "name", "url", "icon_path"}`.  `icon_path`
/// is omitted when absent.  Files are read through [`StoredBookmark`], which
/// also accepts records without an `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Stable identifier, unique within a list.
    pub id: BookmarkId,
    /// Display name shown on the bookmark card.
    pub name: String,
    /// Target URL, usually an `http://<56 chars>.onion` address.
    pub url: String,
    /// Absolute path to a user-chosen image; `None` uses the default icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<PathBuf>,
}

pub(crate) fn fresh_id() -> BookmarkId {
    Uuid::new_v4()
}

impl Bookmark {
    /// Creates a bookmark with a freshly generated id.
    pub fn new(fields: ValidatedFields) -> Self {
        Self::with_id(fresh_id(), fields)
    }

    /// Creates a bookmark that keeps an existing id (used when editing).
    pub fn with_id(id: BookmarkId, fields: ValidatedFields) -> Self {
        Self {
            id,
            name: fields.name,
            url: fields.url,
            icon_path: fields.icon_path,
        }
    }

    /// Returns `true` if `needle` occurs in the name or URL.
    ///
    /// `needle` must already be lowercased; the comparison lowercases the
    /// record's fields.  An empty needle matches every bookmark.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.url.to_lowercase().contains(needle)
    }
}

/// A bookmark record as read from disk.
///
/// Older files carry no `id`, and a hand-edited file may repeat one, so the
/// id is optional here.  [`BookmarkList::from_stored`] turns a loaded array
/// into a list whose ids are present and unique.
///
/// [`BookmarkList::from_stored`]: super::list::BookmarkList::from_stored
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredBookmark {
    #[serde(default)]
    pub id: Option<BookmarkId>,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon_path: Option<PathBuf>,
}

impl StoredBookmark {
    /// Builds the in-memory record under `id`.
    pub fn into_bookmark(self, id: BookmarkId) -> Bookmark {
        Bookmark {
            id,
            name: self.name,
            url: self.url,
            icon_path: self.icon_path,
        }
    }
}

impl From<Bookmark> for StoredBookmark {
    fn from(b: Bookmark) -> Self {
        Self {
            id: Some(b.id),
            name: b.name,
            url: b.url,
            icon_path: b.icon_path,
        }
    }
}

/// Raw form input for creating or editing a bookmark.
///
/// Nothing here is trusted: run it through
/// [`validate_draft`](super::validation::validate_draft) first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkDraft {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon_path: Option<String>,
}

impl BookmarkDraft {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            icon_path: None,
        }
    }

    /// Sets the icon path.
    pub fn with_icon(mut self, icon_path: impl Into<String>) -> Self {
        self.icon_path = Some(icon_path.into());
        self
    }

    /// Pre-fills a draft from an existing record, as the edit form does.
    pub fn from_bookmark(bookmark: &Bookmark) -> Self {
        Self {
            name: bookmark.name.clone(),
            url: bookmark.url.clone(),
            icon_path: bookmark
                .icon_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
