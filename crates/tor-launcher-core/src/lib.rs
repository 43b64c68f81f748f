//! # tor-launcher-core
//!
//! Shared library for tor-launcher containing the bookmark domain entities,
//! onion address validation, and the ordered in-memory bookmark list.
//!
//! This crate has zero dependencies on the file system, processes, or UI
//! frameworks.  Everything here can be tested without any external setup.
//!
//! # Overview
//!
//! tor-launcher keeps a small list of named `.onion` URLs.  A user adds,
//! edits, deletes and searches them, then "opens" one by launching a browser
//! or copying the URL to the clipboard.
//!
//! - **`domain::bookmark`** – the [`Bookmark`] record, its stable
//!   [`BookmarkId`], and the unvalidated [`BookmarkDraft`] a form produces.
//!
//! - **`domain::validation`** – turns a draft into validated fields, with a
//!   strict Tor v3 onion mode and a lenient "anything non-empty" mode.
//!
//! - **`domain::list`** – [`BookmarkList`], the insertion-ordered collection
//!   with id-keyed mutation and case-insensitive search.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `tor_launcher_core::Bookmark` instead of `tor_launcher_core::domain::bookmark::Bookmark`.
pub use domain::bookmark::{Bookmark, BookmarkDraft, BookmarkId, StoredBookmark};
pub use domain::list::{BookmarkList, IdRepairs, ListError};
pub use domain::validation::{is_onion_v3_url, validate_draft, ValidatedFields, ValidationError, ValidationMode};
