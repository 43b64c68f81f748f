//! Domain entities for tor-launcher.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies.  Code in outer layers (storage, launcher, command surface)
//! depends on the domain, but the domain never depends on them.

/// The bookmark record and its identifier.
pub mod bookmark;

/// Ordered in-memory bookmark collection.
///
/// See [`list::BookmarkList`] for the main type.
pub mod list;

/// Form input validation.
pub mod validation;
