//! Application layer use cases.
//!
//! Use cases in this layer orchestrate domain objects to fulfil a user goal
//! and depend on abstractions (traits) rather than concrete implementations,
//! so the infrastructure can be swapped without changing this code.  No file
//! system access and no process spawning happen here directly.
//!
//! # Sub-modules
//!
//! - **`manage_bookmarks`** – The write-through bookmark store: loads the
//!   list once through a [`BookmarkRepository`](manage_bookmarks::BookmarkRepository),
//!   applies validated add/update/delete operations, and persists the whole
//!   list after every change.
//!
//! - **`open_bookmark`** – Opens a URL by walking an ordered list of launch
//!   candidates through a [`ProcessRunner`](open_bookmark::ProcessRunner), or
//!   copies it to a [`Clipboard`](open_bookmark::Clipboard).

pub mod manage_bookmarks;
pub mod open_bookmark;
