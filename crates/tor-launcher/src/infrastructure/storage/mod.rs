//! Storage infrastructure: bookmark and settings persistence.
//!
//! Both files live in the platform config directory
//! (`~/.config/tor-launcher/` on Linux):
//!
//! - `bookmarks.json` – the bookmark list, handled by [`bookmarks`].
//! - `config.toml` – launcher and store settings, handled by [`config`].
//!
//! [`memory`] provides a repository that never touches the disk, for tests
//! and for front ends that want a throwaway store.

pub mod bookmarks;
pub mod config;
pub mod memory;
