//! tor-launcher library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does tor-launcher do?
//!
//! It keeps a small list of named `.onion` bookmarks in a JSON file and
//! opens them on request:
//!
//! 1. The bookmark store is loaded once at start-up and every change is
//!    written straight back to disk.
//! 2. "Open" walks a fixed list of browser commands (desktop opener, Tor
//!    Browser launcher, its Flatpak, a manual bundle) and stops at the first
//!    one that works, falling back to the desktop opener.
//! 3. Alternatively the URL is copied to the clipboard for pasting into an
//!    already running Tor Browser.

/// Application layer: use cases.
pub mod application;

/// Infrastructure layer: file storage, process launching, clipboard, and
/// the command surface consumed by front ends.
pub mod infrastructure;
