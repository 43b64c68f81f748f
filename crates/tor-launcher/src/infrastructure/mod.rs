//! Infrastructure layer for tor-launcher.
//!
//! Contains OS-facing adapters: the JSON bookmarks file and TOML settings,
//! browser process launching, the system clipboard, and the command surface
//! that front ends call.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `tor_launcher_core`, but MUST NOT be imported by the `application` or
//! domain layers.
//!
//! # Sub-modules
//!
//! - **`storage`** – Platform config directory resolution, the bookmarks
//!   JSON file adapter, the `config.toml` settings, and an in-memory
//!   repository for tests.
//!
//! - **`launcher`** – `tokio::process` implementation of `ProcessRunner`,
//!   the `arboard` clipboard adapter, and scripted doubles for tests.
//!
//! - **`ui_bridge`** – Command handlers returning uniform `CommandResult`
//!   envelopes with notice text for toasts.

pub mod launcher;
pub mod storage;
pub mod ui_bridge;
