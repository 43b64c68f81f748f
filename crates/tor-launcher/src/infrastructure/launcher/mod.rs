//! Launcher infrastructure: process execution and clipboard access.
//!
//! - [`process::TokioProcessRunner`] runs launch candidates with
//!   `tokio::process`, applying the forced environment variables, capturing
//!   error output, and killing a child that exceeds the attempt timeout.
//! - [`clipboard::SystemClipboard`] writes plain text through `arboard`.
//! - [`mock`] holds scripted doubles for both ports, so the launch sequence
//!   can be exercised without real browsers or a display.

pub mod clipboard;
pub mod mock;
pub mod process;
