//! Form input validation.
//!
//! [`validate_draft`] trims the raw fields of a [`BookmarkDraft`] and checks
//! them against a [`ValidationMode`]:
//!
//! - [`ValidationMode::StrictOnion`] requires a Tor v3 onion URL: `http` or
//!   `https`, exactly 56 lowercase base32 characters (`a-z`, `2-7`), the
//!   `.onion` suffix, and at most a single trailing slash.
//! - [`ValidationMode::Lenient`] accepts any non-empty URL.
//!
//! Both modes require a non-empty name and, when an icon is given, an
//! absolute icon path.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::bookmark::BookmarkDraft;

static ONION_V3_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[a-z2-7]{56}\.onion/?$").expect("onion URL pattern is a valid regex")
});

/// Errors reported back to the add/edit form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,

    #[error("URL is required")]
    UrlRequired,

    #[error("Invalid .onion URL format")]
    InvalidOnionUrl,

    /// The icon path must be absolute so it resolves regardless of the
    /// working directory.
    #[error("Icon path must be absolute: {0}")]
    IconPathNotAbsolute(String),
}

/// How strictly the URL field is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Only Tor v3 onion addresses are accepted.
    #[default]
    StrictOnion,
    /// Any non-empty URL is accepted.
    Lenient,
}

/// Trimmed, checked form fields ready to become a bookmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFields {
    pub name: String,
    pub url: String,
    pub icon_path: Option<PathBuf>,
}

/// Returns `true` if `url` is a Tor v3 onion URL.
pub fn is_onion_v3_url(url: &str) -> bool {
    ONION_V3_URL.is_match(url)
}

/// Validates a draft under the given mode.
///
/// Checks run in form order (name, URL, icon) and the first failure is
/// returned.  A blank icon path is treated as "no icon".
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate_draft(
    draft: &BookmarkDraft,
    mode: ValidationMode,
) -> Result<ValidatedFields, ValidationError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }

    let url = draft.url.trim();
    if url.is_empty() {
        return Err(ValidationError::UrlRequired);
    }
    if mode == ValidationMode::StrictOnion && !is_onion_v3_url(url) {
        debug!(len = url.len(), "rejected non-onion URL");
        return Err(ValidationError::InvalidOnionUrl);
    }

    let icon_path = match draft.icon_path.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let path = PathBuf::from(raw);
            if !path.is_absolute() {
                return Err(ValidationError::IconPathNotAbsolute(raw.to_string()));
            }
            Some(path)
        }
    };

    Ok(ValidatedFields {
        name: name.to_string(),
        url: url.to_string(),
        icon_path,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
