//! TOML-based settings persistence.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\TorLauncher\config.toml`
//! - Linux:    `~/.config/tor-launcher/config.toml`
//! - macOS:    `~/Library/Application Support/TorLauncher/config.toml`
//!
//! The bookmarks file sits next to it as `bookmarks.json` unless
//! `store.bookmarks_file` overrides the location.
//!
//! ```toml
//! [general]
//! log_level = "info"
//!
//! [store]
//! validation = "strict_onion"
//!
//! [launcher]
//! open_action = "launch"
//! attempt_timeout_secs = 5
//! already_running_phrase = "already running"
//! generic_opener = ["xdg-open"]
//!
//! [launcher.env]
//! DISPLAY = ":0"
//!
//! [[launcher.candidates]]
//! label = "torbrowser-launcher"
//! program = "torbrowser-launcher"
//! args = []
//! ```
//!
//! # Serde default values
//!
//! Every section and field has a default, so an empty or partial file is
//! valid and a missing file behaves like an empty one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tor_launcher_core::ValidationMode;

use crate::application::open_bookmark::{CommandSpec, LaunchPlan, OpenAction, PhraseClassifier};

/// Name of the per-user directory holding both files.
const APP_DIR_NAME: &str = "tor-launcher";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The config parsed but describes something unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level settings stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub launcher: LauncherConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` filter used when `RUST_LOG` is unset: `"error"`, `"warn"`,
    /// `"info"`, `"debug"`, `"trace"`, or a full directive string.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Bookmark store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// How strictly URLs are validated on add and edit.
    #[serde(default)]
    pub validation: ValidationMode,
    /// Overrides the default `bookmarks.json` location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmarks_file: Option<PathBuf>,
}

/// Launch settings.
///
/// Plain values come before `env` and `candidates` so the struct serializes
/// to valid TOML (values must precede tables).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LauncherConfig {
    /// What activating a bookmark does.
    #[serde(default)]
    pub open_action: OpenAction,
    /// Upper bound for each candidate attempt, in seconds.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
    /// Error output containing this phrase means the browser is already running.
    #[serde(default = "default_already_running_phrase")]
    pub already_running_phrase: String,
    /// Program and leading arguments of the desktop URL opener.
    #[serde(default = "default_generic_opener")]
    pub generic_opener: Vec<String>,
    /// Variables forced into every launched process's environment.
    #[serde(default = "default_env")]
    pub env: BTreeMap<String, String>,
    /// Commands tried in order; the URL is appended to each.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<CandidateEntry>,
}

/// One launch candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateEntry {
    /// Short name used in logs.
    pub label: String,
    /// Program name or path.  A leading `~/` expands to the home directory.
    pub program: String,
    /// Arguments placed before the URL.
    #[serde(default)]
    pub args: Vec<String>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_attempt_timeout_secs() -> u64 {
    5
}
fn default_already_running_phrase() -> String {
    PhraseClassifier::DEFAULT_PHRASE.to_string()
}
fn default_env() -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert("DISPLAY".to_string(), ":0".to_string());
    env
}

fn default_generic_opener() -> Vec<String> {
    #[cfg(target_os = "windows")]
    {
        vec!["cmd".into(), "/C".into(), "start".into(), "".into()]
    }

    #[cfg(target_os = "macos")]
    {
        vec!["open".into()]
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        vec!["xdg-open".into()]
    }
}

fn default_candidates() -> Vec<CandidateEntry> {
    let opener = default_generic_opener();
    let (opener_program, opener_args) = match opener.split_first() {
        Some((program, args)) => (program.clone(), args.to_vec()),
        None => (String::new(), Vec::new()),
    };
    vec![
        CandidateEntry {
            label: opener_program.clone(),
            program: opener_program,
            args: opener_args,
        },
        CandidateEntry {
            label: "torbrowser-launcher".to_string(),
            program: "torbrowser-launcher".to_string(),
            args: Vec::new(),
        },
        CandidateEntry {
            label: "torbrowser-launcher (flatpak)".to_string(),
            program: "flatpak".to_string(),
            args: vec![
                "run".to_string(),
                "com.github.micahflee.torbrowser-launcher".to_string(),
            ],
        },
        CandidateEntry {
            label: "start-tor-browser".to_string(),
            program: "~/tor-browser/Browser/start-tor-browser".to_string(),
            args: Vec::new(),
        },
    ]
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            open_action: OpenAction::default(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            already_running_phrase: default_already_running_phrase(),
            generic_opener: default_generic_opener(),
            env: default_env(),
            candidates: default_candidates(),
        }
    }
}

impl LauncherConfig {
    /// Builds the launch plan, expanding `~/` in programs and arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `generic_opener` is empty, since
    /// the fallback must always have something to run.
    pub fn to_launch_plan(&self) -> Result<LaunchPlan, ConfigError> {
        let home = home_dir();
        let (program, args) = self
            .generic_opener
            .split_first()
            .ok_or_else(|| ConfigError::Invalid("launcher.generic_opener is empty".to_string()))?;

        let generic_opener = CommandSpec::new(
            program.clone(),
            expand_home(program, home.as_deref()),
            args.iter().map(|a| expand_home(a, home.as_deref())).collect(),
        );
        let candidates = self
            .candidates
            .iter()
            .map(|c| {
                CommandSpec::new(
                    c.label.clone(),
                    expand_home(&c.program, home.as_deref()),
                    c.args.iter().map(|a| expand_home(a, home.as_deref())).collect(),
                )
            })
            .collect();

        Ok(LaunchPlan {
            candidates,
            generic_opener,
            attempt_timeout: Duration::from_secs(self.attempt_timeout_secs),
        })
    }

    /// Returns the forced environment as a list of pairs.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        self.env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Replaces a leading `~/` with `home`.  Other strings are returned as-is.
pub fn expand_home(raw: &str, home: Option<&Path>) -> String {
    match (raw.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().into_owned(),
        _ => raw.to_string(),
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("USERPROFILE").map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("HOME").map(PathBuf::from)
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for both files.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Resolves the default bookmarks file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn default_bookmarks_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("bookmarks.json"))
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to `path`.
///
/// Creates the parent directory if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("TorLauncher"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("TorLauncher")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join(APP_DIR_NAME))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
