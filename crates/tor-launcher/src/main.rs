//! Tor Launcher command-line entry point.
//!
//! Loads the settings file, wires the production adapters into an
//! [`AppState`], runs one command through the `ui_bridge` surface, and prints
//! the result.
//!
//! ```text
//! main()
//!  └─ load_config_from()         -- TOML settings (defaults if absent)
//!  └─ tracing_subscriber init    -- RUST_LOG, else general.log_level
//!  └─ AppState::from_config()    -- bookmarks file, process runner, clipboard
//!  └─ dispatch(BookmarkCommand)  -- one ui_bridge command
//! ```
//!
//! Results go to stdout, logs and notices to stderr.  The process exits with
//! status 1 when the command reports failure.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tor_launcher::infrastructure::{
    storage::config::{config_file_path, load_config_from, save_config_to, AppConfig},
    ui_bridge::{self, AppState, BookmarkDto, CommandResult},
};
use tor_launcher_core::BookmarkDraft;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Onion bookmark manager and Tor Browser launcher.
#[derive(Debug, Parser)]
#[command(name = "tor-launcher", version)]
struct Cli {
    /// Settings file.  Defaults to `config.toml` in the platform config
    /// directory.
    #[arg(long, global = true, env = "TOR_LAUNCHER_CONFIG")]
    config: Option<PathBuf>,

    /// Bookmarks file.  Overrides `store.bookmarks_file`.
    #[arg(long, global = true, env = "TOR_LAUNCHER_BOOKMARKS")]
    bookmarks: Option<PathBuf>,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Bookmarks(BookmarkCommand),
    /// Write the default settings to the settings file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Commands that run against the bookmark store.
#[derive(Debug, Subcommand)]
enum BookmarkCommand {
    /// List every bookmark.
    List,
    /// Show bookmarks whose name or URL contains QUERY (case-insensitive).
    Search { query: String },
    /// Add a bookmark.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        /// Absolute path to an icon image.
        #[arg(long)]
        icon: Option<String>,
    },
    /// Edit a bookmark.  Omitted fields keep their current value.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long, conflicts_with = "clear_icon")]
        icon: Option<String>,
        /// Remove the icon.
        #[arg(long)]
        clear_icon: bool,
    },
    /// Delete a bookmark by id.
    Delete { id: String },
    /// Launch a browser for a bookmark (id or name).
    Open { target: String },
    /// Copy a bookmark's URL to the clipboard (id or name).
    Copy { target: String },
    /// Run the configured primary action for a bookmark (id or name).
    Activate { target: String },
    /// Report whether the bookmarks file loaded cleanly.
    Status,
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_bookmark(b: &BookmarkDto) {
    match &b.icon_path {
        Some(icon) => println!("{}  {}  {}  [{}]", b.id, b.name, b.url, icon),
        None => println!("{}  {}  {}", b.id, b.name, b.url),
    }
}

/// Prints `result` and returns its success flag.
fn report<T: Serialize>(result: CommandResult<T>, json: bool, text: impl Fn(&T)) -> anyhow::Result<bool> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("failed to encode result")?
        );
    } else {
        if let Some(data) = &result.data {
            text(data);
        }
        if let Some(notice) = &result.notice {
            eprintln!("{notice}");
        }
        if let Some(error) = &result.error {
            eprintln!("{error}");
        }
    }

    Ok(result.success)
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

async fn dispatch(state: Arc<AppState>, command: BookmarkCommand, json: bool) -> anyhow::Result<bool> {
    let list = |items: &Vec<BookmarkDto>| items.iter().for_each(print_bookmark);

    match command {
        BookmarkCommand::List => report(ui_bridge::list_bookmarks(state).await, json, list),
        BookmarkCommand::Search { query } => {
            report(ui_bridge::search_bookmarks(state, query).await, json, list)
        }
        BookmarkCommand::Add { name, url, icon } => {
            let draft = BookmarkDraft {
                name,
                url,
                icon_path: icon,
            };
            report(ui_bridge::add_bookmark(state, draft).await, json, print_bookmark)
        }
        BookmarkCommand::Edit {
            id,
            name,
            url,
            icon,
            clear_icon,
        } => {
            let found = ui_bridge::get_bookmark(Arc::clone(&state), id).await;
            let Some(current) = found.data.clone() else {
                return report(found, json, print_bookmark);
            };
            let draft = BookmarkDraft {
                name: name.unwrap_or(current.name),
                url: url.unwrap_or(current.url),
                icon_path: if clear_icon {
                    None
                } else {
                    icon.or(current.icon_path)
                },
            };
            report(
                ui_bridge::update_bookmark(state, current.id, draft).await,
                json,
                print_bookmark,
            )
        }
        BookmarkCommand::Delete { id } => {
            report(ui_bridge::delete_bookmark(state, id).await, json, print_bookmark)
        }
        BookmarkCommand::Open { target } => report(ui_bridge::open_bookmark(state, target).await, json, |r| {
            if let Some(via) = &r.via {
                println!("launched via {via}");
            }
        }),
        BookmarkCommand::Copy { target } => {
            report(ui_bridge::copy_bookmark(state, target).await, json, |_| {})
        }
        BookmarkCommand::Activate { target } => {
            report(ui_bridge::activate_bookmark(state, target).await, json, |r| {
                println!("{}", r.action);
            })
        }
        BookmarkCommand::Status => report(ui_bridge::store_status(state).await, json, |s| {
            match &s.reason {
                Some(reason) => println!("{} ({} bookmarks): {}", s.state, s.count, reason),
                None => println!("{} ({} bookmarks)", s.state, s.count),
            }
        }),
    }
}

/// Writes the default settings to `path`; `false` if it already exists.
fn init_config(path: &std::path::Path, force: bool) -> anyhow::Result<bool> {
    if path.exists() && !force {
        eprintln!("{} already exists (use --force to overwrite)", path.display());
        return Ok(false);
    }
    save_config_to(&AppConfig::default(), path)
        .with_context(|| format!("failed to write settings to {}", path.display()))?;
    println!("{}", path.display());
    Ok(true)
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Settings come first: they carry the fallback log level.
    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => config_file_path().context("could not locate the settings file")?,
    };
    // `init-config --force` must be able to replace an unreadable file.
    let config = match (&cli.command, load_config_from(&config_path)) {
        (Command::InitConfig { force: true }, Err(e)) => {
            eprintln!("ignoring unreadable settings: {e}");
            AppConfig::default()
        }
        (_, loaded) => loaded
            .with_context(|| format!("failed to load settings from {}", config_path.display()))?,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.general.log_level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    debug!(path = %config_path.display(), "settings loaded");

    let succeeded = match cli.command {
        Command::InitConfig { force } => init_config(&config_path, force)?,
        Command::Bookmarks(command) => {
            let state = AppState::from_config(config, cli.bookmarks.clone())
                .context("failed to initialise the bookmark store")?;
            dispatch(state, command, cli.json).await?
        }
    };

    if succeeded {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_add_with_icon() {
        let cli = Cli::parse_from([
            "tor-launcher",
            "add",
            "--name",
            "Forum",
            "--url",
            "http://example.onion",
            "--icon",
            "/tmp/icon.png",
        ]);
        match cli.command {
            Command::Bookmarks(BookmarkCommand::Add { name, icon, .. }) => {
                assert_eq!(name, "Forum");
                assert_eq!(icon.as_deref(), Some("/tmp/icon.png"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_accepted_after_subcommand() {
        // Arrange / Act
        let cli = Cli::parse_from([
            "tor-launcher",
            "list",
            "--bookmarks",
            "/tmp/b.json",
            "--json",
        ]);

        // Assert
        assert_eq!(cli.bookmarks, Some(PathBuf::from("/tmp/b.json")));
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Bookmarks(BookmarkCommand::List)));
    }

    #[test]
    fn test_init_config_is_parsed_apart_from_store_commands() {
        let cli = Cli::parse_from(["tor-launcher", "init-config", "--force"]);
        assert!(matches!(cli.command, Command::InitConfig { force: true }));
    }

    #[test]
    fn test_edit_rejects_icon_with_clear_icon() {
        let result = Cli::try_parse_from([
            "tor-launcher",
            "edit",
            "some-id",
            "--icon",
            "/x.png",
            "--clear-icon",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_init_config_writes_defaults_once() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("torl_cli_test_{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");

        // Act
        let first = init_config(&path, false).expect("first write");
        let second = init_config(&path, false).expect("second write");

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(load_config_from(&path).expect("load"), AppConfig::default());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_report_returns_command_success_flag() {
        let ok = report(CommandResult::ok(1), true, |_| {}).expect("report");
        let failed = report(CommandResult::<i32>::err("boom"), true, |_| {}).expect("report");
        assert!(ok);
        assert!(!failed);
    }
}
