//! Command bridge: exposes application-layer operations to front ends.
//!
//! Every command takes the shared [`AppState`] and returns a
//! [`CommandResult`], so a desktop shell (or the bundled CLI) can render any
//! response the same way: data on success, an error string for a message
//! dialog on failure, and an optional notice for a transient toast.
//!
//! # Data Transfer Objects (DTOs)
//!
//! Internal types (`Bookmark`, `Uuid`, `PathBuf`) are converted to plain
//! string-based DTOs before leaving this module, so the JSON shape seen by a
//! web or scripting front end stays stable.
//!
//! # Locking
//!
//! The bookmark store sits behind an async mutex.  Open commands copy the
//! bookmark out and release the lock before launching, so a slow launch
//! attempt never blocks other commands.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tor_launcher_core::{Bookmark, BookmarkDraft, BookmarkId};
use tracing::{error, info};

use crate::application::{
    manage_bookmarks::{BookmarkBook, BookmarkRepository, StoreError, StoreStatus},
    open_bookmark::{
        Clipboard, LaunchReport, LaunchedVia, OpenAction, OpenBookmarkUseCase, Opened,
        PhraseClassifier, ProcessRunner,
    },
};
use crate::infrastructure::{
    launcher::{clipboard::SystemClipboard, process::TokioProcessRunner},
    storage::{
        bookmarks::JsonBookmarkFile,
        config::{default_bookmarks_path, AppConfig, ConfigError},
    },
};

/// Error text shown when a command targets a bookmark that no longer exists.
pub const NOT_FOUND_MESSAGE: &str = "Error: Bookmark not found";

// ── Shared application state ──────────────────────────────────────────────────

/// Application state shared between command invocations.
pub struct AppState {
    /// The write-through bookmark store.
    pub book: Mutex<BookmarkBook>,
    /// Launch and copy actions.
    pub opener: OpenBookmarkUseCase,
    /// What a card click does.
    pub open_action: OpenAction,
}

impl AppState {
    /// Builds state from explicit adapters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the launcher settings do not form
    /// a usable launch plan.
    pub fn new(
        config: AppConfig,
        repository: Box<dyn BookmarkRepository>,
        runner: Arc<dyn ProcessRunner>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Result<Arc<Self>, ConfigError> {
        let plan = config.launcher.to_launch_plan()?;
        let classifier = Arc::new(PhraseClassifier::new(
            config.launcher.already_running_phrase.clone(),
        ));
        let book = BookmarkBook::open(repository, config.store.validation);

        Ok(Arc::new(Self {
            book: Mutex::new(book),
            opener: OpenBookmarkUseCase::new(runner, classifier, clipboard, plan),
            open_action: config.launcher.open_action,
        }))
    }

    /// Builds state with the production adapters: the JSON bookmarks file,
    /// real child processes, and the system clipboard.
    ///
    /// `bookmarks_file` overrides both the configured and the default
    /// location.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoPlatformConfigDir`] if no bookmarks location
    /// can be determined, or [`ConfigError::Invalid`] for unusable launcher
    /// settings.
    pub fn from_config(
        config: AppConfig,
        bookmarks_file: Option<PathBuf>,
    ) -> Result<Arc<Self>, ConfigError> {
        let path = match bookmarks_file.or_else(|| config.store.bookmarks_file.clone()) {
            Some(path) => path,
            None => default_bookmarks_path()?,
        };
        info!(path = %path.display(), "using bookmarks file");

        let runner = Arc::new(TokioProcessRunner::new(config.launcher.env_pairs()));
        Self::new(
            config,
            Box::new(JsonBookmarkFile::new(path)),
            runner,
            Arc::new(SystemClipboard),
        )
    }
}

// ── Data Transfer Objects ─────────────────────────────────────────────────────

/// DTO representing one bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkDto {
    pub id: String,
    pub name: String,
    pub url: String,
    pub icon_path: Option<String>,
}

impl From<&Bookmark> for BookmarkDto {
    fn from(b: &Bookmark) -> Self {
        Self {
            id: b.id.to_string(),
            name: b.name.clone(),
            url: b.url.clone(),
            icon_path: b
                .icon_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
        }
    }
}

/// DTO describing how the store was loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatusDto {
    /// `"ready"`, `"fresh"`, or `"unavailable"`.
    pub state: String,
    pub reason: Option<String>,
    pub count: usize,
}

/// DTO describing a completed open action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenResultDto {
    /// `"launched"` or `"copied"`.
    pub action: String,
    /// Which launch step worked; `None` for copies.
    pub via: Option<String>,
    /// Number of candidate attempts made.
    pub attempts: usize,
}

impl OpenResultDto {
    fn launched(report: &LaunchReport) -> Self {
        let via = match &report.via {
            LaunchedVia::Candidate(label) => label.clone(),
            LaunchedVia::AlreadyRunning(label) => format!("{label} (already running)"),
            LaunchedVia::Fallback => "generic opener".to_string(),
        };
        Self {
            action: "launched".to_string(),
            via: Some(via),
            attempts: report.attempts.len(),
        }
    }

    fn copied() -> Self {
        Self {
            action: "copied".to_string(),
            via: None,
            attempts: 0,
        }
    }
}

/// Unified response wrapper used by all commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    /// Short confirmation for a toast, e.g. `"Bookmark added"`.
    pub notice: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            notice: None,
        }
    }
    pub fn ok_with_notice(data: T, notice: impl Into<String>) -> Self {
        Self {
            notice: Some(notice.into()),
            ..Self::ok(data)
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
            notice: None,
        }
    }
}

fn store_error_message(e: &StoreError) -> String {
    match e {
        StoreError::NotFound(_) => NOT_FOUND_MESSAGE.to_string(),
        StoreError::Validation(v) => v.to_string(),
        other => format!("Failed to save bookmarks: {other}"),
    }
}

/// `done`, plus where the unreadable bookmarks file went if this change
/// was the one that moved it aside.
fn change_notice(book: &mut BookmarkBook, done: &str) -> String {
    match book.take_backup() {
        Some(path) => format!("{done} (unreadable bookmarks file moved to {})", path.display()),
        None => done.to_string(),
    }
}

fn parse_id(raw: &str) -> Result<BookmarkId, String> {
    raw.trim()
        .parse::<BookmarkId>()
        .map_err(|e| format!("invalid bookmark id: {e}"))
}

/// Copies the bookmark matching `target` (id or name) out of the store.
async fn resolve(state: &AppState, target: &str) -> Option<Bookmark> {
    state.book.lock().await.resolve(target).cloned()
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Returns every bookmark in list order.
pub async fn list_bookmarks(state: Arc<AppState>) -> CommandResult<Vec<BookmarkDto>> {
    let book = state.book.lock().await;
    CommandResult::ok(book.bookmarks().iter().map(BookmarkDto::from).collect())
}

/// Returns the bookmark matching `target` (id or name).
pub async fn get_bookmark(state: Arc<AppState>, target: String) -> CommandResult<BookmarkDto> {
    match resolve(&state, &target).await {
        Some(b) => CommandResult::ok(BookmarkDto::from(&b)),
        None => CommandResult::err(NOT_FOUND_MESSAGE),
    }
}

/// Returns the bookmarks matching the live-search text, in list order.
pub async fn search_bookmarks(state: Arc<AppState>, query: String) -> CommandResult<Vec<BookmarkDto>> {
    let book = state.book.lock().await;
    CommandResult::ok(
        book.find_matching(&query)
            .into_iter()
            .map(BookmarkDto::from)
            .collect(),
    )
}

/// Returns one visibility flag per bookmark for the live-search text.
pub async fn visibility_mask(state: Arc<AppState>, query: String) -> CommandResult<Vec<bool>> {
    let book = state.book.lock().await;
    CommandResult::ok(book.visibility_mask(&query))
}

/// Reports whether the store loaded cleanly.
pub async fn store_status(state: Arc<AppState>) -> CommandResult<StoreStatusDto> {
    let book = state.book.lock().await;
    let (label, reason) = match book.status() {
        StoreStatus::Ready => ("ready", None),
        StoreStatus::Fresh => ("fresh", None),
        StoreStatus::Unavailable { reason } => ("unavailable", Some(reason.clone())),
    };
    CommandResult::ok(StoreStatusDto {
        state: label.to_string(),
        reason,
        count: book.len(),
    })
}

/// Validates and appends a new bookmark.
pub async fn add_bookmark(state: Arc<AppState>, draft: BookmarkDraft) -> CommandResult<BookmarkDto> {
    let mut book = state.book.lock().await;
    match book.add(&draft) {
        Ok(b) => {
            let notice = change_notice(&mut book, "Bookmark added");
            CommandResult::ok_with_notice(BookmarkDto::from(&b), notice)
        }
        Err(e) => CommandResult::err(store_error_message(&e)),
    }
}

/// Validates and replaces the bookmark with id `id`.
pub async fn update_bookmark(
    state: Arc<AppState>,
    id: String,
    draft: BookmarkDraft,
) -> CommandResult<BookmarkDto> {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(msg) => return CommandResult::err(msg),
    };
    let mut book = state.book.lock().await;
    match book.update(id, &draft) {
        Ok(b) => {
            let notice = change_notice(&mut book, "Bookmark updated");
            CommandResult::ok_with_notice(BookmarkDto::from(&b), notice)
        }
        Err(e) => CommandResult::err(store_error_message(&e)),
    }
}

/// Removes the bookmark with id `id`.
pub async fn delete_bookmark(state: Arc<AppState>, id: String) -> CommandResult<BookmarkDto> {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(msg) => return CommandResult::err(msg),
    };
    let mut book = state.book.lock().await;
    match book.delete(id) {
        Ok(b) => {
            let notice = change_notice(&mut book, "Bookmark deleted");
            CommandResult::ok_with_notice(BookmarkDto::from(&b), notice)
        }
        Err(e) => CommandResult::err(store_error_message(&e)),
    }
}

/// Launches a browser for the bookmark matching `target`.
pub async fn open_bookmark(state: Arc<AppState>, target: String) -> CommandResult<OpenResultDto> {
    run_action(state, target, Some(OpenAction::Launch)).await
}

/// Copies the URL of the bookmark matching `target` to the clipboard.
pub async fn copy_bookmark(state: Arc<AppState>, target: String) -> CommandResult<OpenResultDto> {
    run_action(state, target, Some(OpenAction::Copy)).await
}

/// Runs the configured primary action (a card click) for `target`.
pub async fn activate_bookmark(state: Arc<AppState>, target: String) -> CommandResult<OpenResultDto> {
    run_action(state, target, None).await
}

async fn run_action(
    state: Arc<AppState>,
    target: String,
    action: Option<OpenAction>,
) -> CommandResult<OpenResultDto> {
    let Some(bookmark) = resolve(&state, &target).await else {
        return CommandResult::err(NOT_FOUND_MESSAGE);
    };
    let action = match action {
        Some(action) => action,
        None => state.open_action,
    };

    match state.opener.activate(action, &bookmark.url).await {
        Ok(Opened::Launched(report)) => CommandResult::ok_with_notice(
            OpenResultDto::launched(&report),
            format!("Opened: {}", bookmark.name),
        ),
        Ok(Opened::Copied) => {
            CommandResult::ok_with_notice(OpenResultDto::copied(), format!("Copied: {}", bookmark.url))
        }
        Err(e) => {
            error!(id = %bookmark.id, "open failed: {e}");
            CommandResult::err(e.to_string())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::launcher::mock::{
        InvocationKind, RecordingClipboard, ScriptedProcessRunner, ScriptedRun,
    };
    use crate::infrastructure::storage::memory::MemoryBookmarkRepository;

    struct Harness {
        state: Arc<AppState>,
        repo: MemoryBookmarkRepository,
        runner: ScriptedProcessRunner,
        clipboard: RecordingClipboard,
    }

    /// Creates a test-isolated AppState that never touches the real
    /// bookmarks file, real processes, or the real clipboard.
    fn harness(config: AppConfig) -> Harness {
        let repo = MemoryBookmarkRepository::new();
        let runner = ScriptedProcessRunner::new();
        let clipboard = RecordingClipboard::new();
        let state = AppState::new(
            config,
            Box::new(repo.clone()),
            Arc::new(runner.clone()),
            Arc::new(clipboard.clone()),
        )
        .expect("default config is valid");
        Harness {
            state,
            repo,
            runner,
            clipboard,
        }
    }

    fn onion(c: char) -> String {
        format!("http://{}.onion", std::iter::repeat(c).take(56).collect::<String>())
    }

    async fn add(h: &Harness, name: &str, c: char) -> BookmarkDto {
        add_bookmark(Arc::clone(&h.state), BookmarkDraft::new(name, onion(c)))
            .await
            .data
            .expect("add succeeds")
    }

    #[tokio::test]
    async fn test_list_bookmarks_returns_empty_list_initially() {
        let h = harness(AppConfig::default());
        let result = list_bookmarks(Arc::clone(&h.state)).await;
        assert!(result.success);
        assert!(result.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_status_reports_fresh_store() {
        let h = harness(AppConfig::default());
        let dto = store_status(Arc::clone(&h.state)).await.data.unwrap();
        assert_eq!(dto.state, "fresh");
        assert_eq!(dto.reason, None);
    }

    #[tokio::test]
    async fn test_add_bookmark_returns_dto_and_notice() {
        // Arrange
        let h = harness(AppConfig::default());

        // Act
        let result = add_bookmark(Arc::clone(&h.state), BookmarkDraft::new("Forum", onion('f'))).await;

        // Assert
        assert!(result.success, "unexpected error: {:?}", result.error);
        assert_eq!(result.notice.as_deref(), Some("Bookmark added"));
        let dto = result.data.unwrap();
        assert_eq!(dto.name, "Forum");
        assert_eq!(h.repo.save_count(), 1);
    }

    #[tokio::test]
    async fn test_add_bookmark_with_invalid_url_reports_validation_message() {
        let h = harness(AppConfig::default());
        let result = add_bookmark(Arc::clone(&h.state), BookmarkDraft::new("Bad", "open://x")).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Invalid .onion URL format"));
        assert_eq!(h.repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_update_bookmark_with_unknown_id_reports_not_found() {
        let h = harness(AppConfig::default());
        let result = update_bookmark(
            Arc::clone(&h.state),
            BookmarkId::new_v4().to_string(),
            BookmarkDraft::new("X", onion('x')),
        )
        .await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some(NOT_FOUND_MESSAGE));
    }

    #[tokio::test]
    async fn test_update_bookmark_with_malformed_id_fails() {
        let h = harness(AppConfig::default());
        let result = update_bookmark(
            Arc::clone(&h.state),
            "not-a-uuid".to_string(),
            BookmarkDraft::new("X", onion('x')),
        )
        .await;
        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("invalid bookmark id"));
    }

    #[tokio::test]
    async fn test_update_then_delete_bookmark() {
        // Arrange
        let h = harness(AppConfig::default());
        let dto = add(&h, "Mail", 'm').await;

        // Act
        let updated = update_bookmark(
            Arc::clone(&h.state),
            dto.id.clone(),
            BookmarkDraft::new("Webmail", onion('w')),
        )
        .await;
        let deleted = delete_bookmark(Arc::clone(&h.state), dto.id.clone()).await;

        // Assert
        assert_eq!(updated.notice.as_deref(), Some("Bookmark updated"));
        assert_eq!(updated.data.unwrap().id, dto.id);
        assert_eq!(deleted.notice.as_deref(), Some("Bookmark deleted"));
        assert_eq!(h.repo.contents(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_save_failure_is_reported_not_panicked() {
        let h = harness(AppConfig::default());
        h.repo.fail_saves(true);

        let result = add_bookmark(Arc::clone(&h.state), BookmarkDraft::new("A", onion('a'))).await;

        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("Failed to save bookmarks"));
        assert!(list_bookmarks(Arc::clone(&h.state)).await.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_and_mask_follow_list_order() {
        let h = harness(AppConfig::default());
        add(&h, "Foo", 'a').await;
        add(&h, "Bar", 'b').await;
        add(&h, "Food", 'c').await;

        let hits = search_bookmarks(Arc::clone(&h.state), "FOO".to_string()).await;
        let mask = visibility_mask(Arc::clone(&h.state), "foo".to_string()).await;

        let names: Vec<String> = hits.data.unwrap().into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["Foo".to_string(), "Food".to_string()]);
        assert_eq!(mask.data.unwrap(), vec![true, false, true]);
    }

    #[tokio::test]
    async fn test_copy_bookmark_by_name_writes_clipboard() {
        // Arrange
        let h = harness(AppConfig::default());
        let dto = add(&h, "Library", 'l').await;

        // Act
        let result = copy_bookmark(Arc::clone(&h.state), "library".to_string()).await;

        // Assert
        assert!(result.success);
        assert_eq!(result.notice, Some(format!("Copied: {}", dto.url)));
        assert_eq!(h.clipboard.texts(), vec![dto.url]);
        assert!(h.runner.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_open_bookmark_walks_candidates_until_success() {
        // Arrange
        let h = harness(AppConfig::default());
        let dto = add(&h, "News", 'n').await;
        h.runner.script("torbrowser-launcher", ScriptedRun::success());

        // Act
        let result = open_bookmark(Arc::clone(&h.state), dto.id.clone()).await;

        // Assert: generic opener (unscripted = missing) first, then torbrowser-launcher
        assert!(result.success, "unexpected error: {:?}", result.error);
        let data = result.data.unwrap();
        assert_eq!(data.via.as_deref(), Some("torbrowser-launcher"));
        assert_eq!(data.attempts, 2);
        assert_eq!(result.notice.as_deref(), Some("Opened: News"));
        assert!(h.runner.programs(InvocationKind::Detached).is_empty());
    }

    #[tokio::test]
    async fn test_activate_bookmark_uses_configured_copy_action() {
        let mut config = AppConfig::default();
        config.launcher.open_action = OpenAction::Copy;
        let h = harness(config);
        let dto = add(&h, "Wiki", 'w').await;

        let result = activate_bookmark(Arc::clone(&h.state), dto.id).await;

        assert_eq!(result.data.unwrap().action, "copied");
        assert_eq!(h.clipboard.texts().len(), 1);
    }

    #[test]
    fn test_app_state_takes_open_action_from_settings() {
        let mut config = AppConfig::default();
        config.launcher.open_action = OpenAction::Copy;
        let h = harness(config);
        assert_eq!(h.state.open_action, OpenAction::Copy);
    }

    /// State over a repository whose persisted data could not be read.
    fn unreadable_harness(fail_backups: bool) -> Harness {
        let repo = MemoryBookmarkRepository::new();
        repo.fail_loads(true);
        repo.fail_backups(fail_backups);
        let runner = ScriptedProcessRunner::new();
        let clipboard = RecordingClipboard::new();
        let state = AppState::new(
            AppConfig::default(),
            Box::new(repo.clone()),
            Arc::new(runner.clone()),
            Arc::new(clipboard.clone()),
        )
        .expect("default config is valid");
        Harness {
            state,
            repo,
            runner,
            clipboard,
        }
    }

    #[tokio::test]
    async fn test_first_add_over_unreadable_store_reports_backup() {
        // Arrange
        let h = unreadable_harness(false);

        // Act
        let first = add_bookmark(Arc::clone(&h.state), BookmarkDraft::new("One", onion('a'))).await;
        let second = add_bookmark(Arc::clone(&h.state), BookmarkDraft::new("Two", onion('b'))).await;

        // Assert
        assert!(first.success);
        assert_eq!(
            first.notice.as_deref(),
            Some("Bookmark added (unreadable bookmarks file moved to <memory>.bak)")
        );
        assert_eq!(second.notice.as_deref(), Some("Bookmark added"));
        assert_eq!(h.repo.backup_count(), 1);
    }

    #[tokio::test]
    async fn test_add_over_unreadable_store_without_backup_is_refused() {
        // Arrange
        let h = unreadable_harness(true);

        // Act
        let result = add_bookmark(Arc::clone(&h.state), BookmarkDraft::new("One", onion('a'))).await;

        // Assert
        assert!(!result.success);
        let error = result.error.expect("error text");
        assert!(error.contains("could not back up the unreadable bookmarks file"), "{error}");
        assert_eq!(h.repo.save_count(), 0);
        let status = store_status(Arc::clone(&h.state)).await.data.expect("status");
        assert_eq!(status.state, "unavailable");
        assert_eq!(status.count, 0);
    }

    #[tokio::test]
    async fn test_open_unknown_bookmark_reports_not_found() {
        let h = harness(AppConfig::default());
        let result = open_bookmark(Arc::clone(&h.state), "ghost".to_string()).await;
        assert_eq!(result.error.as_deref(), Some(NOT_FOUND_MESSAGE));
        assert!(h.runner.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_open_failure_surfaces_raw_error_text() {
        // Arrange: nothing scripted, detached opener fails too
        let h = harness(AppConfig::default());
        let dto = add(&h, "Dead", 'd').await;
        h.runner.fail_detached(true);

        // Act
        let result = open_bookmark(Arc::clone(&h.state), dto.id).await;

        // Assert
        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("could not open URL after 4 attempts"));
    }

    #[test]
    fn test_command_result_ok_sets_success_true() {
        let r: CommandResult<i32> = CommandResult::ok(42);
        assert!(r.success);
        assert_eq!(r.data.unwrap(), 42);
        assert!(r.error.is_none());
        assert!(r.notice.is_none());
    }

    #[test]
    fn test_command_result_err_sets_success_false() {
        let r: CommandResult<i32> = CommandResult::err("something went wrong");
        assert!(!r.success);
        assert!(r.data.is_none());
        assert_eq!(r.error.unwrap(), "something went wrong");
    }

    #[test]
    fn test_app_state_rejects_empty_generic_opener() {
        let mut config = AppConfig::default();
        config.launcher.generic_opener.clear();
        let result = AppState::new(
            config,
            Box::new(MemoryBookmarkRepository::new()),
            Arc::new(ScriptedProcessRunner::new()),
            Arc::new(RecordingClipboard::new()),
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
