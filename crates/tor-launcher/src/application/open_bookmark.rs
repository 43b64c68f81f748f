//! OpenBookmarkUseCase: best-effort opening of a bookmark URL.
//!
//! Two primary actions exist, selected by [`OpenAction`]:
//!
//! - **Launch** walks the [`LaunchPlan`]: each candidate command is run with
//!   the URL appended, one after another, each bounded by the attempt
//!   timeout.  The first candidate classified as a success ends the walk.
//! - **Copy** writes the URL to the system clipboard.
//!
//! # Launch sequence
//!
//! ```text
//! candidate 1 ──► candidate 2 ──► ... ──► candidate N ──► generic opener (detached)
//!      │               │                       │
//!   Succeeded ──► done                         │
//!   AlreadyRunning ──► generic opener (detached) ──► done
//!   Failed / timed out / not installed ──► next candidate
//! ```
//!
//! Whether an attempt counts as a success is decided by an
//! [`OutcomeClassifier`] over the exit code and captured error output, so
//! the "already running" heuristic can be replaced without touching the
//! control flow.  There are no retries and no backoff.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// What "open" does for a bookmark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenAction {
    /// Launch a browser process.
    #[default]
    Launch,
    /// Copy the URL to the clipboard.
    Copy,
}

/// A command line without the target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Short name used in logs and reports.
    pub label: String,
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(label: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args,
        }
    }

    /// Returns a copy with `target` appended as the final argument.
    pub fn with_target(&self, target: &str) -> CommandSpec {
        let mut args = self.args.clone();
        args.push(target.to_string());
        CommandSpec {
            label: self.label.clone(),
            program: self.program.clone(),
            args,
        }
    }
}

/// What a finished attempt reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
}

/// Error type for running a single command.
#[derive(Debug, Error)]
pub enum RunError {
    /// The program could not be started (typically: not installed).
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program did not finish within the attempt timeout.
    #[error("{program} did not finish within {after:?}")]
    TimedOut { program: String, after: Duration },

    /// Waiting for the program failed after it started.
    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Process execution port.
///
/// The production implementation uses `tokio::process`; tests use the
/// scripted runner in `infrastructure::launcher::mock` or a `mockall` mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `command` to completion, capturing its error output.
    ///
    /// A run that exceeds `timeout` is abandoned and reported as
    /// [`RunError::TimedOut`].
    async fn run(&self, command: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunError>;

    /// Starts `command` without waiting for it or collecting its output.
    fn spawn_detached(&self, command: &CommandSpec) -> Result<(), RunError>;
}

/// Classification of a finished attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The browser was opened.
    Succeeded,
    /// The browser refused to start a second instance.
    AlreadyRunning,
    /// Anything else.
    Failed,
}

/// Decides what a finished attempt means.
pub trait OutcomeClassifier: Send + Sync {
    fn classify(&self, exit_code: Option<i32>, stderr: &str) -> AttemptOutcome;
}

/// Default classifier: exit code 0 is success; otherwise error output
/// containing the phrase (case-insensitive) means "already running".
#[derive(Debug, Clone)]
pub struct PhraseClassifier {
    phrase: String,
}

impl PhraseClassifier {
    pub const DEFAULT_PHRASE: &'static str = "already running";

    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into().to_lowercase(),
        }
    }
}

impl Default for PhraseClassifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PHRASE)
    }
}

impl OutcomeClassifier for PhraseClassifier {
    fn classify(&self, exit_code: Option<i32>, stderr: &str) -> AttemptOutcome {
        if exit_code == Some(0) {
            AttemptOutcome::Succeeded
        } else if !self.phrase.is_empty() && stderr.to_lowercase().contains(&self.phrase) {
            AttemptOutcome::AlreadyRunning
        } else {
            AttemptOutcome::Failed
        }
    }
}

/// Clipboard port.
pub trait Clipboard: Send + Sync {
    /// Replaces the clipboard contents with `text`.
    fn set_text(&self, text: &str) -> Result<(), String>;
}

/// The fixed, ordered launch strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    /// Tried in order, each with the URL appended.
    pub candidates: Vec<CommandSpec>,
    /// Fired detached after "already running" and after exhaustion.
    pub generic_opener: CommandSpec,
    /// Upper bound for each candidate attempt.
    pub attempt_timeout: Duration,
}

/// How a single candidate attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    /// The process finished and was classified.
    Finished(AttemptOutcome),
    /// The process did not finish within the timeout.
    TimedOut,
    /// The process could not be started or waited on.
    Error(String),
}

/// One entry of a [`LaunchReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub label: String,
    pub result: AttemptResult,
}

/// Which step of the sequence opened the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchedVia {
    /// A candidate finished successfully.
    Candidate(String),
    /// A candidate reported "already running"; the generic opener was fired.
    AlreadyRunning(String),
    /// Every candidate failed; the generic opener was fired.
    Fallback,
}

/// Summary of a successful launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub via: LaunchedVia,
    /// Every candidate attempt made, in order.
    pub attempts: Vec<AttemptRecord>,
}

/// Error type for open operations.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// No candidate succeeded and the final generic opener could not start.
    #[error("could not open URL after {attempts} attempts: {source}")]
    Exhausted {
        attempts: usize,
        #[source]
        source: RunError,
    },

    #[error("failed to copy to clipboard: {0}")]
    Clipboard(String),
}

/// Result of the configured primary action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opened {
    Launched(LaunchReport),
    Copied,
}

/// The Open Bookmark use case.
pub struct OpenBookmarkUseCase {
    runner: Arc<dyn ProcessRunner>,
    classifier: Arc<dyn OutcomeClassifier>,
    clipboard: Arc<dyn Clipboard>,
    plan: LaunchPlan,
}

impl OpenBookmarkUseCase {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        classifier: Arc<dyn OutcomeClassifier>,
        clipboard: Arc<dyn Clipboard>,
        plan: LaunchPlan,
    ) -> Self {
        Self {
            runner,
            classifier,
            clipboard,
            plan,
        }
    }

    pub fn plan(&self) -> &LaunchPlan {
        &self.plan
    }

    /// Runs `action` for `url`.
    ///
    /// # Errors
    ///
    /// See [`launch`](Self::launch) and [`copy`](Self::copy).
    pub async fn activate(&self, action: OpenAction, url: &str) -> Result<Opened, LaunchError> {
        match action {
            OpenAction::Launch => self.launch(url).await.map(Opened::Launched),
            OpenAction::Copy => self.copy(url).map(|()| Opened::Copied),
        }
    }

    /// Copies `url` to the clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::Clipboard`] if the clipboard rejects the write.
    pub fn copy(&self, url: &str) -> Result<(), LaunchError> {
        self.clipboard.set_text(url).map_err(LaunchError::Clipboard)?;
        info!("copied URL to clipboard");
        Ok(())
    }

    /// Opens `url` by walking the launch plan.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::Exhausted`] only when every candidate failed
    /// and the final detached generic opener could not be started either.
    pub async fn launch(&self, url: &str) -> Result<LaunchReport, LaunchError> {
        let mut attempts = Vec::with_capacity(self.plan.candidates.len());

        for candidate in &self.plan.candidates {
            let command = candidate.with_target(url);
            debug!(candidate = %command.label, "trying launch candidate");

            let result = match self.runner.run(&command, self.plan.attempt_timeout).await {
                Ok(output) => {
                    AttemptResult::Finished(self.classifier.classify(output.exit_code, &output.stderr))
                }
                Err(RunError::TimedOut { .. }) => AttemptResult::TimedOut,
                Err(e) => AttemptResult::Error(e.to_string()),
            };
            attempts.push(AttemptRecord {
                label: command.label.clone(),
                result: result.clone(),
            });

            match result {
                AttemptResult::Finished(AttemptOutcome::Succeeded) => {
                    info!(candidate = %command.label, "browser launched");
                    return Ok(LaunchReport {
                        via: LaunchedVia::Candidate(command.label),
                        attempts,
                    });
                }
                AttemptResult::Finished(AttemptOutcome::AlreadyRunning) => {
                    info!(candidate = %command.label, "browser already running, handing URL to generic opener");
                    let opener = self.plan.generic_opener.with_target(url);
                    if let Err(e) = self.runner.spawn_detached(&opener) {
                        warn!("generic opener failed after already-running: {e}");
                    }
                    return Ok(LaunchReport {
                        via: LaunchedVia::AlreadyRunning(command.label),
                        attempts,
                    });
                }
                other => {
                    debug!(candidate = %command.label, ?other, "launch candidate did not match");
                }
            }
        }

        warn!(
            "all {} launch candidates failed, falling back to generic opener",
            attempts.len()
        );
        let opener = self.plan.generic_opener.with_target(url);
        match self.runner.spawn_detached(&opener) {
            Ok(()) => Ok(LaunchReport {
                via: LaunchedVia::Fallback,
                attempts,
            }),
            Err(source) => Err(LaunchError::Exhausted {
                attempts: attempts.len(),
                source,
            }),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
