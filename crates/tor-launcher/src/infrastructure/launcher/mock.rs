//! Scripted process runner and recording clipboard for testing.
//!
//! [`ScriptedProcessRunner`] answers each candidate by program name from a
//! script and records every invocation, in order, so tests can assert which
//! commands a launch touched.  Unscripted programs behave like a binary that
//! is not installed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::application::open_bookmark::{
    Clipboard, CommandSpec, ProcessOutput, ProcessRunner, RunError,
};

/// Scripted reaction to a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedRun {
    /// Exit with `code`, writing `stderr`.
    Exit { code: i32, stderr: String },
    /// Never finish within the timeout.
    Hang,
    /// Fail to start, as if not installed.
    Missing,
}

impl ScriptedRun {
    pub fn success() -> Self {
        ScriptedRun::Exit {
            code: 0,
            stderr: String::new(),
        }
    }

    pub fn failure(stderr: impl Into<String>) -> Self {
        ScriptedRun::Exit {
            code: 1,
            stderr: stderr.into(),
        }
    }
}

/// How a recorded invocation was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    Run,
    Detached,
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub kind: InvocationKind,
    pub command: CommandSpec,
}

#[derive(Default)]
struct State {
    script: HashMap<String, ScriptedRun>,
    detached_fails: bool,
    invocations: Vec<Invocation>,
}

/// A [`ProcessRunner`] driven by a script instead of real processes.
#[derive(Clone, Default)]
pub struct ScriptedProcessRunner {
    state: Arc<Mutex<State>>,
}

impl ScriptedProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how runs of `program` behave.
    pub fn script(&self, program: impl Into<String>, run: ScriptedRun) -> &Self {
        self.state
            .lock()
            .expect("lock poisoned")
            .script
            .insert(program.into(), run);
        self
    }

    /// Makes detached spawns fail.
    pub fn fail_detached(&self, fail: bool) {
        self.state.lock().expect("lock poisoned").detached_fails = fail;
    }

    /// Returns every invocation so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.state.lock().expect("lock poisoned").invocations.clone()
    }

    /// Returns the programs of every invocation of `kind`, in order.
    pub fn programs(&self, kind: InvocationKind) -> Vec<String> {
        self.invocations()
            .into_iter()
            .filter(|i| i.kind == kind)
            .map(|i| i.command.program)
            .collect()
    }
}

fn not_installed(program: &str) -> RunError {
    RunError::Spawn {
        program: program.to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    }
}

#[async_trait]
impl ProcessRunner for ScriptedProcessRunner {
    async fn run(&self, command: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunError> {
        let scripted = {
            let mut state = self.state.lock().expect("lock poisoned");
            state.invocations.push(Invocation {
                kind: InvocationKind::Run,
                command: command.clone(),
            });
            state
                .script
                .get(&command.program)
                .cloned()
                .unwrap_or(ScriptedRun::Missing)
        };

        match scripted {
            ScriptedRun::Exit { code, stderr } => Ok(ProcessOutput {
                exit_code: Some(code),
                stderr,
            }),
            ScriptedRun::Hang => Err(RunError::TimedOut {
                program: command.program.clone(),
                after: timeout,
            }),
            ScriptedRun::Missing => Err(not_installed(&command.program)),
        }
    }

    fn spawn_detached(&self, command: &CommandSpec) -> Result<(), RunError> {
        let mut state = self.state.lock().expect("lock poisoned");
        state.invocations.push(Invocation {
            kind: InvocationKind::Detached,
            command: command.clone(),
        });
        if state.detached_fails {
            return Err(not_installed(&command.program));
        }
        Ok(())
    }
}

/// A [`Clipboard`] that remembers what was written.
#[derive(Clone, Default)]
pub struct RecordingClipboard {
    texts: Arc<Mutex<Vec<String>>>,
    reject: Arc<Mutex<bool>>,
}

impl RecordingClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail.
    pub fn reject_writes(&self, reject: bool) {
        *self.reject.lock().expect("lock poisoned") = reject;
    }

    /// Returns every text written so far.
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().expect("lock poisoned").clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn set_text(&self, text: &str) -> Result<(), String> {
        if *self.reject.lock().expect("lock poisoned") {
            return Err("clipboard unavailable: no display".to_string());
        }
        self.texts
            .lock()
            .expect("lock poisoned")
            .push(text.to_string());
        Ok(())
    }
}
