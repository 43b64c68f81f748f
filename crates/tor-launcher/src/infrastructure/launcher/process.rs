//! `tokio::process` implementation of [`ProcessRunner`].
//!
//! # Capturing error output
//!
//! Launchers such as `xdg-open` exit quickly but leave the browser running,
//! and the browser inherits the launcher's stderr.  Waiting for stderr to
//! reach EOF would therefore block until the browser quits.  Instead the
//! runner waits for the launcher's exit status, then gives the stderr reader
//! a short grace period and takes whatever text has arrived by then.

use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

use crate::application::open_bookmark::{CommandSpec, ProcessOutput, ProcessRunner, RunError};

/// How long to keep collecting stderr after the process has exited.
const STDERR_GRACE: Duration = Duration::from_millis(200);

/// Runs commands as child processes with a fixed set of extra environment
/// variables on top of the inherited environment.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner {
    env: Vec<(String, String)>,
}

impl TokioProcessRunner {
    pub fn new(env: Vec<(String, String)>) -> Self {
        Self { env }
    }

    fn command(&self, spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null());
        cmd
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunError> {
        let mut child = self
            .command(command)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        let captured = Arc::new(Mutex::new(Vec::new()));
        let reader = child.stderr.take().map(|mut stderr| {
            let sink = Arc::clone(&captured);
            tokio::spawn(async move {
                let mut chunk = [0u8; 1024];
                loop {
                    match stderr.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if let Ok(mut buf) = sink.lock() {
                                buf.extend_from_slice(&chunk[..n]);
                            }
                        }
                    }
                }
            })
        });

        let status = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(source)) => {
                if let Some(reader) = reader {
                    reader.abort();
                }
                return Err(RunError::Wait {
                    program: command.program.clone(),
                    source,
                });
            }
            Err(_) => {
                if let Some(reader) = reader {
                    reader.abort();
                }
                debug!(program = %command.program, ?timeout, "attempt timed out, killing child");
                // Dropping `child` kills it (kill_on_drop).
                return Err(RunError::TimedOut {
                    program: command.program.clone(),
                    after: timeout,
                });
            }
        };

        if let Some(mut reader) = reader {
            if tokio::time::timeout(STDERR_GRACE, &mut reader).await.is_err() {
                reader.abort();
            }
        }

        let stderr = captured
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default();
        debug!(program = %command.program, code = ?status.code(), "attempt finished");

        Ok(ProcessOutput {
            exit_code: status.code(),
            stderr,
        })
    }

    fn spawn_detached(&self, command: &CommandSpec) -> Result<(), RunError> {
        // The child handle is dropped immediately; tokio reaps it in the
        // background once it exits.
        self.command(command)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_child| ())
            .map_err(|source| RunError::Spawn {
                program: command.program.clone(),
                source,
            })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
