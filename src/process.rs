//! Child-process execution with captured output.

use std::fmt;
use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};

/// Captured result of one command execution.
#[derive(Debug, Default)]
pub struct ExecResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Why the command did not complete cleanly: a non-zero exit, a
    /// terminating signal, or a start failure the case declared it expects.
    /// `None` on success.
    pub error: Option<String>,
}

/// A start failure the case did not declare. Aborts the case before any
/// assertion runs.
#[derive(Debug)]
pub struct SpawnError {
    pub binary: String,
    pub source: io::Error,
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command {}: failed to start: {}", self.binary, self.source)
    }
}

impl std::error::Error for SpawnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Run `binary` with `args`, capturing stdout and stderr to completion.
///
/// The child inherits the parent environment. When `interactive` lines are
/// given, stdin is piped and each line is written newline-terminated before
/// the pipe closes, so line-oriented programs see their input and then EOF.
/// The wait is synchronous; there is no timeout on a running child.
///
/// A failure to start is fatal unless the case expects an error (`want_err`),
/// in which case it is folded into the result for the assertion step.
pub fn run_command(
    binary: &str,
    args: &[String],
    interactive: &[String],
    want_err: bool,
) -> Result<ExecResult, SpawnError> {
    let mut cmd = Command::new(binary);
    cmd.args(args)
        .stdin(if interactive.is_empty() {
            Stdio::null()
        } else {
            Stdio::piped()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if want_err => {
            return Ok(ExecResult {
                error: Some(format!("failed to start: {e}")),
                ..ExecResult::default()
            });
        }
        Err(e) => {
            return Err(SpawnError {
                binary: binary.to_string(),
                source: e,
            });
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        for line in interactive {
            // A closed pipe only means the child stopped reading early.
            let _ = writeln!(stdin, "{line}");
        }
        // Dropping the handle closes the pipe on every path.
    }

    match child.wait_with_output() {
        Ok(output) => Ok(ExecResult {
            error: if output.status.success() {
                None
            } else {
                Some(exit_error(&output.status))
            },
            stdout: output.stdout,
            stderr: output.stderr,
        }),
        Err(e) => Ok(ExecResult {
            error: Some(format!("failed to wait: {e}")),
            ..ExecResult::default()
        }),
    }
}

fn exit_error(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {code}"),
        None => status.to_string(),
    }
}
