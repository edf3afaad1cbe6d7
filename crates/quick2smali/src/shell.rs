//! Synchronous shell-command execution.
//!
//! Every external tool is driven through here: spawn `sh`, feed it the
//! command line on stdin, capture everything it prints, and report the real
//! exit status. The child is always reaped before returning.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, error};

use crate::error::DecompileError;

/// Runs one shell command line to completion.
///
/// Distinguishes three failures: the shell could not be started
/// (`Launch`), the pipes broke while talking to it (`CommandIo`), and the
/// command ran but exited non-zero (`CommandFailed`).
pub fn run(command: &str) -> Result<(), DecompileError> {
    debug!(%command, "running shell command");

    let mut child = Command::new("sh")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| DecompileError::Launch {
            command: command.to_owned(),
            source,
        })?;

    // Dropping stdin closes the pipe so the shell sees EOF and runs. The
    // child is reaped below even if the write fails.
    let fed = child
        .stdin
        .take()
        .map(|mut stdin| stdin.write_all(command.as_bytes()))
        .unwrap_or(Ok(()));

    let output = child.wait_with_output();

    if let Err(source) = fed {
        return Err(DecompileError::CommandIo {
            command: command.to_owned(),
            source,
        });
    }
    let output = output.map_err(|source| DecompileError::CommandIo {
        command: command.to_owned(),
        source,
    })?;

    if !output.stdout.is_empty() {
        debug!("{}", String::from_utf8_lossy(&output.stdout).trim_end());
    }
    if !output.stderr.is_empty() {
        debug!("{}", String::from_utf8_lossy(&output.stderr).trim_end());
    }

    if !output.status.success() {
        error!(%command, status = %output.status, "command failed");
        return Err(DecompileError::CommandFailed {
            command: command.to_owned(),
            status: output.status,
        });
    }

    Ok(())
}
