//! Process execution for commands the gate lets through.

use std::ffi::OsString;
use std::io;
use std::process::{Command, ExitStatus};
use tracing::debug;

/// What happened when the executor tried to run a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecStatus {
    /// The child ran and exited with this code.
    Exited(i32),
    /// No such program.
    NotFound,
    /// The program could not be started (permissions, not executable, ...).
    Failed(String),
}

/// Runs an argument vector to completion.
///
/// Arguments are `OsString` so the child receives exactly the bytes the
/// guard was given.
pub trait Executor {
    fn execute(&self, args: &[OsString]) -> ExecStatus;
}

/// Spawns the command directly (no shell) with inherited stdio and waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn execute(&self, args: &[OsString]) -> ExecStatus {
        let Some((program, rest)) = args.split_first() else {
            return ExecStatus::NotFound;
        };

        debug!(program = ?program, args = ?rest, "spawning");
        match Command::new(program).args(rest).status() {
            Ok(status) => ExecStatus::Exited(exit_code(status)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => ExecStatus::NotFound,
            Err(e) => ExecStatus::Failed(e.to_string()),
        }
    }
}

/// Exit code of a finished child. Signal deaths map to `128 + signal`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
