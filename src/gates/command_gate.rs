//! Destructive command gate.
//!
//! Commands in the destructive set (`rm`, `mv`, `rmdir` by default) have every
//! non-flag argument checked against the [`PathGuard`]. The first protected
//! argument blocks the whole invocation. Anything else goes to the executor
//! untouched.
//!
//! Arguments stay `OsString` end to end. They are only decoded for
//! classification and diagnostics; the executor receives the original bytes.

use crate::executor::{ExecStatus, Executor};
use crate::gates::helpers::{is_flag, program_name};
use crate::gates::path_guard::PathGuard;
use crate::models::{GateResult, Outcome};
use crate::settings::Settings;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct CommandGate {
    guard: PathGuard,
    destructive: HashSet<String>,
}

impl CommandGate {
    pub fn new(settings: &Settings) -> Self {
        Self {
            guard: PathGuard::new(settings),
            destructive: settings.destructive_commands.iter().cloned().collect(),
        }
    }

    pub fn guard(&self) -> &PathGuard {
        &self.guard
    }

    /// Check if a command needs its arguments scanned.
    ///
    /// Matches the command as given or its final path component, so
    /// `/bin/rm` classifies like `rm`. A name that is not valid UTF-8 never
    /// matches the configured set.
    pub fn is_destructive(&self, command: impl AsRef<OsStr>) -> bool {
        let command = command.as_ref();
        [command, program_name(command)]
            .into_iter()
            .filter_map(OsStr::to_str)
            .any(|name| self.destructive.contains(name))
    }

    /// Classify an argument vector without running it.
    pub fn check(&self, args: &[OsString]) -> GateResult {
        let Some((command, rest)) = args.split_first() else {
            return GateResult::block("No command provided");
        };

        match self.blocked_path(command, rest) {
            Some(path) => {
                let command = command.to_string_lossy();
                let path = path.to_string_lossy();
                let reason = format!("Cannot {command} protected path: {path}");
                GateResult::block_path(path, reason)
            }
            None => GateResult::allow(),
        }
    }

    /// Classify, then execute if allowed.
    pub fn evaluate(&self, args: &[OsString], executor: &dyn Executor) -> Outcome {
        let Some((command, rest)) = args.split_first() else {
            return Outcome::NoCommand;
        };

        if let Some(path) = self.blocked_path(command, rest) {
            info!(command = ?command, path = ?path, "blocked destructive command");
            return Outcome::Blocked {
                command: command.to_string_lossy().into_owned(),
                path: path.to_string_lossy().into_owned(),
            };
        }

        let command = command.to_string_lossy().into_owned();
        match executor.execute(args) {
            ExecStatus::Exited(code) => Outcome::Executed(code),
            ExecStatus::NotFound => Outcome::NotFound { command },
            ExecStatus::Failed(reason) => Outcome::Unavailable { command, reason },
        }
    }

    /// Guard one invocation: diagnostics go to `diagnostics`, the exit code
    /// is returned.
    pub fn run(
        &self,
        args: &[OsString],
        executor: &dyn Executor,
        diagnostics: &mut dyn Write,
    ) -> i32 {
        let outcome = self.evaluate(args, executor);
        if let Err(e) = self.report(&outcome, diagnostics) {
            warn!(error = %e, "failed to write diagnostic");
        }
        outcome.exit_code()
    }

    /// Write the human-readable diagnostic for an outcome (nothing for `Executed`).
    pub fn report(&self, outcome: &Outcome, out: &mut dyn Write) -> io::Result<()> {
        match outcome {
            Outcome::NoCommand => writeln!(out, "Error: No command provided"),
            Outcome::Blocked { command, path } => {
                writeln!(out, "❌ BLOCKED: Cannot {command} protected path: {path}")?;
                writeln!(
                    out,
                    "Protected paths: {}",
                    self.guard.protected_paths().join(", ")
                )?;
                writeln!(
                    out,
                    "If you need to modify this file, edit it directly instead of using {command}"
                )
            }
            Outcome::NotFound { command } => writeln!(out, "Error: Command not found: {command}"),
            Outcome::Unavailable { command, reason } => {
                writeln!(out, "Error: Cannot execute {command}: {reason}")
            }
            Outcome::Executed(_) => Ok(()),
        }
    }

    /// First protected argument of a destructive command, skipping flags.
    fn blocked_path<'a>(&self, command: &OsStr, rest: &'a [OsString]) -> Option<&'a OsStr> {
        if !self.is_destructive(command) {
            debug!(command = ?command, "not destructive");
            return None;
        }

        rest.iter()
            .map(OsString::as_os_str)
            .filter(|arg| !is_flag(arg))
            .find(|arg| {
                let entry = self.guard.protecting_entry(arg);
                debug!(
                    command = ?command,
                    candidate = %Path::new(arg).display(),
                    protected_by = ?entry,
                    "scanned argument"
                );
                entry.is_some()
            })
    }
}
