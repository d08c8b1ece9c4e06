//! Core types for the safe-shell command gate.

use serde::Serialize;
use std::ffi::OsString;

/// Exit code for a missing command or a blocked destructive operation.
pub const EXIT_BLOCKED: i32 = 1;

/// Exit code when the guarded command cannot be found or executed.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Gate decision. A destructive command touching a protected path is blocked,
/// everything else is allowed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Block,
}

/// Result of classifying an argument vector, without running it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateResult {
    pub decision: Decision,
    pub reason: Option<String>,
    /// The argument that triggered the block, if any
    pub path: Option<String>,
}

impl GateResult {
    pub fn allow() -> Self {
        Self {
            decision: Decision::Allow,
            reason: None,
            path: None,
        }
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            decision: Decision::Block,
            reason: Some(reason.into()),
            path: None,
        }
    }

    /// Block naming the protected argument that caused it.
    pub fn block_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            decision: Decision::Block,
            reason: Some(reason.into()),
            path: Some(path.into()),
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.decision == Decision::Block
    }
}

/// Terminal state of one guarded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Empty argument vector; nothing was run.
    NoCommand,
    /// Destructive command aimed at a protected path; nothing was run.
    Blocked { command: String, path: String },
    /// The executor could not locate the program.
    NotFound { command: String },
    /// The program exists but could not be started.
    Unavailable { command: String, reason: String },
    /// The child ran to completion with this exit code.
    Executed(i32),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::NoCommand | Outcome::Blocked { .. } => EXIT_BLOCKED,
            Outcome::NotFound { .. } | Outcome::Unavailable { .. } => EXIT_NOT_FOUND,
            Outcome::Executed(code) => *code,
        }
    }
}

/// JSON report printed by `safe-shell --check`.
#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CheckOutput {
    pub fn new(args: &[OsString], result: GateResult) -> Self {
        Self {
            decision: result.decision,
            command: args.first().map(|c| c.to_string_lossy().into_owned()),
            path: result.path,
            reason: result.reason,
        }
    }
}
