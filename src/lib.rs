//! Safe Shell - command execution guard for protected paths.
//!
//! Wraps a command invocation and refuses to run destructive commands
//! (`rm`, `mv`, `rmdir` by default) whose arguments touch a protected path,
//! a directory inside one, or a directory containing one. Everything else
//! is executed unchanged and its exit code passed back.
//!
//! # Example
//!
//! ```
//! use safe_shell::{CommandGate, Decision, Settings};
//! use std::ffi::OsString;
//!
//! let gate = CommandGate::new(&Settings::default());
//! let argv = |items: &[&str]| items.iter().map(OsString::from).collect::<Vec<_>>();
//!
//! // Deleting a protected file - blocked
//! assert_eq!(gate.check(&argv(&["rm", "-rf", "CLAUDE.md"])).decision, Decision::Block);
//!
//! // Reading it - allowed
//! assert_eq!(gate.check(&argv(&["cat", "CLAUDE.md"])).decision, Decision::Allow);
//! ```

pub mod executor;
pub mod gates;
pub mod models;
pub mod settings;

pub use executor::{ExecStatus, Executor, ProcessExecutor};
pub use gates::{CommandGate, PathGuard};
pub use models::{CheckOutput, Decision, GateResult, Outcome};
pub use settings::{Settings, SettingsError, Unresolved};
