//! Gates deciding whether a guarded invocation may run.
//!
//! - [`path_guard`]: is a path argument protected?
//! - [`command_gate`]: which commands get their arguments scanned, and what
//!   happens to the invocation afterwards.

pub mod command_gate;
pub mod helpers;
pub mod path_guard;

#[cfg(test)]
pub mod test_utils;

pub use command_gate::CommandGate;
pub use path_guard::PathGuard;
