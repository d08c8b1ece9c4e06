//! Test utilities for gate tests.

use crate::executor::{ExecStatus, Executor};
use std::cell::RefCell;
use std::ffi::OsString;

/// Build an argument vector for testing.
///
/// # Example
/// ```ignore
/// use crate::gates::test_utils::argv;
///
/// let args = argv(&["rm", "-rf", "build"]);
/// assert_eq!(args[0], "rm");
/// ```
pub fn argv(items: &[&str]) -> Vec<OsString> {
    items.iter().map(OsString::from).collect()
}

/// Executor that records what it was asked to run and never spawns anything.
#[derive(Debug)]
pub struct RecordingExecutor {
    status: ExecStatus,
    calls: RefCell<Vec<Vec<OsString>>>,
}

impl RecordingExecutor {
    pub fn returning(status: ExecStatus) -> Self {
        Self {
            status,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn exiting(code: i32) -> Self {
        Self::returning(ExecStatus::Exited(code))
    }

    pub fn calls(&self) -> Vec<Vec<OsString>> {
        self.calls.borrow().clone()
    }
}

impl Executor for RecordingExecutor {
    fn execute(&self, args: &[OsString]) -> ExecStatus {
        self.calls.borrow_mut().push(args.to_vec());
        self.status.clone()
    }
}
