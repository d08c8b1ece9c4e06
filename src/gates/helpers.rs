//! Common helper functions for the gates.

use std::ffi::OsStr;
use std::path::Path;

/// Check if an argument is flag-shaped (`-r`, `-rf`, `--force`, `--`, `-`).
///
/// Flag-shaped arguments are never treated as paths, whatever they contain.
pub fn is_flag(arg: &OsStr) -> bool {
    arg.as_encoded_bytes().starts_with(b"-")
}

/// Program name used for classification.
///
/// Invocations through a path (`/bin/rm`, `./rm`) classify as the final
/// component; bare names are returned as-is.
///
/// # Example
/// ```ignore
/// assert_eq!(program_name(OsStr::new("/usr/bin/rm")), "rm");
/// assert_eq!(program_name(OsStr::new("mv")), "mv");
/// ```
pub fn program_name(command: &OsStr) -> &OsStr {
    Path::new(command).file_name().unwrap_or(command)
}
