//! End-to-end tests for the `safe-shell` binary.

#![cfg(unix)]

use std::ffi::{OsStr, OsString};
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn safe_shell(dir: &Path, args: &[&str]) -> Output {
    let args: Vec<OsString> = args.iter().map(OsString::from).collect();
    safe_shell_os(dir, &args)
}

/// Run the binary inside `dir`, isolated from the user's config.
fn safe_shell_os(dir: &Path, args: &[OsString]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_safe-shell"))
        .args(args)
        .current_dir(dir)
        .env("SAFE_SHELL_CONFIG_DIR", dir.join(".no-user-config"))
        .env_remove("SAFE_SHELL_CONFIG")
        .env_remove("SAFE_SHELL_LOG")
        .output()
        .unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("CLAUDE.md"), "# rules\n").unwrap();
    fs::create_dir_all(temp_dir.path().join("scripts/governance")).unwrap();
    fs::write(temp_dir.path().join("scripts/governance/policy.md"), "x").unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "scratch").unwrap();
    temp_dir
}

#[test]
fn test_blocks_protected_file() {
    let dir = project();
    let output = safe_shell(dir.path(), &["rm", "-f", "CLAUDE.md"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("BLOCKED: Cannot rm protected path: CLAUDE.md"));
    assert!(dir.path().join("CLAUDE.md").exists());
}

#[test]
fn test_blocks_directory_containing_protected_path() {
    let dir = project();
    let output = safe_shell(dir.path(), &["rm", "-rf", "scripts"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(dir.path().join("scripts/governance/policy.md").exists());
}

#[test]
fn test_blocks_absolute_path_to_protected_file() {
    let dir = project();
    // current_dir() reports the canonical path (e.g. /private/var on macOS)
    let target = dir.path().canonicalize().unwrap().join("CLAUDE.md");
    let output = safe_shell(dir.path(), &["rm", target.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(target.exists());
}

#[test]
fn test_runs_unprotected_removal() {
    let dir = project();
    let output = safe_shell(dir.path(), &["rm", "notes.txt"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).is_empty());
    assert!(!dir.path().join("notes.txt").exists());
}

#[test]
fn test_propagates_exit_code_and_output() {
    let dir = project();
    let output = safe_shell(dir.path(), &["sh", "-c", "echo out; echo err >&2; exit 3"]);

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "out\n");
    assert_eq!(stderr(&output), "err\n");
}

#[test]
fn test_non_destructive_command_on_protected_file() {
    let dir = project();
    let output = safe_shell(dir.path(), &["cat", "CLAUDE.md"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "# rules\n");
}

#[test]
fn test_command_not_found() {
    let dir = project();
    let output = safe_shell(dir.path(), &["safe-shell-test-no-such-program", "x"]);

    assert_eq!(output.status.code(), Some(127));
    assert!(stderr(&output).contains("Command not found: safe-shell-test-no-such-program"));
}

#[test]
fn test_no_command() {
    let dir = project();
    let output = safe_shell(dir.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("No command provided"));
}

#[test]
fn test_check_mode_does_not_execute() {
    let dir = project();
    let output = safe_shell(dir.path(), &["--check", "rm", "-rf", "."]);

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["decision"], "block");
    assert_eq!(json["command"], "rm");
    assert_eq!(json["path"], ".");

    let output = safe_shell(dir.path(), &["--check", "rm", "notes.txt"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(dir.path().join("notes.txt").exists());
}

#[test]
fn test_project_config_adds_protected_path() {
    let dir = project();
    fs::write(
        dir.path().join(".safe-shell.toml"),
        "protected_paths = [\"notes.txt\"]\n",
    )
    .unwrap();

    let output = safe_shell(dir.path(), &["rm", "notes.txt"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output)
            .contains("Protected paths: CLAUDE.md, scripts/governance, .mcp.json, NOW.md, notes.txt")
    );
    assert!(dir.path().join("notes.txt").exists());
}

#[test]
fn test_project_config_cannot_drop_defaults() {
    let dir = project();
    fs::write(
        dir.path().join(".safe-shell.toml"),
        "inherit_defaults = false\nunresolved = \"allow\"\n",
    )
    .unwrap();

    let output = safe_shell(dir.path(), &["rm", "CLAUDE.md"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Cannot rm protected path: CLAUDE.md"));
    assert!(dir.path().join("CLAUDE.md").exists());

    let output = safe_shell(dir.path(), &["--list"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Destructive commands: rm, mv, rmdir"));
    assert!(stdout.contains("Unresolved paths: block"));
}

#[test]
fn test_project_config_file_is_protected() {
    let dir = project();
    let config = dir.path().join(".safe-shell.toml");
    fs::write(&config, "protected_paths = [\"notes.txt\"]\n").unwrap();

    for args in [
        &["rm", "-f", ".safe-shell.toml"][..],
        &["mv", ".safe-shell.toml", "disabled.toml"],
        &["mv", "draft.toml", ".safe-shell.toml"],
    ] {
        let output = safe_shell(dir.path(), args);
        assert_eq!(output.status.code(), Some(1), "Failed for: {args:?}");
        assert!(config.exists());
    }
    assert!(dir.path().join("notes.txt").exists());
}

#[test]
fn test_malformed_config_refuses_to_run() {
    let dir = project();
    fs::write(dir.path().join(".safe-shell.toml"), "protected_paths = 3\n").unwrap();

    let output = safe_shell(dir.path(), &["rm", "notes.txt"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(".safe-shell.toml"));
    assert!(dir.path().join("notes.txt").exists());
}

#[test]
fn test_list_shows_configuration() {
    let dir = project();
    let output = safe_shell(dir.path(), &["--list"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("  scripts/governance"));
    assert!(stdout.contains("Destructive commands: rm, mv, rmdir"));
    assert!(stdout.contains("Unresolved paths: block"));
}

#[test]
fn test_double_dash_guards_the_rest() {
    let dir = project();
    let output = safe_shell(dir.path(), &["--", "mv", "CLAUDE.md", "old.md"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(dir.path().join("CLAUDE.md").exists());
}

#[test]
fn test_non_utf8_argument_reaches_command() {
    let dir = project();
    let args = [
        OsString::from("printf"),
        OsString::from("%s"),
        OsStr::from_bytes(b"a\xffb").to_os_string(),
    ];
    let output = safe_shell_os(dir.path(), &args);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(output.stdout, b"a\xffb");
}

// Other unix filesystems may reject names that are not valid UTF-8.
#[cfg(target_os = "linux")]
#[test]
fn test_ls_non_utf8_file_name() {
    let dir = project();
    let name = OsStr::from_bytes(b"report-\xff.txt");
    fs::write(dir.path().join(name), "x").unwrap();

    let output = safe_shell_os(dir.path(), &[OsString::from("ls"), name.to_os_string()]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(output.stdout, b"report-\xff.txt\n");

    let output = safe_shell_os(dir.path(), &[OsString::from("rm"), name.to_os_string()]);
    assert_eq!(output.status.code(), Some(0));
    assert!(!dir.path().join(name).exists());
}
