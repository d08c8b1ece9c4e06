//! Safe Shell - run a command unless it would delete or move a protected path.
//!
//! Usage:
//!   `safe-shell rm -rf build`          runs `rm -rf build`
//!   `safe-shell mv CLAUDE.md old.md`   blocked, exit 1
//!
//! Guard options are only recognised as the first argument, so every flag
//! after the command name belongs to the command.
//!
//! Set `SAFE_SHELL_LOG=debug` to trace classification on stderr.

use safe_shell::models::{CheckOutput, EXIT_BLOCKED};
use safe_shell::settings::{CONFIG_DIR_ENV, CONFIG_ENV, PROJECT_CONFIG_FILE};
use safe_shell::{CommandGate, ProcessExecutor, Settings};
use std::env;
use std::ffi::OsString;
use std::io;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Env var holding the `tracing` filter for the guard's own logs.
const LOG_ENV: &str = "SAFE_SHELL_LOG";

fn main() {
    init_logging();

    // Arguments may not be valid UTF-8; they reach the child byte for byte.
    let args: Vec<OsString> = env::args_os().skip(1).collect();
    std::process::exit(run(&args));
}

fn run(args: &[OsString]) -> i32 {
    let Some(first) = args.first() else {
        eprintln!("Error: No command provided");
        eprintln!();
        print_main_help();
        return EXIT_BLOCKED;
    };

    match first.to_str() {
        Some("-h" | "--help") => {
            print_main_help();
            0
        }
        Some("-V" | "--version") => {
            println!("safe-shell {}", env!("GIT_VERSION"));
            0
        }
        Some("--list") => match load_settings() {
            Some(settings) => {
                print_settings(&settings);
                0
            }
            None => EXIT_BLOCKED,
        },
        Some("--check") => handle_check(&args[1..]),
        Some("--") => handle_guard(&args[1..]),
        _ => handle_guard(args),
    }
}

/// Guard and (if allowed) execute the command.
fn handle_guard(command: &[OsString]) -> i32 {
    let Some(settings) = load_settings() else {
        return EXIT_BLOCKED;
    };
    let gate = CommandGate::new(&settings);
    gate.run(command, &ProcessExecutor, &mut io::stderr())
}

/// Classify without executing; prints a JSON report.
fn handle_check(command: &[OsString]) -> i32 {
    let Some(settings) = load_settings() else {
        return EXIT_BLOCKED;
    };
    let gate = CommandGate::new(&settings);
    let result = gate.check(command);
    let exit = if result.is_blocked() { EXIT_BLOCKED } else { 0 };

    match serde_json::to_string(&CheckOutput::new(command, result)) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing check output: {e}");
            return EXIT_BLOCKED;
        }
    }
    exit
}

/// Load settings anchored at the current directory. Errors are reported here.
fn load_settings() -> Option<Settings> {
    let cwd = match env::current_dir() {
        Ok(dir) => Some(dir),
        Err(e) => {
            warn!(error = %e, "cannot determine current directory; comparing paths lexically");
            None
        }
    };

    match Settings::load(cwd.as_deref()) {
        Ok(settings) => {
            if settings.destructive_commands.is_empty() {
                warn!("no destructive commands configured; nothing will be blocked");
            }
            Some(settings)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            None
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn print_settings(settings: &Settings) {
    println!("Protected paths:");
    for path in &settings.protected_paths {
        println!("  {path}");
    }
    println!(
        "Destructive commands: {}",
        if settings.destructive_commands.is_empty() {
            "none".to_string()
        } else {
            settings.destructive_commands.join(", ")
        }
    );
    println!("Unresolved paths: {}", settings.unresolved.as_str());
    match &settings.base_dir {
        Some(dir) => println!("Base directory: {}", dir.display()),
        None => println!("Base directory: (none, lexical comparison only)"),
    }
}

fn print_main_help() {
    eprintln!("safe-shell - run commands without touching protected paths");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  safe-shell <command> [args...]          Guard and run a command");
    eprintln!("  safe-shell --check <command> [args...]  Print the decision as JSON, don't run");
    eprintln!("  safe-shell --list                       Show the effective configuration");
    eprintln!("  safe-shell -- <command> [args...]       Guard a command named like an option");
    eprintln!("  safe-shell --help                       Show this help");
    eprintln!("  safe-shell --version                    Show version");
    eprintln!();
    eprintln!("EXIT CODES:");
    eprintln!("  <n>   exit code of the command");
    eprintln!("  1     no command, blocked, or configuration error");
    eprintln!("  127   command not found or not executable");
    eprintln!();
    eprintln!("CONFIG (merged, later wins):");
    eprintln!("  ${CONFIG_DIR_ENV}/config.toml  (default: <config dir>/safe-shell/config.toml)");
    eprintln!("  ./{PROJECT_CONFIG_FILE}");
    eprintln!("  ${CONFIG_ENV}                (explicit file, must exist)");
    eprintln!();
    eprintln!("  protected_paths = [\"secrets\"]        # added to the defaults");
    eprintln!("  destructive_commands = [\"shred\"]     # added to the defaults");
    eprintln!("  inherit_defaults = true              # false drops the built-in lists (not in ./{PROJECT_CONFIG_FILE})");
    eprintln!("  unresolved = \"block\"                 # or \"allow\"");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  safe-shell rm -rf target");
    eprintln!("  safe-shell --check mv CLAUDE.md old.md");
    eprintln!("  SAFE_SHELL_LOG=debug safe-shell rm notes.txt");
}
