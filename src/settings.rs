//! Guard configuration.
//!
//! Built once at start from the compiled-in defaults, then extended by TOML
//! files (user, project, explicit). The resulting [`Settings`] is immutable
//! and handed by reference to the gates.
//!
//! The project file sits in the tree being guarded, so it is untrusted: it can
//! add protected paths and destructive commands but never remove or relax
//! anything, and it is itself always protected.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Protected paths when no config file says otherwise.
pub const DEFAULT_PROTECTED_PATHS: &[&str] =
    &["CLAUDE.md", "scripts/governance", ".mcp.json", "NOW.md"];

/// Commands that get their arguments checked against the protected paths.
pub const DEFAULT_DESTRUCTIVE_COMMANDS: &[&str] = &["rm", "mv", "rmdir"];

/// Project-level config file, looked up in the current directory.
pub const PROJECT_CONFIG_FILE: &str = ".safe-shell.toml";

/// Env var naming an explicit config file (highest priority, must exist).
pub const CONFIG_ENV: &str = "SAFE_SHELL_CONFIG";

/// Env var overriding the user config directory.
pub const CONFIG_DIR_ENV: &str = "SAFE_SHELL_CONFIG_DIR";

/// What the path guard answers when a lexical comparison can't be decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unresolved {
    /// Treat the candidate as protected (fail closed)
    #[default]
    Block,
    /// Treat the candidate as unprotected (fail open)
    Allow,
}

impl Unresolved {
    pub fn as_str(self) -> &'static str {
        match self {
            Unresolved::Block => "block",
            Unresolved::Allow => "allow",
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("SAFE_SHELL_CONFIG points to {}, which does not exist", .path.display())]
    MissingExplicit { path: PathBuf },
}

/// One config file on disk.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    #[serde(default)]
    pub protected_paths: Vec<String>,
    #[serde(default)]
    pub destructive_commands: Vec<String>,
    pub inherit_defaults: Option<bool>,
    pub unresolved: Option<Unresolved>,
}

impl SettingsFile {
    /// Drop the keys that would weaken the guard. Additions are kept.
    fn restricted(mut self, path: &Path) -> Self {
        if self.inherit_defaults == Some(false) {
            warn!(path = %path.display(), "ignoring inherit_defaults = false in project config");
            self.inherit_defaults = None;
        }
        if self.unresolved == Some(Unresolved::Allow) {
            warn!(path = %path.display(), "ignoring unresolved = \"allow\" in project config");
            self.unresolved = None;
        }
        self
    }
}

/// Where a config file may live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub path: PathBuf,
    /// Missing optional sources are skipped; a missing required one is an error
    pub required: bool,
    /// Untrusted sources may only tighten the configuration
    pub trusted: bool,
}

impl ConfigSource {
    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: false,
            trusted: true,
        }
    }

    pub fn required(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: true,
            trusted: true,
        }
    }

    /// Optional file inside the guarded tree.
    pub fn untrusted(path: impl Into<PathBuf>) -> Self {
        Self {
            trusted: false,
            ..Self::optional(path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub protected_paths: Vec<String>,
    pub destructive_commands: Vec<String>,
    pub unresolved: Unresolved,
    /// Directory relative paths are anchored to
    pub base_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            protected_paths: DEFAULT_PROTECTED_PATHS
                .iter()
                .chain([&PROJECT_CONFIG_FILE])
                .map(|s| s.to_string())
                .collect(),
            destructive_commands: DEFAULT_DESTRUCTIVE_COMMANDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            unresolved: Unresolved::default(),
            base_dir: None,
        }
    }
}

impl Settings {
    /// Load and merge settings from all locations.
    ///
    /// Precedence (highest to lowest):
    /// 1. Explicit file (`$SAFE_SHELL_CONFIG`)
    /// 2. Project file (`.safe-shell.toml` in `cwd`)
    /// 3. User file (`<config dir>/safe-shell/config.toml`)
    /// 4. Compiled-in defaults
    ///
    /// The project file can only add entries or tighten `unresolved`.
    /// `cwd` also becomes the base directory for relative paths.
    pub fn load(cwd: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_from(&config_sources(cwd), cwd)
    }

    /// Merge the given sources, lowest priority first.
    pub fn load_from(
        sources: &[ConfigSource],
        base_dir: Option<&Path>,
    ) -> Result<Self, SettingsError> {
        let mut files = Vec::new();
        for source in sources {
            if !source.path.exists() {
                if source.required {
                    return Err(SettingsError::MissingExplicit {
                        path: source.path.clone(),
                    });
                }
                continue;
            }
            debug!(path = %source.path.display(), trusted = source.trusted, "loading config");
            let file = Self::load_file(&source.path)?;
            files.push(if source.trusted {
                file
            } else {
                file.restricted(&source.path)
            });
        }

        let mut settings = Self::merge(files);
        settings.base_dir = base_dir.map(Path::to_path_buf);
        Ok(settings)
    }

    fn load_file(path: &Path) -> Result<SettingsFile, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Later files override scalar keys; lists are appended. The project
    /// config file is protected whatever the files say.
    fn merge(files: Vec<SettingsFile>) -> Self {
        let mut inherit_defaults = true;
        let mut unresolved = Unresolved::default();
        let mut protected_paths: Vec<String> = Vec::new();
        let mut destructive_commands: Vec<String> = Vec::new();

        for file in files {
            if let Some(inherit) = file.inherit_defaults {
                inherit_defaults = inherit;
            }
            if let Some(policy) = file.unresolved {
                unresolved = policy;
            }
            protected_paths.extend(file.protected_paths);
            destructive_commands.extend(file.destructive_commands);
        }

        if inherit_defaults {
            protected_paths = DEFAULT_PROTECTED_PATHS
                .iter()
                .map(|s| s.to_string())
                .chain(protected_paths)
                .collect();
            destructive_commands = DEFAULT_DESTRUCTIVE_COMMANDS
                .iter()
                .map(|s| s.to_string())
                .chain(destructive_commands)
                .collect();
        }
        protected_paths.push(PROJECT_CONFIG_FILE.to_string());

        Self {
            protected_paths: dedup(protected_paths),
            destructive_commands: dedup(destructive_commands),
            unresolved,
            base_dir: None,
        }
    }
}

/// Config file locations, lowest priority first.
pub fn config_sources(cwd: Option<&Path>) -> Vec<ConfigSource> {
    let mut sources = Vec::new();

    if let Some(dir) = user_config_dir() {
        sources.push(ConfigSource::optional(dir.join("config.toml")));
    }
    if let Some(cwd) = cwd {
        sources.push(ConfigSource::untrusted(cwd.join(PROJECT_CONFIG_FILE)));
    }
    if let Some(explicit) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        sources.push(ConfigSource::required(explicit));
    }

    sources
}

/// User config directory: `$SAFE_SHELL_CONFIG_DIR`, else `<config dir>/safe-shell`.
fn user_config_dir() -> Option<PathBuf> {
    std::env::var_os(CONFIG_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|d| d.join("safe-shell")))
}

/// Drop repeated entries, keeping the first occurrence in place.
fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
