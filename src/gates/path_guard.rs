//! Protected path predicate.
//!
//! A candidate is protected when, against any configured entry, it is:
//! 1. the entry itself (exact match)
//! 2. inside the entry (the entry is a protected directory)
//! 3. an ancestor of the entry (removing it would take the entry with it)
//!
//! All three are segment-prefix comparisons on lexically normalized paths.
//! Nothing here touches the filesystem: symlinks are not followed and the
//! candidate does not need to exist.

use crate::settings::{Settings, Unresolved};
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path};
use tracing::trace;

/// A path reduced to its segments.
///
/// `.` segments are dropped and `a/..` pairs are folded. A relative path that
/// climbs above its starting point keeps the climb in `ascent`. Segments stay
/// `OsString` so non-UTF-8 names compare byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexicalPath {
    /// `Some("")` for `/`, `Some("C:")` for a drive prefix, `None` when relative
    root: Option<OsString>,
    ascent: usize,
    segments: Vec<OsString>,
}

impl LexicalPath {
    fn parse(raw: &OsStr) -> Self {
        Self::from_path(Path::new(raw))
    }

    fn from_path(path: &Path) -> Self {
        let mut lexical = Self {
            root: None,
            ascent: 0,
            segments: Vec::new(),
        };

        for component in path.components() {
            match component {
                Component::Prefix(prefix) => {
                    lexical.root = Some(prefix.as_os_str().to_os_string());
                }
                Component::RootDir => {
                    lexical.root.get_or_insert_with(OsString::new);
                }
                Component::CurDir => {}
                Component::ParentDir => lexical.ascend(),
                Component::Normal(segment) => {
                    lexical.segments.push(segment.to_os_string());
                }
            }
        }

        lexical
    }

    /// Step to the parent. The parent of `/` is `/`.
    fn ascend(&mut self) {
        if self.segments.pop().is_none() && self.root.is_none() {
            self.ascent += 1;
        }
    }

    /// Resolve a relative path against `base`. Absolute paths are unchanged.
    fn anchored(self, base: &LexicalPath) -> Self {
        if self.root.is_some() {
            return self;
        }
        let mut anchored = base.clone();
        for _ in 0..self.ascent {
            anchored.ascend();
        }
        anchored.segments.extend(self.segments);
        anchored
    }
}

/// How a candidate relates to one protected entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Related,
    Unrelated,
    /// Both paths climb out of their starting directory by different amounts,
    /// so the answer depends on directory names we don't have.
    Undecidable,
}

fn relate(candidate: &LexicalPath, protected: &LexicalPath) -> Relation {
    if candidate.root != protected.root {
        return Relation::Unrelated;
    }

    match candidate.ascent.cmp(&protected.ascent) {
        std::cmp::Ordering::Equal => {
            let exact = candidate.segments == protected.segments;
            let inside = candidate.segments.starts_with(&protected.segments);
            let contains = protected.segments.starts_with(&candidate.segments);
            if exact || inside || contains {
                Relation::Related
            } else {
                Relation::Unrelated
            }
        }
        // Candidate climbs higher: only a bare `..` chain is known to contain the entry
        std::cmp::Ordering::Greater if candidate.segments.is_empty() => Relation::Related,
        // Entry climbs higher: only a bare `..` chain is known to contain the candidate
        std::cmp::Ordering::Less if protected.segments.is_empty() => Relation::Related,
        _ => Relation::Undecidable,
    }
}

#[derive(Debug, Clone)]
struct ProtectedEntry {
    raw: String,
    path: LexicalPath,
}

/// Decides whether a path argument touches a protected path.
#[derive(Debug, Clone)]
pub struct PathGuard {
    entries: Vec<ProtectedEntry>,
    base: Option<LexicalPath>,
    unresolved: Unresolved,
}

impl PathGuard {
    pub fn new(settings: &Settings) -> Self {
        let base = settings.base_dir.as_deref().map(LexicalPath::from_path);
        let entries = settings
            .protected_paths
            .iter()
            .map(|raw| {
                let path = LexicalPath::parse(OsStr::new(raw));
                ProtectedEntry {
                    raw: raw.clone(),
                    path: match &base {
                        Some(base) => path.anchored(base),
                        None => path,
                    },
                }
            })
            .collect();

        Self {
            entries,
            base,
            unresolved: settings.unresolved,
        }
    }

    /// Configured protected paths, in configuration order.
    pub fn protected_paths(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.raw.as_str()).collect()
    }

    pub fn is_protected(&self, candidate: impl AsRef<OsStr>) -> bool {
        self.protecting_entry(candidate).is_some()
    }

    /// The first configured entry that protects `candidate`, if any.
    pub fn protecting_entry(&self, candidate: impl AsRef<OsStr>) -> Option<&str> {
        let candidate = candidate.as_ref();
        let path = self.resolve(candidate);

        self.entries
            .iter()
            .find(|entry| match relate(&path, &entry.path) {
                Relation::Related => true,
                Relation::Unrelated => false,
                Relation::Undecidable => {
                    trace!(
                        candidate = %Path::new(candidate).display(),
                        entry = %entry.raw,
                        policy = self.unresolved.as_str(),
                        "undecidable path comparison"
                    );
                    self.unresolved == Unresolved::Block
                }
            })
            .map(|entry| entry.raw.as_str())
    }

    fn resolve(&self, candidate: &OsStr) -> LexicalPath {
        let path = LexicalPath::parse(candidate);
        match &self.base {
            Some(base) => path.anchored(base),
            None => path,
        }
    }
}
