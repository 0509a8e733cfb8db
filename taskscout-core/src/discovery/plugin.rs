//! Plugin trait abstraction
//!
//! All discovery plugins implement the [`DiscoveryPlugin`] trait to take part
//! in the scan → classify → extract → normalize pipeline.
//!
//! ## Design Principles
//!
//! 1. **Resilience**: unreadable or malformed files are skipped with a warning;
//!    nothing escapes the scan phase as an error
//! 2. **Immutability**: classify/extract return new artifacts (or `None` to
//!    discard) instead of mutating shared ones
//! 3. **Extensible**: new source formats only require implementing `scan`

use crate::types::{Origin, RawArtifact};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Context passed to a plugin's scan phase.
#[derive(Debug, Clone)]
pub struct ScanContext<'a> {
    /// Directory being scanned
    pub project_root: &'a Path,
    /// Point after which the plugin should stop and return what it has
    pub deadline: Option<Instant>,
    truncated: Cell<bool>,
}

impl<'a> ScanContext<'a> {
    /// Unbounded scan of `project_root`.
    pub fn new(project_root: &'a Path) -> Self {
        Self {
            project_root,
            deadline: None,
            truncated: Cell::new(false),
        }
    }

    /// Scan of `project_root` bounded to `budget` from now.
    pub fn with_budget(project_root: &'a Path, budget: Duration) -> Self {
        Self {
            project_root,
            deadline: Some(Instant::now() + budget),
            truncated: Cell::new(false),
        }
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Record that the scan stopped early because of the deadline.
    pub fn mark_truncated(&self) {
        self.truncated.set(true);
    }

    /// True when some work was skipped because the deadline passed.
    pub fn was_truncated(&self) -> bool {
        self.truncated.get()
    }
}

/// Trait implemented by all discovery plugins.
///
/// Only [`scan`](Self::scan) is mandatory; the other phases default to
/// pass-through.
///
/// ## Example
///
/// ```rust,ignore
/// use taskscout_core::discovery::{DiscoveryPlugin, ScanContext};
///
/// struct MakefilePlugin;
///
/// impl DiscoveryPlugin for MakefilePlugin {
///     fn name(&self) -> &str { "makefile" }
///     fn origins(&self) -> Vec<Origin> { vec![Origin::Other] }
///     fn scan(&self, ctx: &ScanContext) -> Vec<RawArtifact> {
///         // walk ctx.project_root ...
///     }
/// }
/// ```
pub trait DiscoveryPlugin: Send + Sync {
    /// Unique name for this plugin (e.g. "taskfile", "npm_scripts")
    fn name(&self) -> &str;

    /// Origins of the artifacts this plugin emits
    fn origins(&self) -> Vec<Origin>;

    /// Produce raw artifacts for the project.
    ///
    /// Must not fail: per-file and traversal errors are logged and skipped.
    /// When `ctx.deadline` passes, return the artifacts found so far and
    /// call `ctx.mark_truncated()` ([`find_files`] does this for walks).
    fn scan(&self, ctx: &ScanContext) -> Vec<RawArtifact>;

    /// Filter or enrich an artifact. Return `None` to discard it.
    ///
    /// Called for every scanned artifact, including those of other plugins.
    fn classify(&self, artifact: RawArtifact) -> Option<RawArtifact> {
        Some(artifact)
    }

    /// Extract structured metadata. Return `None` to discard the artifact.
    fn extract(&self, artifact: RawArtifact) -> Option<RawArtifact> {
        Some(artifact)
    }

    /// Plugin-level post-processing before global normalization.
    fn normalize(&self, artifacts: Vec<RawArtifact>) -> Vec<RawArtifact> {
        artifacts
    }
}

/// Walk the project tree and collect files whose name satisfies `is_match`.
///
/// Directories named in `skip_dirs` are pruned (the root itself is never
/// pruned). Symlinked directories are not followed. Entries that cannot be
/// read are logged and skipped. Results are in file-name order per
/// directory so repeated scans of the same tree agree.
pub fn find_files<F>(ctx: &ScanContext, skip_dirs: &[String], mut is_match: F) -> Vec<PathBuf>
where
    F: FnMut(&str) -> bool,
{
    let mut found = Vec::new();

    let walker = WalkDir::new(ctx.project_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.depth() > 0
                && entry.file_type().is_dir()
                && skip_dirs.iter().any(|s| entry.file_name() == s.as_str()))
        });

    for entry in walker {
        if ctx.deadline_passed() {
            tracing::warn!(
                root = %ctx.project_root.display(),
                found = found.len(),
                "Scan deadline exceeded, returning partial results"
            );
            ctx.mark_truncated();
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        if entry.file_name().to_str().is_some_and(&mut is_match) {
            found.push(entry.into_path());
        }
    }

    found
}

/// Scope tag for a source directory below the project root.
///
/// Returns `None` for the root itself, otherwise `scope:<relative/dir>` with
/// forward slashes on every platform.
pub fn scope_tag(project_root: &Path, dir: &Path) -> Option<String> {
    let rel = dir.strip_prefix(project_root).ok()?;
    let rel = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    if rel.is_empty() {
        None
    } else {
        Some(format!("scope:{}", rel))
    }
}
