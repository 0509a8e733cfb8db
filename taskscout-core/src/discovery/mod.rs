//! Command discovery pipeline
//!
//! Scans a project directory for command definitions (Taskfiles, package
//! manifests, ...) and normalizes them into [`CommandDefinition`]s.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   scan    ┌──────────────┐  classify/extract  ┌──────────────┐
//! │ project root │ ────────► │  collected   │ ─────────────────► │   enriched   │
//! └──────────────┘ (plugins) │ RawArtifacts │  (every plugin ×   │ RawArtifacts │
//!                            └──────────────┘   every artifact)  └──────┬───────┘
//!                                                                       │ confidence filter
//!                                                                       ▼
//!                            ┌───────────────────┐  normalize    ┌──────────────┐
//!                            │ CommandDefinitions│ ◄──────────── │   filtered   │
//!                            └───────────────────┘               └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use taskscout_core::discovery::{DiscoveryEngine, TaskfilePlugin};
//!
//! let mut engine = DiscoveryEngine::new();
//! engine.register(Box::new(TaskfilePlugin::new()));
//!
//! let result = engine.run(Path::new("."))?;
//! for cmd in &result.commands {
//!     println!("{} ({})", cmd.name, cmd.origin);
//! }
//! ```

pub mod confidence;
pub mod normalize;
pub mod params;
mod plugin;
pub mod plugins;

pub use confidence::{filter_by_confidence, ConfidenceFilter};
pub use normalize::{normalize_artifact, normalize_artifacts};
pub use params::infer_parameters;
pub use plugin::{find_files, scope_tag, DiscoveryPlugin, ScanContext};
pub use plugins::{
    create_all_plugins, create_default_engine, plugin_for, NpmScriptsPlugin, TaskfilePlugin,
};

use crate::config::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::error::{Error, Result};
use crate::types::{CommandDefinition, RawArtifact};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// ============================================
// Run results
// ============================================

/// How a plugin's scan phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// The plugin walked everything it wanted to
    Complete,
    /// The plugin hit its deadline; its artifacts are a partial result
    DeadlineExceeded,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Complete => "complete",
            ScanStatus::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

/// Per-plugin scan diagnostics.
#[derive(Debug, Clone)]
pub struct PluginScanReport {
    pub plugin: String,
    /// Artifacts emitted by this plugin's scan
    pub artifacts: usize,
    pub duration_ms: i64,
    pub status: ScanStatus,
}

/// Output of one discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryResult {
    /// Directory that was scanned
    pub project_root: PathBuf,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Artifacts that survived the confidence filter (for diagnostics)
    pub raw_artifacts: Vec<RawArtifact>,
    /// Normalized commands, in plugin order then emission order
    pub commands: Vec<CommandDefinition>,
    /// One report per registered plugin
    pub plugin_reports: Vec<PluginScanReport>,
}

impl DiscoveryResult {
    /// Commands stably sorted by `(source_path, name)`.
    pub fn sorted_commands(&self) -> Vec<CommandDefinition> {
        let mut commands = self.commands.clone();
        commands.sort_by(|a, b| {
            a.source_path
                .cmp(&b.source_path)
                .then_with(|| a.name.cmp(&b.name))
        });
        commands
    }

    /// True when any plugin returned a partial result.
    pub fn is_partial(&self) -> bool {
        self.plugin_reports
            .iter()
            .any(|r| r.status == ScanStatus::DeadlineExceeded)
    }
}

// ============================================
// Discovery engine
// ============================================

/// Engine that runs discovery plugins through the pipeline.
///
/// The engine holds configuration only; every [`run`](Self::run) is
/// independent and leaves the engine untouched.
pub struct DiscoveryEngine {
    plugins: Vec<Box<dyn DiscoveryPlugin>>,
    confidence_threshold: f64,
    plugin_deadline: Option<Duration>,
}

impl DiscoveryEngine {
    /// Create a new empty engine.
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            plugin_deadline: None,
        }
    }

    /// Create an engine with the given plugins, in order.
    pub fn with_plugins(plugins: Vec<Box<dyn DiscoveryPlugin>>) -> Self {
        Self {
            plugins,
            ..Self::new()
        }
    }

    /// Register a plugin with the engine.
    pub fn register(&mut self, plugin: Box<dyn DiscoveryPlugin>) {
        tracing::debug!(plugin = plugin.name(), "Registered discovery plugin");
        self.plugins.push(plugin);
    }

    /// Set the confidence threshold (inclusive) for the filter phase.
    pub fn set_confidence_threshold(&mut self, threshold: f64) {
        self.confidence_threshold = threshold;
    }

    /// Bound each plugin's scan phase to `deadline`.
    pub fn set_plugin_deadline(&mut self, deadline: Duration) {
        self.plugin_deadline = Some(deadline);
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// Get list of registered plugin names.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Check if a plugin is registered.
    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    /// Run discovery against `project_root`.
    ///
    /// Fails only when `project_root` is not an existing directory; per-file
    /// and per-plugin problems shrink the result instead.
    pub fn run(&self, project_root: &Path) -> Result<DiscoveryResult> {
        if !project_root.is_dir() {
            return Err(Error::InvalidProjectRoot(project_root.to_path_buf()));
        }

        let started_at = Utc::now();
        let start = Instant::now();

        let (collected, plugin_reports) = self.scan_phase(project_root);
        let enriched = self.enrich_phase(&collected);
        let raw_artifacts =
            ConfidenceFilter::new(self.confidence_threshold).apply(enriched);
        let commands = normalize_artifacts(&raw_artifacts);

        tracing::info!(
            root = %project_root.display(),
            plugins = self.plugins.len(),
            scanned = collected.len(),
            kept = raw_artifacts.len(),
            commands = commands.len(),
            duration_ms = start.elapsed().as_millis() as i64,
            "Discovery run complete"
        );

        Ok(DiscoveryResult {
            project_root: project_root.to_path_buf(),
            started_at,
            raw_artifacts,
            commands,
            plugin_reports,
        })
    }

    /// Run every plugin's scan and concatenate the results in plugin order.
    fn scan_phase(&self, project_root: &Path) -> (Vec<RawArtifact>, Vec<PluginScanReport>) {
        let mut collected = Vec::new();
        let mut reports = Vec::with_capacity(self.plugins.len());

        for plugin in &self.plugins {
            let ctx = match self.plugin_deadline {
                Some(budget) => ScanContext::with_budget(project_root, budget),
                None => ScanContext::new(project_root),
            };
            let start = Instant::now();

            let artifacts = plugin.scan(&ctx);

            let duration_ms = start.elapsed().as_millis() as i64;
            let status = if ctx.was_truncated() {
                tracing::warn!(
                    plugin = plugin.name(),
                    duration_ms,
                    artifacts = artifacts.len(),
                    "Plugin scan exceeded deadline; keeping partial result"
                );
                ScanStatus::DeadlineExceeded
            } else {
                ScanStatus::Complete
            };

            tracing::debug!(
                plugin = plugin.name(),
                artifacts = artifacts.len(),
                duration_ms,
                "Plugin scan finished"
            );

            reports.push(PluginScanReport {
                plugin: plugin.name().to_string(),
                artifacts: artifacts.len(),
                duration_ms,
                status,
            });
            collected.extend(artifacts);
        }

        (collected, reports)
    }

    /// Pass every collected artifact through every plugin's classify and
    /// extract, then that plugin's normalize.
    ///
    /// Each plugin sees the artifacts of all plugins, so an artifact kept by
    /// N plugins appears N times in the output.
    // TODO: scope classify/extract to a plugin's own origins once a plugin
    // needs to enrich foreign artifacts deliberately (duplicates today).
    fn enrich_phase(&self, collected: &[RawArtifact]) -> Vec<RawArtifact> {
        let mut enriched = Vec::new();

        for plugin in &self.plugins {
            let interim: Vec<RawArtifact> = collected
                .iter()
                .filter_map(|artifact| plugin.classify(artifact.clone()))
                .filter_map(|artifact| plugin.extract(artifact))
                .collect();
            enriched.extend(plugin.normalize(interim));
        }

        enriched
    }
}

impl Default for DiscoveryEngine {
    fn default() -> Self {
        Self::new()
    }
}
