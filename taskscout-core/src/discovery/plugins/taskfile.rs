//! Taskfile discovery plugin
//!
//! Finds `Taskfile.yml` files at any depth below the project root and emits
//! one artifact per task.
//!
//! ```yaml
//! version: '3'
//! tasks:
//!   build:
//!     desc: Build the project
//!     cmd: go build ./...
//! ```
//!
//! # Error Handling
//!
//! - **Unreadable file / invalid YAML**: logged as warning, file skipped.
//! - **Non-mapping `tasks` or task entries**: the entry is skipped.
//! - **Non-string command**: the artifact is still emitted, without a raw
//!   command (so no parameters are inferred).

use crate::config::DiscoveryConfig;
use crate::discovery::plugin::{find_files, scope_tag, DiscoveryPlugin, ScanContext};
use crate::discovery::plugins::EMITTED_CONFIDENCE;
use crate::error::Result;
use crate::types::{ArtifactMeta, Origin, RawArtifact};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Plugin name used in configuration and diagnostics.
pub const TASKFILE_PLUGIN: &str = "taskfile";

/// Parser for go-task `Taskfile.yml` definitions.
pub struct TaskfilePlugin {
    file_names: Vec<String>,
    skip_dirs: Vec<String>,
}

impl TaskfilePlugin {
    /// Create a plugin with the default file names and skip list.
    pub fn new() -> Self {
        Self::from_config(&DiscoveryConfig::default())
    }

    /// Create a plugin from discovery configuration.
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self {
            file_names: config.taskfile_names.clone(),
            skip_dirs: config.skip_dirs.clone(),
        }
    }

    /// Create a plugin matching the given file name patterns.
    pub fn with_file_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            file_names: names.into_iter().map(Into::into).collect(),
            ..Self::new()
        }
    }

    fn patterns(&self) -> Vec<glob::Pattern> {
        self.file_names
            .iter()
            .filter_map(|name| match glob::Pattern::new(name) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!(pattern = %name, error = %e, "Ignoring invalid taskfile pattern");
                    None
                }
            })
            .collect()
    }

    /// Parse one Taskfile into artifacts.
    fn parse_file(&self, project_root: &Path, file_path: &Path) -> Result<Vec<RawArtifact>> {
        let content = std::fs::read_to_string(file_path)?;
        let doc: Value = serde_yaml::from_str(&content)?;

        let Some(tasks) = doc.get("tasks").and_then(Value::as_mapping) else {
            return Ok(Vec::new());
        };

        let dir = file_path.parent().unwrap_or(project_root);
        let cwd = dir.to_string_lossy().into_owned();
        let scope = scope_tag(project_root, dir);
        let source_path = file_path.to_string_lossy().into_owned();

        let artifacts = tasks
            .iter()
            .filter_map(|(key, spec)| {
                let name = task_name(key)?;
                let spec = spec.as_mapping()?;
                let raw_cmd = task_command(spec);

                Some(RawArtifact {
                    kind: "task".to_string(),
                    path: source_path.clone(),
                    content_snippet: raw_cmd.clone(),
                    meta: ArtifactMeta {
                        task_name: Some(name),
                        description: string_field(spec, "desc")
                            .or_else(|| string_field(spec, "description")),
                        origin: Some(Origin::Taskfile.as_str().to_string()),
                        raw_cmd,
                        cwd: Some(cwd.clone()),
                        tags: scope.iter().cloned().collect(),
                        ..Default::default()
                    },
                    confidence: Some(EMITTED_CONFIDENCE),
                })
            })
            .collect();

        Ok(artifacts)
    }
}

impl Default for TaskfilePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryPlugin for TaskfilePlugin {
    fn name(&self) -> &str {
        TASKFILE_PLUGIN
    }

    fn origins(&self) -> Vec<Origin> {
        vec![Origin::Taskfile]
    }

    fn scan(&self, ctx: &ScanContext) -> Vec<RawArtifact> {
        let patterns = self.patterns();
        let files = find_files(ctx, &self.skip_dirs, |name| {
            patterns.iter().any(|p| p.matches(name))
        });

        let mut artifacts = Vec::new();
        for file in files {
            match self.parse_file(ctx.project_root, &file) {
                Ok(found) => {
                    tracing::debug!(path = %file.display(), tasks = found.len(), "Parsed Taskfile");
                    artifacts.extend(found);
                }
                Err(e) => {
                    tracing::warn!(path = %file.display(), error = %e, "Skipping unparseable Taskfile");
                }
            }
        }
        artifacts
    }
}

fn task_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_field(spec: &Mapping, key: &str) -> Option<String> {
    spec.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Raw command of a task: a string `cmd`, then a string `run`, then the
/// string entries of `cmds` joined with ` && `.
fn task_command(spec: &Mapping) -> Option<String> {
    if let Some(cmd) = ["cmd", "run"]
        .into_iter()
        .find_map(|key| spec.get(key).and_then(Value::as_str))
    {
        return Some(cmd.to_string());
    }

    let steps: Vec<&str> = spec
        .get("cmds")?
        .as_sequence()?
        .iter()
        .filter_map(|step| {
            step.as_str()
                .or_else(|| step.get("cmd").and_then(Value::as_str))
        })
        .collect();

    if steps.is_empty() {
        None
    } else {
        Some(steps.join(" && "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TASKFILE: &str = r#"version: '3'
vars: {}
tasks:
  build:
    desc: Build the project
    cmd: echo building
  test:
    desc: Run tests
    cmd: echo testing
"#;

    fn scan(root: &Path) -> Vec<RawArtifact> {
        TaskfilePlugin::new().scan(&ScanContext::new(root))
    }

    #[test]
    fn test_scan_emits_one_artifact_per_task() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Taskfile.yml"), TASKFILE).unwrap();

        let artifacts = scan(dir.path());
        assert_eq!(artifacts.len(), 2);

        let build = &artifacts[0];
        assert_eq!(build.kind, "task");
        assert_eq!(build.meta.task_name.as_deref(), Some("build"));
        assert_eq!(build.meta.description.as_deref(), Some("Build the project"));
        assert_eq!(build.meta.origin.as_deref(), Some("taskfile"));
        assert_eq!(build.meta.raw_cmd.as_deref(), Some("echo building"));
        assert_eq!(build.content_snippet.as_deref(), Some("echo building"));
        assert_eq!(
            build.meta.cwd.as_deref(),
            Some(dir.path().to_string_lossy().as_ref())
        );
        assert!(build.meta.tags.is_empty());
        assert_eq!(build.confidence, Some(EMITTED_CONFIDENCE));
    }

    #[test]
    fn test_nested_taskfile_gets_scope_tag() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("services/api");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Taskfile.yml"), TASKFILE).unwrap();

        let artifacts = scan(dir.path());
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].meta.tags, vec!["scope:services/api"]);
        assert_eq!(
            artifacts[0].meta.cwd.as_deref(),
            Some(nested.to_string_lossy().as_ref())
        );
    }

    #[test]
    fn test_invalid_yaml_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("broken")).unwrap();
        fs::write(dir.path().join("broken/Taskfile.yml"), "tasks: [unclosed").unwrap();
        fs::write(dir.path().join("Taskfile.yml"), TASKFILE).unwrap();

        let artifacts = scan(dir.path());
        assert_eq!(artifacts.len(), 2);
        assert!(artifacts.iter().all(|a| a.meta.tags.is_empty()));
    }

    #[test]
    fn test_alternate_keys_and_odd_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Taskfile.yml"),
            r#"
tasks:
  serve:
    description: Serve it
    run: npm start --port=8080
  release:
    cmds:
      - go build
      - cmd: goreleaser --clean
  shorthand: echo not a mapping
  structured:
    cmd:
      task: build
"#,
        )
        .unwrap();

        let artifacts = scan(dir.path());
        let names: Vec<_> = artifacts
            .iter()
            .map(|a| a.meta.task_name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["serve", "release", "structured"]);

        assert_eq!(artifacts[0].meta.description.as_deref(), Some("Serve it"));
        assert_eq!(
            artifacts[0].meta.raw_cmd.as_deref(),
            Some("npm start --port=8080")
        );
        assert_eq!(
            artifacts[1].meta.raw_cmd.as_deref(),
            Some("go build && goreleaser --clean")
        );
        assert!(artifacts[2].meta.raw_cmd.is_none());
        assert!(artifacts[2].content_snippet.is_none());
    }

    #[test]
    fn test_non_string_cmd_falls_back_to_run() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Taskfile.yml"),
            r#"
tasks:
  nulled:
    cmd:
    run: make all --jobs=4
  mapped:
    cmd:
      task: build
    run: make mapped
"#,
        )
        .unwrap();

        let artifacts = scan(dir.path());
        assert_eq!(artifacts.len(), 2);
        assert_eq!(
            artifacts[0].meta.raw_cmd.as_deref(),
            Some("make all --jobs=4")
        );
        assert_eq!(artifacts[1].meta.raw_cmd.as_deref(), Some("make mapped"));
    }

    #[test]
    fn test_empty_and_taskless_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Taskfile.yml"), "").unwrap();
        assert!(scan(dir.path()).is_empty());

        fs::write(dir.path().join("Taskfile.yml"), "- just\n- a list\n").unwrap();
        assert!(scan(dir.path()).is_empty());
    }

    #[test]
    fn test_custom_file_patterns() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Taskfile.yaml"), TASKFILE).unwrap();

        assert!(scan(dir.path()).is_empty());

        let plugin = TaskfilePlugin::with_file_names(["Taskfile.y*ml"]);
        let artifacts = plugin.scan(&ScanContext::new(dir.path()));
        assert_eq!(artifacts.len(), 2);
    }
}
