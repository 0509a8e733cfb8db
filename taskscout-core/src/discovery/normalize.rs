//! Global normalization of raw artifacts into [`CommandDefinition`]s.
//!
//! One artifact becomes exactly one command. Malformed metadata degrades to
//! defaults; an artifact is only dropped when no usable name can be derived.

use crate::discovery::params::infer_parameters;
use crate::error::{Error, Result};
use crate::types::{
    CommandDefinition, CommandMeta, Invocation, Origin, RawArtifact, ADAPTER_NPM,
    ADAPTER_TASKFILE,
};
use std::path::Path;

/// Normalize every artifact, skipping (and logging) those that cannot be named.
pub fn normalize_artifacts(artifacts: &[RawArtifact]) -> Vec<CommandDefinition> {
    artifacts
        .iter()
        .filter_map(|artifact| match normalize_artifact(artifact) {
            Ok(cmd) => Some(cmd),
            Err(e) => {
                tracing::warn!(
                    path = %artifact.path,
                    kind = %artifact.kind,
                    error = %e,
                    "Skipping artifact that failed normalization"
                );
                None
            }
        })
        .collect()
}

/// Normalize a single artifact.
pub fn normalize_artifact(artifact: &RawArtifact) -> Result<CommandDefinition> {
    let meta = &artifact.meta;

    let name = match meta.declared_name() {
        Some(name) => name.to_string(),
        None => fallback_name(&artifact.path).ok_or_else(|| {
            Error::Normalization(format!(
                "cannot derive a command name for artifact at {:?}",
                artifact.path
            ))
        })?,
    };

    let origin = Origin::resolve(meta.origin.as_deref());

    Ok(CommandDefinition {
        description: meta.description.clone(),
        parameters: infer_parameters(meta.raw_cmd.as_deref()),
        tags: dedup_tags(&meta.tags),
        invocation: build_invocation(origin, &name, artifact),
        meta: CommandMeta {
            raw_meta: Some(meta.clone()),
            ..Default::default()
        },
        ..CommandDefinition::new(origin, artifact.path.as_str(), name)
    })
}

/// Last segment of the artifact's file path.
fn fallback_name(path: &str) -> Option<String> {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}

fn build_invocation(origin: Origin, name: &str, artifact: &RawArtifact) -> Invocation {
    let meta = &artifact.meta;

    let mut invocation = match origin {
        Origin::Taskfile => Invocation {
            adapter: Some(ADAPTER_TASKFILE.to_string()),
            task_name: Some(name.to_string()),
            ..Default::default()
        },
        Origin::PackageScript => Invocation {
            adapter: Some(ADAPTER_NPM.to_string()),
            package_manager: Some(
                meta.package_manager
                    .clone()
                    .unwrap_or_else(|| "npm".to_string()),
            ),
            script_name: Some(meta.script_name.clone().unwrap_or_else(|| name.to_string())),
            ..Default::default()
        },
        _ => Invocation::default(),
    };

    if let Some(cwd) = meta.cwd.as_deref().filter(|c| !c.is_empty()) {
        invocation.cwd = Some(cwd.to_string());
    }

    invocation
}

/// Tags are set-like: keep the first occurrence of each.
fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(tag) {
            out.push(tag.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{stable_command_id, ArtifactMeta};
    use serde_json::json;

    fn task_artifact(name: &str, cmd: &str) -> RawArtifact {
        RawArtifact {
            meta: ArtifactMeta {
                task_name: Some(name.to_string()),
                description: Some(format!("{} things", name)),
                origin: Some("taskfile".to_string()),
                raw_cmd: Some(cmd.to_string()),
                cwd: Some("/repo".to_string()),
                ..Default::default()
            },
            confidence: Some(0.6),
            ..RawArtifact::new("task", "/repo/Taskfile.yml")
        }
    }

    #[test]
    fn test_normalize_taskfile_artifact() {
        let cmd = normalize_artifact(&task_artifact("build", "go build --race")).unwrap();

        assert_eq!(cmd.name, "build");
        assert_eq!(cmd.origin, Origin::Taskfile);
        assert_eq!(cmd.source_path, "/repo/Taskfile.yml");
        assert_eq!(cmd.description.as_deref(), Some("build things"));
        assert_eq!(
            cmd.id,
            stable_command_id(&["taskfile", "/repo/Taskfile.yml", "build"])
        );
        assert_eq!(cmd.invocation.adapter.as_deref(), Some("taskfile"));
        assert_eq!(cmd.invocation.task_name.as_deref(), Some("build"));
        assert_eq!(cmd.invocation.cwd.as_deref(), Some("/repo"));
        assert_eq!(cmd.parameters.len(), 1);
        assert_eq!(cmd.parameters[0].name, "race");
        assert_eq!(
            cmd.meta.raw_meta.as_ref().unwrap().raw_cmd.as_deref(),
            Some("go build --race")
        );
    }

    #[test]
    fn test_normalize_package_script_artifact() {
        let artifact = RawArtifact {
            meta: ArtifactMeta {
                script_name: Some("dev".to_string()),
                origin: Some("package_script".to_string()),
                raw_cmd: Some("vite --port=3000".to_string()),
                package_manager: Some("pnpm".to_string()),
                tags: vec!["scope:apps/web".to_string(), "scope:apps/web".to_string()],
                ..Default::default()
            },
            ..RawArtifact::new("package_script", "/repo/apps/web/package.json")
        };
        let cmd = normalize_artifact(&artifact).unwrap();

        assert_eq!(cmd.name, "dev");
        assert_eq!(cmd.origin, Origin::PackageScript);
        assert_eq!(
            serde_json::to_value(&cmd.invocation).unwrap(),
            json!({"adapter": "npm", "package_manager": "pnpm", "script_name": "dev"})
        );
        assert_eq!(cmd.tags, vec!["scope:apps/web"]);
        assert_eq!(cmd.parameters[0].default, Some(json!("3000")));
    }

    #[test]
    fn test_package_script_defaults_to_npm() {
        let artifact = RawArtifact {
            meta: ArtifactMeta {
                script_name: Some("lint".to_string()),
                origin: Some("package_script".to_string()),
                ..Default::default()
            },
            ..RawArtifact::new("package_script", "package.json")
        };
        let cmd = normalize_artifact(&artifact).unwrap();
        assert_eq!(cmd.invocation.package_manager.as_deref(), Some("npm"));
        assert!(cmd.invocation.cwd.is_none());
        assert!(cmd.parameters.is_empty());
    }

    #[test]
    fn test_unknown_origin_falls_back_to_other() {
        let artifact = RawArtifact {
            meta: ArtifactMeta {
                origin: Some("makefile".to_string()),
                cwd: Some("/repo".to_string()),
                ..Default::default()
            },
            ..RawArtifact::new("target", "/repo/Makefile")
        };
        let cmd = normalize_artifact(&artifact).unwrap();

        assert_eq!(cmd.origin, Origin::Other);
        assert_eq!(cmd.name, "Makefile");
        assert!(cmd.invocation.adapter.is_none());
        assert_eq!(
            serde_json::to_value(&cmd.invocation).unwrap(),
            json!({"cwd": "/repo"})
        );
    }

    #[test]
    fn test_unnameable_artifact_is_skipped() {
        let artifacts = vec![
            RawArtifact::new("task", ""),
            task_artifact("build", "echo building"),
        ];
        let cmds = normalize_artifacts(&artifacts);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].name, "build");
    }
}
