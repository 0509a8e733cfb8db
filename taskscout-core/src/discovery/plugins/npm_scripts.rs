//! package.json scripts discovery plugin
//!
//! Finds `package.json` manifests at any depth and emits one artifact per
//! entry of their `scripts` object, along with the package manager that
//! should run it.
//!
//! ## Package manager detection
//!
//! Checked in the manifest's own directory, first match wins:
//!
//! | Source | Result |
//! |--------|--------|
//! | `packageManager` field prefix `pnpm` / `yarn` / `npm` / `bun` | that tool |
//! | `pnpm-lock.yaml` | pnpm |
//! | `yarn.lock` | yarn |
//! | `bun.lockb` | bun |
//! | `package-lock.json` | npm |
//! | otherwise | npm |

use crate::config::DiscoveryConfig;
use crate::discovery::plugin::{find_files, scope_tag, DiscoveryPlugin, ScanContext};
use crate::discovery::plugins::EMITTED_CONFIDENCE;
use crate::error::Result;
use crate::types::{ArtifactMeta, Origin, RawArtifact};
use serde_json::Value;
use std::path::Path;

/// Plugin name used in configuration and diagnostics.
pub const NPM_SCRIPTS_PLUGIN: &str = "npm_scripts";

const DEFAULT_PACKAGE_MANAGER: &str = "npm";

const MANAGER_PREFIXES: &[&str] = &["pnpm", "yarn", "npm", "bun"];

const LOCKFILES: &[(&str, &str)] = &[
    ("pnpm-lock.yaml", "pnpm"),
    ("yarn.lock", "yarn"),
    ("bun.lockb", "bun"),
    ("package-lock.json", "npm"),
];

/// Parser for `scripts` in Node package manifests.
pub struct NpmScriptsPlugin {
    manifest_name: String,
    skip_dirs: Vec<String>,
}

impl NpmScriptsPlugin {
    /// Create a plugin with the default manifest name and skip list.
    pub fn new() -> Self {
        Self::from_config(&DiscoveryConfig::default())
    }

    /// Create a plugin from discovery configuration.
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self {
            manifest_name: config.manifest_name.clone(),
            skip_dirs: config.skip_dirs.clone(),
        }
    }

    fn parse_file(&self, project_root: &Path, file_path: &Path) -> Result<Vec<RawArtifact>> {
        let content = std::fs::read_to_string(file_path)?;
        let manifest: Value = serde_json::from_str(&content)?;

        let Some(scripts) = manifest.get("scripts").and_then(Value::as_object) else {
            return Ok(Vec::new());
        };

        let dir = file_path.parent().unwrap_or(project_root);
        let package_manager = detect_package_manager(dir, &manifest);
        let cwd = dir.to_string_lossy().into_owned();
        let scope = scope_tag(project_root, dir);
        let source_path = file_path.to_string_lossy().into_owned();

        let artifacts = scripts
            .iter()
            .map(|(name, cmd)| {
                let raw_cmd = cmd.as_str().map(str::to_string);
                RawArtifact {
                    kind: "package_script".to_string(),
                    path: source_path.clone(),
                    content_snippet: raw_cmd.clone(),
                    meta: ArtifactMeta {
                        script_name: Some(name.clone()),
                        description: Some(format!("package script: {}", name)),
                        origin: Some(Origin::PackageScript.as_str().to_string()),
                        raw_cmd,
                        package_manager: Some(package_manager.to_string()),
                        cwd: Some(cwd.clone()),
                        tags: scope.iter().cloned().collect(),
                        ..Default::default()
                    },
                    confidence: Some(EMITTED_CONFIDENCE),
                }
            })
            .collect();

        Ok(artifacts)
    }
}

impl Default for NpmScriptsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryPlugin for NpmScriptsPlugin {
    fn name(&self) -> &str {
        NPM_SCRIPTS_PLUGIN
    }

    fn origins(&self) -> Vec<Origin> {
        vec![Origin::PackageScript]
    }

    fn scan(&self, ctx: &ScanContext) -> Vec<RawArtifact> {
        let files = find_files(ctx, &self.skip_dirs, |name| name == self.manifest_name);

        let mut artifacts = Vec::new();
        for file in files {
            match self.parse_file(ctx.project_root, &file) {
                Ok(found) => {
                    tracing::debug!(path = %file.display(), scripts = found.len(), "Parsed package manifest");
                    artifacts.extend(found);
                }
                Err(e) => {
                    tracing::warn!(path = %file.display(), error = %e, "Skipping unparseable package manifest");
                }
            }
        }
        artifacts
    }
}

/// Pick the package manager for the manifest in `dir`.
pub fn detect_package_manager(dir: &Path, manifest: &Value) -> &'static str {
    if let Some(field) = manifest.get("packageManager").and_then(Value::as_str) {
        if let Some(pm) = MANAGER_PREFIXES.iter().find(|pm| field.starts_with(*pm)) {
            return *pm;
        }
    }

    LOCKFILES
        .iter()
        .find(|(lockfile, _)| dir.join(lockfile).exists())
        .map(|(_, pm)| *pm)
        .unwrap_or(DEFAULT_PACKAGE_MANAGER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn scan(root: &Path) -> Vec<RawArtifact> {
        NpmScriptsPlugin::new().scan(&ScanContext::new(root))
    }

    #[test]
    fn test_scan_emits_one_artifact_per_script() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "web", "scripts": {"dev": "vite --port=3000", "build": "vite build"}}"#,
        )
        .unwrap();

        let artifacts = scan(dir.path());
        assert_eq!(artifacts.len(), 2);

        let dev = artifacts
            .iter()
            .find(|a| a.meta.script_name.as_deref() == Some("dev"))
            .unwrap();
        assert_eq!(dev.kind, "package_script");
        assert_eq!(dev.meta.origin.as_deref(), Some("package_script"));
        assert_eq!(dev.meta.raw_cmd.as_deref(), Some("vite --port=3000"));
        assert_eq!(dev.meta.description.as_deref(), Some("package script: dev"));
        assert_eq!(dev.meta.package_manager.as_deref(), Some("npm"));
        assert_eq!(dev.confidence, Some(EMITTED_CONFIDENCE));
        assert!(dev.meta.tags.is_empty());
    }

    #[test]
    fn test_scripts_keep_manifest_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"scripts": {"zeta": "z", "build": "b", "alpha": "a"}}"#,
        )
        .unwrap();

        let names: Vec<_> = scan(dir.path())
            .into_iter()
            .map(|a| a.meta.script_name.unwrap())
            .collect();
        assert_eq!(names, vec!["zeta", "build", "alpha"]);
    }

    #[test]
    fn test_workspace_packages_and_vendor_dirs() {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join("packages/ui");
        let vendored = dir.path().join("node_modules/left-pad");
        fs::create_dir_all(&app).unwrap();
        fs::create_dir_all(&vendored).unwrap();
        fs::write(app.join("package.json"), r#"{"scripts": {"storybook": "storybook dev"}}"#).unwrap();
        fs::write(app.join("pnpm-lock.yaml"), "").unwrap();
        fs::write(vendored.join("package.json"), r#"{"scripts": {"test": "tape"}}"#).unwrap();

        let artifacts = scan(dir.path());
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].meta.tags, vec!["scope:packages/ui"]);
        assert_eq!(artifacts[0].meta.package_manager.as_deref(), Some("pnpm"));
        assert_eq!(
            artifacts[0].meta.cwd.as_deref(),
            Some(app.to_string_lossy().as_ref())
        );
    }

    #[test]
    fn test_malformed_manifests_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("a/package.json"), "{ not json").unwrap();
        fs::write(dir.path().join("b/package.json"), r#"{"scripts": ["nope"]}"#).unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"scripts": {"start": "node index.js", "weird": 42}}"#,
        )
        .unwrap();

        let artifacts = scan(dir.path());
        assert_eq!(artifacts.len(), 2);
        let weird = artifacts
            .iter()
            .find(|a| a.meta.script_name.as_deref() == Some("weird"))
            .unwrap();
        assert!(weird.meta.raw_cmd.is_none());
        assert!(weird.content_snippet.is_none());
    }

    #[test]
    fn test_detect_package_manager_field_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package-lock.json"), "{}").unwrap();

        let manifest = json!({"packageManager": "pnpm@9.1.0"});
        assert_eq!(detect_package_manager(dir.path(), &manifest), "pnpm");

        let manifest = json!({"packageManager": "yarn@4.0.0"});
        assert_eq!(detect_package_manager(dir.path(), &manifest), "yarn");

        let manifest = json!({"packageManager": "deno@1"});
        assert_eq!(detect_package_manager(dir.path(), &manifest), "npm");
    }

    #[test]
    fn test_detect_package_manager_lockfiles() {
        let dir = TempDir::new().unwrap();
        assert_eq!(detect_package_manager(dir.path(), &json!({})), "npm");

        fs::write(dir.path().join("yarn.lock"), "").unwrap();
        assert_eq!(detect_package_manager(dir.path(), &json!({})), "yarn");

        fs::write(dir.path().join("pnpm-lock.yaml"), "").unwrap();
        assert_eq!(detect_package_manager(dir.path(), &json!({})), "pnpm");
    }
}
