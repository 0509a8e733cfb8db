//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/taskscout/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/taskscout/` (~/.config/taskscout/)
//! - Data: `$XDG_DATA_HOME/taskscout/` (~/.local/share/taskscout/)
//! - State/Logs: `$XDG_STATE_HOME/taskscout/` (~/.local/state/taskscout/)

use crate::catalog::CATALOG_FILENAME;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Discovery pipeline tuning
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Catalog storage
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Discovery pipeline configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DiscoveryConfig {
    /// Artifacts with a confidence below this are dropped (unknown confidence always passes)
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Directory names never descended into during scans
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,

    /// File name patterns recognized as task-runner files
    #[serde(default = "default_taskfile_names")]
    pub taskfile_names: Vec<String>,

    /// File name recognized as a package manifest
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// Per-plugin scan deadline in milliseconds (unbounded if unset)
    #[serde(default)]
    pub plugin_deadline_ms: Option<u64>,

    /// Plugins left out of the default engine
    #[serde(default)]
    pub disabled_plugins: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            skip_dirs: default_skip_dirs(),
            taskfile_names: default_taskfile_names(),
            manifest_name: default_manifest_name(),
            plugin_deadline_ms: None,
            disabled_plugins: vec![],
        }
    }
}

impl DiscoveryConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::Config(format!(
                "discovery.confidence_threshold must be between 0 and 1, got {}",
                self.confidence_threshold
            )));
        }
        if self.taskfile_names.is_empty() {
            return Err(Error::Config(
                "discovery.taskfile_names must not be empty".to_string(),
            ));
        }
        for pattern in &self.taskfile_names {
            glob::Pattern::new(pattern).map_err(|e| {
                Error::Config(format!(
                    "discovery.taskfile_names has invalid pattern {:?}: {}",
                    pattern, e
                ))
            })?;
        }
        if self.manifest_name.is_empty() {
            return Err(Error::Config(
                "discovery.manifest_name must not be empty".to_string(),
            ));
        }
        if self.plugin_deadline_ms == Some(0) {
            return Err(Error::Config(
                "discovery.plugin_deadline_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a plugin is enabled
    pub fn is_enabled(&self, plugin_name: &str) -> bool {
        !self.disabled_plugins.iter().any(|p| p == plugin_name)
    }
}

/// Initial heuristic, not calibrated against real repositories.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.35;

fn default_confidence_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_skip_dirs() -> Vec<String> {
    ["node_modules", ".git", ".venv", "dist", "build"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_taskfile_names() -> Vec<String> {
    vec!["Taskfile.yml".to_string()]
}

fn default_manifest_name() -> String {
    "package.json".to_string()
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Catalog storage configuration
#[derive(Debug, Deserialize, Default)]
pub struct CatalogConfig {
    /// Override for the directory holding per-project catalogs
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.discovery.validate()?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/taskscout/config.toml` (~/.config/taskscout/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("taskscout").join("config.toml")
    }

    /// Returns the data directory path
    ///
    /// `$XDG_DATA_HOME/taskscout/` (~/.local/share/taskscout/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("taskscout")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/taskscout/` (~/.local/state/taskscout/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("taskscout")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/taskscout/taskscout.log` (~/.local/state/taskscout/taskscout.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("taskscout.log")
    }

    /// Returns the directory holding per-project catalogs
    ///
    /// `catalog.dir` if configured, else `$XDG_DATA_HOME/taskscout/catalogs/`
    pub fn catalog_dir(&self) -> PathBuf {
        self.catalog
            .dir
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("catalogs"))
    }

    /// Returns the catalog file for a project key
    ///
    /// Characters outside `[A-Za-z0-9._-]` in the key are replaced with `_`
    /// so any key maps to a single directory name.
    pub fn catalog_path(&self, project_key: &str) -> PathBuf {
        self.catalog_dir()
            .join(sanitize_key(project_key))
            .join(CATALOG_FILENAME)
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}

fn sanitize_key(key: &str) -> String {
    let sanitized: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match sanitized.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => sanitized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.discovery.confidence_threshold, 0.35);
        assert!(config.discovery.skip_dirs.contains(&"node_modules".to_string()));
        assert_eq!(config.discovery.taskfile_names, vec!["Taskfile.yml"]);
        assert_eq!(config.discovery.manifest_name, "package.json");
        assert!(config.discovery.plugin_deadline_ms.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.discovery.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[discovery]
confidence_threshold = 0.5
skip_dirs = ["target"]
taskfile_names = ["Taskfile.yml", "Taskfile.yaml"]
plugin_deadline_ms = 2000
disabled_plugins = ["npm_scripts"]

[logging]
level = "debug"

[catalog]
dir = "/tmp/catalogs"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.discovery.confidence_threshold, 0.5);
        assert_eq!(config.discovery.skip_dirs, vec!["target"]);
        assert_eq!(config.discovery.taskfile_names.len(), 2);
        assert_eq!(config.discovery.manifest_name, "package.json");
        assert_eq!(config.discovery.plugin_deadline_ms, Some(2000));
        assert!(!config.discovery.is_enabled("npm_scripts"));
        assert!(config.discovery.is_enabled("taskfile"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.catalog_dir(), PathBuf::from("/tmp/catalogs"));
    }

    #[test]
    fn test_discovery_config_validation() {
        let config = DiscoveryConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DiscoveryConfig {
            taskfile_names: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DiscoveryConfig {
            plugin_deadline_ms: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_rejects_invalid_threshold() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[discovery]\nconfidence_threshold = -0.1\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_catalog_path_sanitizes_key() {
        let config = Config {
            catalog: CatalogConfig {
                dir: Some(PathBuf::from("/data")),
            },
            ..Default::default()
        };
        assert_eq!(
            config.catalog_path("my app/../x"),
            PathBuf::from("/data/my_app_.._x/command_catalog.json")
        );
        assert_eq!(
            config.catalog_path(".."),
            PathBuf::from("/data/_/command_catalog.json")
        );
    }
}
