//! Built-in discovery plugins
//!
//! Each source format has a plugin module that implements
//! the [`DiscoveryPlugin`](super::DiscoveryPlugin) trait.
//!
//! ## Supported Formats
//!
//! | Format | Module | Origin |
//! |--------|--------|--------|
//! | `Taskfile.yml` | [`taskfile`] | `taskfile` |
//! | `package.json` scripts | [`npm_scripts`] | `package_script` |

mod npm_scripts;
mod taskfile;

pub use npm_scripts::{detect_package_manager, NpmScriptsPlugin, NPM_SCRIPTS_PLUGIN};
pub use taskfile::{TaskfilePlugin, TASKFILE_PLUGIN};

use super::{DiscoveryEngine, DiscoveryPlugin};
use crate::config::DiscoveryConfig;
use std::time::Duration;

/// Confidence attached to every artifact the built-in plugins emit.
///
/// A flat "structurally valid but unverified" score, not a computed quality
/// metric.
pub const EMITTED_CONFIDENCE: f64 = 0.6;

/// Create all enabled built-in plugins.
pub fn create_all_plugins(config: &DiscoveryConfig) -> Vec<Box<dyn DiscoveryPlugin>> {
    [TASKFILE_PLUGIN, NPM_SCRIPTS_PLUGIN]
        .into_iter()
        .filter(|name| {
            let enabled = config.is_enabled(name);
            if !enabled {
                tracing::debug!(plugin = name, "Plugin disabled by configuration");
            }
            enabled
        })
        .filter_map(|name| plugin_for(name, config))
        .collect()
}

/// Get a built-in plugin by name.
///
/// Returns `None` if no plugin has that name.
pub fn plugin_for(name: &str, config: &DiscoveryConfig) -> Option<Box<dyn DiscoveryPlugin>> {
    match name {
        TASKFILE_PLUGIN => Some(Box::new(TaskfilePlugin::from_config(config))),
        NPM_SCRIPTS_PLUGIN => Some(Box::new(NpmScriptsPlugin::from_config(config))),
        _ => None,
    }
}

/// Create an engine with all enabled built-in plugins registered and the
/// configured threshold and deadline applied.
///
/// ```rust,ignore
/// use taskscout_core::discovery::create_default_engine;
///
/// let engine = create_default_engine(&config.discovery);
/// let result = engine.run(Path::new("."))?;
/// println!("Found {} commands", result.commands.len());
/// ```
pub fn create_default_engine(config: &DiscoveryConfig) -> DiscoveryEngine {
    let mut engine = DiscoveryEngine::new();
    for plugin in create_all_plugins(config) {
        engine.register(plugin);
    }
    engine.set_confidence_threshold(config.confidence_threshold);
    if let Some(ms) = config.plugin_deadline_ms {
        engine.set_plugin_deadline(Duration::from_millis(ms));
    }
    engine
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Origin;

    #[test]
    fn test_default_engine_has_plugins() {
        let engine = create_default_engine(&DiscoveryConfig::default());
        assert_eq!(engine.plugin_names(), vec!["taskfile", "npm_scripts"]);
        assert_eq!(engine.confidence_threshold(), 0.35);
    }

    #[test]
    fn test_disabled_plugins_are_left_out() {
        let config = DiscoveryConfig {
            disabled_plugins: vec!["npm_scripts".to_string()],
            confidence_threshold: 0.5,
            ..Default::default()
        };
        let engine = create_default_engine(&config);
        assert_eq!(engine.plugin_names(), vec!["taskfile"]);
        assert!(!engine.has_plugin("npm_scripts"));
        assert_eq!(engine.confidence_threshold(), 0.5);
    }

    #[test]
    fn test_plugin_for() {
        let config = DiscoveryConfig::default();
        let plugin = plugin_for("taskfile", &config).unwrap();
        assert_eq!(plugin.origins(), vec![Origin::Taskfile]);

        let plugin = plugin_for("npm_scripts", &config).unwrap();
        assert_eq!(plugin.origins(), vec![Origin::PackageScript]);

        assert!(plugin_for("makefile", &config).is_none());
    }
}
