//! JSON command catalog persistence
//!
//! A catalog is a pretty-printed JSON array of [`CommandDefinition`]s stored
//! as `command_catalog.json`. Loading is lenient: a missing or malformed
//! catalog reads as empty so callers can always fall back to a fresh scan.

use crate::discovery::DiscoveryEngine;
use crate::error::{Error, Result};
use crate::types::CommandDefinition;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of a persisted catalog.
pub const CATALOG_FILENAME: &str = "command_catalog.json";

/// Outcome of [`refresh`].
#[derive(Debug, Clone)]
pub struct CatalogRefresh {
    /// Number of commands written
    pub count: usize,
    /// Where the catalog was written
    pub path: PathBuf,
    /// True when a plugin hit its scan deadline
    pub partial: bool,
}

/// Write `commands` to `path`, creating parent directories as needed.
pub fn save(path: &Path, commands: &[CommandDefinition]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(commands)?;
    fs::write(path, json + "\n")
        .map_err(|e| Error::Catalog(format!("failed to write {}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), commands = commands.len(), "Saved catalog");
    Ok(())
}

/// Read a catalog from `path`.
///
/// Returns an empty list when the file does not exist or cannot be parsed.
pub fn load(path: &Path) -> Vec<CommandDefinition> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read catalog");
            return Vec::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(commands) => commands,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed catalog");
            Vec::new()
        }
    }
}

/// Run discovery on `project_root` and overwrite the catalog at `path`.
pub fn refresh(engine: &DiscoveryEngine, project_root: &Path, path: &Path) -> Result<CatalogRefresh> {
    let result = engine.run(project_root)?;
    save(path, &result.commands)?;

    tracing::info!(
        root = %project_root.display(),
        path = %path.display(),
        commands = result.commands.len(),
        "Catalog refreshed"
    );

    Ok(CatalogRefresh {
        count: result.commands.len(),
        path: path.to_path_buf(),
        partial: result.is_partial(),
    })
}

/// All commands named `name`, in catalog order.
///
/// Names are not unique across source files, so this can return several.
pub fn find_by_name<'a>(commands: &'a [CommandDefinition], name: &str) -> Vec<&'a CommandDefinition> {
    commands.iter().filter(|c| c.name == name).collect()
}

pub fn find_by_id<'a>(commands: &'a [CommandDefinition], id: &str) -> Option<&'a CommandDefinition> {
    commands.iter().find(|c| c.id == id)
}
