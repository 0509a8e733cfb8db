//! taskscout-discover - run command discovery against a repository
//!
//! Prints the discovered commands as JSON, optionally with the raw
//! artifacts they were normalized from.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use taskscout_core::discovery::{create_default_engine, plugin_for};
use taskscout_core::{CommandDefinition, Config, DiscoveryEngine, RawArtifact};

/// Exit code for an unusable `--path`.
const EXIT_INVALID_PATH: i32 = 2;

#[derive(Parser)]
#[command(name = "taskscout-discover")]
#[command(about = "Discover runnable commands in a repository")]
#[command(version)]
struct Args {
    /// Path to repository root (defaults to current directory)
    #[arg(long)]
    path: Option<PathBuf>,

    /// File to write JSON output to (stdout if omitted)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Include raw artifacts in the JSON output
    #[arg(long)]
    show_raw: bool,

    /// Override the confidence threshold (0.0 - 1.0)
    #[arg(long)]
    threshold: Option<f64>,

    /// Only run the named plugin (repeatable)
    #[arg(long = "plugin", value_name = "NAME")]
    plugins: Vec<String>,
}

#[derive(Serialize)]
struct Bundle<'a> {
    commands: &'a [CommandDefinition],
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_artifacts: Option<&'a [RawArtifact]>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let mut config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let log_guard =
        taskscout_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("taskscout-discover starting");

    let repo_path = resolve_path(args.path.as_deref())?;
    if !repo_path.is_dir() {
        tracing::warn!(path = %repo_path.display(), "Invalid repository path");
        eprintln!("[taskscout] Invalid path: {}", repo_path.display());
        drop(log_guard);
        std::process::exit(EXIT_INVALID_PATH);
    }

    if let Some(threshold) = args.threshold {
        config.discovery.confidence_threshold = threshold;
        config
            .discovery
            .validate()
            .context("invalid --threshold")?;
    }

    let engine = build_engine(&config, &args.plugins)?;
    let result = engine
        .run(&repo_path)
        .with_context(|| format!("discovery failed for {}", repo_path.display()))?;

    let bundle = Bundle {
        commands: &result.commands,
        raw_artifacts: args.show_raw.then_some(result.raw_artifacts.as_slice()),
    };
    let text = serde_json::to_string_pretty(&bundle).context("failed to serialize results")?;

    match &args.out {
        Some(out_path) => {
            std::fs::write(out_path, text + "\n")
                .with_context(|| format!("failed to write {}", out_path.display()))?;
            tracing::info!(path = %out_path.display(), "Wrote discovery results");
            println!("[taskscout] Wrote discovery results -> {}", out_path.display());
        }
        None => println!("{}", text),
    }

    let mut summary = format!("[taskscout] Discovered {} command(s)", result.commands.len());
    if args.show_raw {
        summary.push_str(&format!("; {} raw", result.raw_artifacts.len()));
    }
    if result.is_partial() {
        summary.push_str(" (partial: plugin deadline exceeded)");
    }
    eprintln!("{}", summary);

    drop(log_guard);
    Ok(())
}

fn resolve_path(arg: Option<&Path>) -> Result<PathBuf> {
    match arg {
        Some(path) => Ok(std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())),
        None => std::env::current_dir().context("failed to read current directory"),
    }
}

/// Default engine, or only the plugins named on the command line.
fn build_engine(config: &Config, only: &[String]) -> Result<DiscoveryEngine> {
    if only.is_empty() {
        return Ok(create_default_engine(&config.discovery));
    }

    let plugins = only
        .iter()
        .map(|name| {
            plugin_for(name, &config.discovery)
                .with_context(|| format!("unknown plugin '{}'", name))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut engine = DiscoveryEngine::with_plugins(plugins);
    engine.set_confidence_threshold(config.discovery.confidence_threshold);
    if let Some(ms) = config.discovery.plugin_deadline_ms {
        engine.set_plugin_deadline(Duration::from_millis(ms));
    }
    Ok(engine)
}
