//! taskscout-catalog - manage persisted per-project command catalogs
//!
//! Catalogs live under the XDG data directory:
//! - `$XDG_DATA_HOME/taskscout/catalogs/<project>/command_catalog.json`
//!
//! The location can be overridden with `[catalog] dir` in config.toml.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use taskscout_core::catalog;
use taskscout_core::discovery::create_default_engine;
use taskscout_core::{CommandDefinition, Config};

#[derive(Parser)]
#[command(name = "taskscout-catalog")]
#[command(about = "Refresh and inspect per-project command catalogs")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run discovery and overwrite the project's catalog
    Refresh {
        /// Project key the catalog is stored under
        #[arg(short, long)]
        project: String,

        /// Repository root to scan (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// List the commands in a project's catalog
    List {
        #[arg(short, long)]
        project: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Show one command by name or id
    Show {
        #[arg(short, long)]
        project: String,

        /// Command name or id
        name: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        taskscout_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("taskscout-catalog starting");

    match args.command {
        Command::Refresh { project, path } => cmd_refresh(&config, &project, path),
        Command::List { project, format } => cmd_list(&config, &project, format),
        Command::Show { project, name } => cmd_show(&config, &project, &name),
    }
}

fn cmd_refresh(config: &Config, project: &str, path: Option<PathBuf>) -> Result<()> {
    let root = match path {
        Some(path) => path,
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let catalog_path = config.catalog_path(project);

    let engine = create_default_engine(&config.discovery);
    let refreshed = catalog::refresh(&engine, &root, &catalog_path)
        .with_context(|| format!("failed to refresh catalog for '{}'", project))?;

    println!(
        "Catalog refreshed: {} command(s) -> {}",
        refreshed.count,
        refreshed.path.display()
    );
    if refreshed.partial {
        println!("Warning: a plugin hit its scan deadline; the catalog may be incomplete.");
    }
    Ok(())
}

fn cmd_list(config: &Config, project: &str, format: Format) -> Result<()> {
    let catalog_path = config.catalog_path(project);
    tracing::debug!(project, path = %catalog_path.display(), "Listing catalog");
    let commands = catalog::load(&catalog_path);

    match format {
        Format::Json => {
            let json =
                serde_json::to_string_pretty(&commands).context("failed to serialize catalog")?;
            println!("{}", json);
        }
        Format::Text => {
            if commands.is_empty() {
                println!("No commands cataloged for '{}'.", project);
                println!("Run 'taskscout-catalog refresh --project {}' first.", project);
                return Ok(());
            }
            for cmd in &commands {
                println!(
                    "{}  {:<16} {:<24} {}",
                    cmd.id,
                    cmd.origin.as_str(),
                    cmd.name,
                    cmd.description.as_deref().unwrap_or("")
                );
            }
            println!("\n{} command(s)", commands.len());
        }
    }
    Ok(())
}

fn cmd_show(config: &Config, project: &str, name: &str) -> Result<()> {
    let commands = catalog::load(&config.catalog_path(project));

    let mut matches = catalog::find_by_name(&commands, name);
    if matches.is_empty() {
        matches.extend(catalog::find_by_id(&commands, name));
    }
    if matches.is_empty() {
        anyhow::bail!("No command '{}' in catalog for '{}'", name, project);
    }

    for (i, cmd) in matches.into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_command(cmd);
    }
    Ok(())
}

fn print_command(cmd: &CommandDefinition) {
    println!("{} ({})", cmd.name, cmd.id);
    println!("  Origin:      {}", cmd.origin);
    println!("  Source:      {}", cmd.source_path);
    if let Some(ref desc) = cmd.description {
        println!("  Description: {}", desc);
    }
    if let Some(line) = cmd.invocation.command_line() {
        println!("  Run:         {}", line);
    }
    if let Some(ref cwd) = cmd.invocation.cwd {
        println!("  Directory:   {}", cwd);
    }
    if !cmd.tags.is_empty() {
        println!("  Tags:        {}", cmd.tags.join(", "));
    }
    if !cmd.parameters.is_empty() {
        println!("  Parameters:");
        for param in &cmd.parameters {
            let required = if param.required { " (required)" } else { "" };
            let default = param
                .default
                .as_ref()
                .map(|d| format!(" [default: {}]", d))
                .unwrap_or_default();
            println!(
                "    {} <{}>{}{}",
                param.name, param.param_type, required, default
            );
        }
    }
}
