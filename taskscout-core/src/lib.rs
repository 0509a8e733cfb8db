//! # taskscout-core
//!
//! Core library for taskscout - a command discovery tool for project
//! repositories.
//!
//! This library provides:
//! - Domain types for raw artifacts, parameters, and normalized commands
//! - A plugin-based discovery pipeline (Taskfiles, package.json scripts)
//! - JSON catalog persistence
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Pipeline
//!
//! Discovery runs in four phases:
//! - **Scan:** each plugin walks the project and emits [`RawArtifact`]s
//! - **Classify/Extract:** plugins filter and enrich the collected artifacts
//! - **Filter:** artifacts below the confidence threshold are dropped
//! - **Normalize:** survivors become [`CommandDefinition`]s with stable ids
//!
//! ## Example
//!
//! ```rust,no_run
//! use taskscout_core::discovery::create_default_engine;
//! use taskscout_core::Config;
//! use std::path::Path;
//!
//! let config = Config::load().expect("failed to load config");
//! let engine = create_default_engine(&config.discovery);
//!
//! let result = engine.run(Path::new(".")).expect("discovery failed");
//! for cmd in &result.commands {
//!     println!("{} [{}] {}", cmd.id, cmd.origin, cmd.name);
//! }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use discovery::{DiscoveryEngine, DiscoveryResult};
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod types;
