//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and configuration
//! lookup. Individual command definitions are in the `commands` module.

use std::path::{Path, PathBuf};

use clap::Parser;
use graph::{Config, ConfigFile, ConfigFileError, CONFIG_FILE};
use tracing::debug;

use crate::commands::Command;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "graphgen", author, version, about, long_about = None)]
pub struct Args {
    /// Path to the graphgen configuration file
    ///
    /// If not specified, searches for configuration in:
    ///   1. ./.graphgen.json (project-local)
    ///   2. ~/.graphgen.json (user-global)
    /// and falls back to the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Resolve the configuration file by checking multiple locations in order of
/// preference. `None` means no file exists.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    // An explicit path is used even if missing, so the read error surfaces
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    if let Some(home_dir) = home::home_dir() {
        let global = home_dir.join(CONFIG_FILE);
        if global.exists() {
            return Some(global);
        }
    }

    None
}

/// Load the configuration, or the defaults when no file is found.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config, ConfigFileError> {
    match resolve_config_path(explicit_path) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            Ok(ConfigFile::load(&path)?.into_config())
        }
        None => Ok(Config::default()),
    }
}
