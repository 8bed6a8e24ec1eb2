//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - An `Execute` implementation producing a serializable result
//! - An `Outputable` implementation rendering that result as a table

mod describe;
mod generate;
mod tables;

pub use describe::DescribeCmd;
pub use generate::GenerateCmd;
pub use tables::TablesCmd;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use graph::{load_schemas, Config, Graph};
use tracing::info;

use crate::output::{OutputFormat, Outputable};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, config: &Config) -> Result<Self::Output, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Describe the resolved schema graph: fields, edges and relations
    Describe(DescribeCmd),

    /// Show the relational tables derived from the schema graph
    Tables(TablesCmd),

    /// Generate artifacts for the schema graph
    Generate(GenerateCmd),

    /// Catch-all for unknown commands
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, config: &Config, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Describe(cmd) => {
                let result = cmd.execute(config)?;
                Ok(result.format(format))
            }
            Command::Tables(cmd) => {
                let result = cmd.execute(config)?;
                Ok(result.format(format))
            }
            Command::Generate(cmd) => {
                let result = cmd.execute(config)?;
                Ok(result.format(format))
            }
            Command::Unknown(args) => {
                Err(format!("Unknown command: {}", args.first().unwrap_or(&String::new())).into())
            }
        }
    }
}

fn validate_path_exists(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("Schema not found: {}", path.display()))
    }
}

/// Load the schemas under `path` and resolve them with `config`.
fn load_graph(path: &Path, config: &Config) -> Result<Graph, Box<dyn Error>> {
    let schemas = load_schemas(path)?;
    let config = Config {
        schema: path.to_path_buf(),
        ..config.clone()
    };
    let graph = Graph::new(config, schemas)?;
    info!(schema = %path.display(), nodes = graph.nodes.len(), "graph resolved");
    Ok(graph)
}
