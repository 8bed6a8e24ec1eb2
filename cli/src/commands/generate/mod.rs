mod cli_tests;
mod execute;
mod output;

use std::path::PathBuf;

use clap::Args;

/// Generate artifacts for the schema graph
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  graphgen generate ./schema                  # Write into the configured target
  graphgen generate ./schema --target out     # Override the target directory")]
pub struct GenerateCmd {
    /// Schema file, or directory of schema files
    #[arg(value_parser = super::validate_path_exists)]
    pub schema: PathBuf,

    /// Directory to write the generated files into (defaults to the configured target)
    #[arg(long)]
    pub target: Option<PathBuf>,
}
