mod execute;
mod output;

use std::path::PathBuf;

use clap::Args;


/// Describe the resolved schema graph
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  graphgen describe ./schema              # Describe every schema in a directory
  graphgen describe schema.json -o json   # Machine-readable description")]
pub struct DescribeCmd {
    /// Schema file, or directory of schema files
    #[arg(value_parser = super::validate_path_exists)]
    pub schema: PathBuf,
}
