mod execute;
mod output;
mod output_tests;

use std::path::PathBuf;

use clap::Args;

/// Show the relational tables derived from the schema graph
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  graphgen tables ./schema              # Columns, keys and indexes of every table
  graphgen tables schema.json -o json   # Portable table schema as JSON")]
pub struct TablesCmd {
    /// Schema file, or directory of schema files
    #[arg(value_parser = super::validate_path_exists)]
    pub schema: PathBuf,
}
