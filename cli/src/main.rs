use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
pub mod output;
#[cfg(test)]
#[macro_use]
mod test_macros;

use cli::Args;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so table/json output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = cli::load_config(args.config.as_deref())?;
    let output = args.command.run(&config, args.format)?;
    println!("{}", output);
    Ok(())
}
