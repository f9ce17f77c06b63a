mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::RunCommand;

/// Conflux CLI - catalog-driven join job runner
#[derive(Debug, Parser)]
#[command(name = "conflux", version, about = "Catalog-driven join job runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute a job definition
    Run(RunCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Run(cmd) => cmd.execute()?,
    };

    std::process::exit(exit_code);
}
