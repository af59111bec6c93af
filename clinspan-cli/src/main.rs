//! clinspan command-line entry point

use clap::Parser;
use clinspan_cli::commands::Commands;

/// Annotate clinical notes with conditions, demographics and vital signs
#[derive(Debug, Parser)]
#[command(name = "clinspan", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.command.execute()
}
