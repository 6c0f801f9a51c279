mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use commands::{run_classify, run_decompose, run_resolve};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decompose(args) => {
            run_decompose(args)?;
        }
        Commands::Resolve(args) => {
            run_resolve(args)?;
        }
        Commands::Classify(args) => {
            run_classify(args)?;
        }
    }

    Ok(())
}
