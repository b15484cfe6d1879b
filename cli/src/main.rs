#![deny(missing_docs)]

//! # hsds-apigen
//!
//! Command Line Interface for the HSDS client generator.
//!
//! Supported Commands:
//! - `generate`: Pipeline fetch -> patch -> parse -> emit client sources.

use clap::{Parser, Subcommand};

use crate::error::CliResult;

mod error;
mod fetch;
mod generate;

#[derive(Parser, Debug)]
#[clap(author, version, about = "HSDS API client generator")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch and correct the upstream OpenAPI document, then emit clients.
    Generate(generate::GenerateArgs),
}

fn main() -> CliResult<()> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate(args) => generate::execute(args)?,
    }

    Ok(())
}
