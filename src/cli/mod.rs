//! Command-line interface for merge-conf
//!
//! Provides `dump` and `candidates` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod candidates;
mod dump;
mod utils;

/// Combine multiple configuration sources into a single configuration tree
#[derive(Parser)]
#[command(name = "merge-conf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the given sources and print the resulting configuration
    Dump(dump::DumpArgs),

    /// List candidate configuration file locations for an application
    Candidates(candidates::CandidatesArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Dump(args) => dump::run(args),
        Commands::Candidates(args) => candidates::run(args),
    }
}
