//! Resource Unavailability Sync CLI
//!
//! A command-line tool that converges a local scheduling API instance
//! toward the master instance's unavailability records.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Resource Unavailability Sync CLI
#[derive(Parser)]
#[command(name = "usync")]
#[command(author, version, about = "CLI for Resource Unavailability Sync", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a full synchronization pass
    Run {
        /// Compute the plan without applying any mutations
        #[arg(long)]
        dry_run: bool,
    },

    /// Match local resources against master without syncing
    Match,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so tables and JSON stay clean on stdout
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = config::Settings::load()?;

    match cli.command {
        Commands::Run { dry_run } => commands::run::execute(&settings, dry_run, cli.format).await?,
        Commands::Match => commands::matching::execute(&settings, cli.format).await?,
    }

    Ok(())
}
