//! Command-line interface wiring for ppaxe.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod extract;
pub mod fetch;
pub mod segment;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Protein-protein interaction extraction from biomedical articles",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Fetch(args) => fetch::run(args, settings).await,
            Commands::Segment(args) => segment::run(args).await,
            Commands::Extract(args) => extract::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download article text from PubMed Central or PubMed.
    Fetch(fetch::Args),
    /// Split a text file into sentences, one per line.
    Segment(segment::Args),
    /// Extract and score interaction candidates from stored articles.
    Extract(extract::Args),
}
