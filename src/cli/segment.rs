//! CLI entry-point for sentence segmentation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::nlp::segmenter;

/// Args for the `segment` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Plain-text file to split.
    #[arg(long)]
    pub input: PathBuf,
}

#[instrument]
pub async fn run(args: Args) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("read {}", args.input.display()))?;
    let sentences = segmenter::segment(&text);
    info!(count = sentences.len(), "segmented input");
    for sentence in sentences {
        println!("{sentence}");
    }
    Ok(())
}
