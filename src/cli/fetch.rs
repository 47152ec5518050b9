//! CLI entry-point for fetching articles from NCBI.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use futures::stream::{self, StreamExt};
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::{
    config::Settings,
    data::pubmed::{self, Database, QueryOutcome},
};

/// Args for the `fetch` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Comma separated list of PubMed ids.
    #[arg(long, value_delimiter = ',', required = true)]
    pub ids: Vec<String>,
    /// Source database.
    #[arg(long, value_enum, default_value = "pmc")]
    pub database: Database,
    /// Output JSONL path (defaults to DATA_DIR/raw/articles.jsonl).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let concurrency = 2usize;
    let database = args.database;
    let outcomes: Vec<QueryOutcome> = stream::iter(args.ids.chunks(100).map(<[String]>::to_vec))
        .map(|chunk| {
            let settings = settings.clone();
            async move {
                info!(ids = chunk.len(), ?database, "fetching articles");
                let outcome = pubmed::fetch_articles(&chunk, database, &settings)
                    .await
                    .with_context(|| format!("fetch {} ids from {database:?}", chunk.len()))?;
                sleep(Duration::from_millis(350)).await; // be nice to E-utilities
                Ok::<_, anyhow::Error>(outcome)
            }
        })
        .buffer_unordered(concurrency)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let mut articles = Vec::new();
    let mut not_found = Vec::new();
    for outcome in outcomes {
        articles.extend(outcome.articles);
        not_found.extend(outcome.not_found);
    }
    if !not_found.is_empty() {
        warn!(count = not_found.len(), ids = ?not_found, "articles not found");
    }

    let path = args.output.unwrap_or_else(|| settings.articles_path());
    pubmed::persist_records(&path, &articles)
        .with_context(|| format!("save article records to {}", path.display()))?;
    Ok(())
}
