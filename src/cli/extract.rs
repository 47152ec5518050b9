//! CLI entry-point for interaction extraction.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::{
    config::Settings,
    data::pubmed::{self, ArticleRecord},
    nlp::{
        AnnotationService, CoreNlpClient, InteractionClassifier, LogisticClassifier, Pipeline,
        StaticAnnotator,
    },
    summary::ReportSummary,
};

/// Args for the `extract` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// JSONL article records, a `.txt` article, or a directory of either.
    /// Defaults to DATA_DIR/raw/articles.jsonl.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Precomputed annotations (sentence -> tokens JSON) used instead of CoreNLP.
    #[arg(long)]
    pub annotations: Option<PathBuf>,
    /// Logistic model weights; overrides PPAXE_MODEL.
    #[arg(long)]
    pub model: Option<PathBuf>,
    /// Maximum concurrent annotation requests; overrides ANNOTATION_CONCURRENCY.
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Output directory; overrides OUTPUTS_DIR.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let input = args.input.clone().unwrap_or_else(|| settings.articles_path());
    let records = load_input(&input)?;
    if records.is_empty() {
        warn!(input = %input.display(), "no articles to analyse");
        return Ok(());
    }

    let annotator: Arc<dyn AnnotationService> = match &args.annotations {
        Some(path) => Arc::new(StaticAnnotator::from_path(path)?),
        None => Arc::new(
            CoreNlpClient::new(settings.corenlp_url.clone()).context("build CoreNLP client")?,
        ),
    };
    let model_path = args.model.clone().unwrap_or_else(|| settings.model_path.clone());
    let classifier: Arc<dyn InteractionClassifier> = Arc::new(
        LogisticClassifier::from_path(&model_path)
            .with_context(|| format!("load model {}", model_path.display()))?,
    );
    let concurrency = args
        .concurrency
        .unwrap_or(settings.annotation_concurrency);

    let pipeline = Pipeline::new(annotator, classifier, concurrency);
    let outcome = pipeline.analyze_batch(&records).await;
    for failure in &outcome.failures {
        warn!(
            pmid = %failure.pmid,
            sentence = failure.sentence_index,
            candidate = ?failure.candidate_index,
            kind = ?failure.kind,
            message = %failure.message,
            "item failed"
        );
    }

    let summary = ReportSummary::build(&outcome.articles);
    let out_dir = args.output.clone().unwrap_or_else(|| settings.outputs_dir.clone());
    summary.write(&out_dir)?;
    info!(
        articles = summary.total_articles,
        proteins = summary.total_proteins,
        interactions = summary.total_interactions,
        unique = summary.unique_interactions,
        failures = outcome.failures.len(),
        "extraction finished"
    );
    Ok(())
}

/// Collect article records from a file or a directory tree.
pub fn load_input(path: &Path) -> Result<Vec<ArticleRecord>> {
    if path.is_dir() {
        let mut records = Vec::new();
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walk {}", path.display()))?;
            if entry.file_type().is_file() {
                records.extend(load_file(entry.path())?);
            }
        }
        return Ok(records);
    }
    load_file(path)
}

fn load_file(path: &Path) -> Result<Vec<ArticleRecord>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("jsonl") => pubmed::load_records(path),
        Some("txt") => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read {}", path.display()))?;
            let pmid = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("unknown")
                .to_string();
            Ok(vec![ArticleRecord {
                pmid,
                fulltext: Some(text),
                ..ArticleRecord::default()
            }])
        }
        _ => Ok(Vec::new()),
    }
}
