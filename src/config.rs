//! Runtime configuration utilities for ppaxe.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Base URL of the CoreNLP server that tags proteins.
    pub corenlp_url: String,
    /// Maximum number of annotation requests in flight.
    pub annotation_concurrency: usize,
    /// Logistic model weights used to score candidates.
    pub model_path: PathBuf,
    /// Contact email for PubMed E-utilities courtesy policy.
    pub pubmed_email: String,
    /// Tool name sent with PubMed requests.
    pub pubmed_tool: String,
    /// Root folder for retrieved articles and models.
    pub data_dir: PathBuf,
    /// Root folder for extraction outputs.
    pub outputs_dir: PathBuf,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let corenlp_url =
            env::var("CORENLP_URL").unwrap_or_else(|_| "http://localhost:9000".to_string());
        let annotation_concurrency = env::var("ANNOTATION_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(4);
        let pubmed_email =
            env::var("PUBMED_EMAIL").unwrap_or_else(|_| "research@example.com".to_string());
        let pubmed_tool = env::var("PUBMED_TOOL").unwrap_or_else(|_| "ppaxe".to_string());
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));
        let model_path = env::var("PPAXE_MODEL")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("model.json"));

        std::fs::create_dir_all(&data_dir).context("creating data dir")?;
        std::fs::create_dir_all(&outputs_dir).context("creating outputs dir")?;

        Ok(Self {
            corenlp_url,
            annotation_concurrency,
            model_path,
            pubmed_email,
            pubmed_tool,
            data_dir,
            outputs_dir,
        })
    }

    /// Convenience helper for derived path segments.
    pub fn join_data<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.data_dir.join(path)
    }

    /// Default location of retrieved article records.
    pub fn articles_path(&self) -> PathBuf {
        self.join_data("raw/articles.jsonl")
    }
}
