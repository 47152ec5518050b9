//! Corpus-level aggregation of extracted proteins and interactions.

use std::{
    cmp::Ordering,
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::nlp::AnalyzedArticle;

/// Mention and interaction counts for one normalized protein symbol.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProteinStats {
    pub total_count: usize,
    /// Mentions per PMID.
    pub article_counts: IndexMap<String, usize>,
    /// Positive interactions with the protein on the left.
    pub left_count: usize,
    /// Positive interactions with the protein on the right.
    pub right_count: usize,
}

impl ProteinStats {
    pub fn interaction_count(&self) -> usize {
        self.left_count + self.right_count
    }
}

/// Sort key for [`ProteinSummary::sorted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProteinSort {
    TotalCount,
    InteractionCount,
    Left,
    Right,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProteinSummary {
    pub proteins: IndexMap<String, ProteinStats>,
}

impl ProteinSummary {
    pub fn build(articles: &[AnalyzedArticle]) -> Self {
        let mut proteins: IndexMap<String, ProteinStats> = IndexMap::new();
        for article in articles {
            for sentence in &article.sentences {
                for mention in sentence.cached_proteins() {
                    let stats = proteins.entry(mention.normalized_symbol()).or_default();
                    stats.total_count += 1;
                    *stats.article_counts.entry(article.pmid.clone()).or_default() += 1;
                }
                for candidate in sentence.cached_candidates() {
                    if candidate.label() != Some(true) {
                        continue;
                    }
                    proteins
                        .entry(candidate.prot1.normalized_symbol())
                        .or_default()
                        .left_count += 1;
                    proteins
                        .entry(candidate.prot2.normalized_symbol())
                        .or_default()
                        .right_count += 1;
                }
            }
        }
        Self { proteins }
    }

    pub fn len(&self) -> usize {
        self.proteins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proteins.is_empty()
    }

    /// Proteins ordered by `key`, largest first. Total count ties fall back
    /// to the interaction count.
    pub fn sorted(&self, key: ProteinSort) -> Vec<(&str, &ProteinStats)> {
        let mut rows: Vec<_> = self
            .proteins
            .iter()
            .map(|(symbol, stats)| (symbol.as_str(), stats))
            .collect();
        rows.sort_by(|a, b| {
            let (x, y) = (a.1, b.1);
            match key {
                ProteinSort::TotalCount => (y.total_count, y.interaction_count())
                    .cmp(&(x.total_count, x.interaction_count())),
                ProteinSort::InteractionCount => y.interaction_count().cmp(&x.interaction_count()),
                ProteinSort::Left => y.left_count.cmp(&x.left_count),
                ProteinSort::Right => y.right_count.cmp(&x.right_count),
            }
        });
        rows
    }
}

/// One positive interaction with its evidence sentence.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionRow {
    pub confidence: f64,
    pub prot1: String,
    pub prot2: String,
    pub prot1_normalized: String,
    pub prot2_normalized: String,
    pub pmid: String,
    pub sentence_html: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InteractionSummary {
    pub interactions: Vec<InteractionRow>,
    pub unique_interactions: usize,
}

impl InteractionSummary {
    pub fn build(articles: &[AnalyzedArticle]) -> Self {
        let mut interactions = Vec::new();
        let mut unique: BTreeSet<(String, String)> = BTreeSet::new();
        for article in articles {
            for sentence in &article.sentences {
                let Some(tokens) = sentence.tokens() else {
                    continue;
                };
                for candidate in sentence.cached_candidates() {
                    let Some(prediction) = candidate.prediction() else {
                        continue;
                    };
                    if !prediction.label {
                        continue;
                    }
                    let left = candidate.prot1.normalized_symbol();
                    let right = candidate.prot2.normalized_symbol();
                    let pair = if left <= right {
                        (left.clone(), right.clone())
                    } else {
                        (right.clone(), left.clone())
                    };
                    unique.insert(pair);
                    interactions.push(InteractionRow {
                        confidence: prediction.confidence,
                        prot1: candidate.prot1.symbol.clone(),
                        prot2: candidate.prot2.symbol.clone(),
                        prot1_normalized: left,
                        prot2_normalized: right,
                        pmid: article.pmid.clone(),
                        sentence_html: candidate.to_html(tokens),
                    });
                }
            }
        }
        interactions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });
        Self {
            interactions,
            unique_interactions: unique.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.interactions.len()
    }
}

/// Totals and tables for one analysed corpus.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub generated_at: DateTime<Utc>,
    pub total_articles: usize,
    pub total_proteins: usize,
    pub total_interactions: usize,
    pub unique_interactions: usize,
    pub proteins: ProteinSummary,
    pub interactions: InteractionSummary,
}

impl ReportSummary {
    pub fn build(articles: &[AnalyzedArticle]) -> Self {
        let proteins = ProteinSummary::build(articles);
        let interactions = InteractionSummary::build(articles);
        Self {
            generated_at: Utc::now(),
            total_articles: articles.len(),
            total_proteins: proteins.len(),
            total_interactions: interactions.total(),
            unique_interactions: interactions.unique_interactions,
            proteins,
            interactions,
        }
    }

    /// Write `summary.json` and `interactions.csv` into `dir`.
    pub fn write(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(dir).with_context(|| format!("create {dir:?}"))?;

        let json_path = dir.join("summary.json");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&json_path, json).with_context(|| format!("write {json_path:?}"))?;

        let csv_path = dir.join("interactions.csv");
        let mut writer =
            csv::Writer::from_path(&csv_path).with_context(|| format!("create {csv_path:?}"))?;
        for row in &self.interactions.interactions {
            writer.serialize(row)?;
        }
        writer.flush()?;

        info!(
            json = %json_path.display(),
            csv = %csv_path.display(),
            interactions = self.total_interactions,
            "wrote summary"
        );
        Ok((json_path, csv_path))
    }
}
