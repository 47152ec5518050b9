//! Batch orchestration: segment, annotate, extract, and score articles.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::{
    data::pubmed::ArticleRecord,
    nlp::{
        annotation::AnnotationService, classifier::InteractionClassifier, lexicon, segmenter,
        sentence::Sentence,
    },
};

/// An article after the pipeline ran over it.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedArticle {
    pub pmid: String,
    pub sentences: Vec<Sentence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Annotation,
    Mention,
    Classifier,
}

/// One item that could not be processed. Its siblings are unaffected.
#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    pub pmid: String,
    pub sentence_index: usize,
    pub candidate_index: Option<usize>,
    pub kind: FailureKind,
    pub message: String,
}

/// Partial results of a batch plus everything that failed along the way.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub articles: Vec<AnalyzedArticle>,
    pub failures: Vec<ItemFailure>,
}

impl BatchOutcome {
    pub fn candidate_count(&self) -> usize {
        self.articles
            .iter()
            .flat_map(|article| &article.sentences)
            .map(|sentence| sentence.cached_candidates().len())
            .sum()
    }
}

/// Extraction pipeline wired to its annotation and classification services.
#[derive(Clone)]
pub struct Pipeline {
    annotator: Arc<dyn AnnotationService>,
    classifier: Arc<dyn InteractionClassifier>,
    permits: Arc<Semaphore>,
    concurrency: usize,
}

impl Pipeline {
    /// `concurrency` bounds in-flight annotation calls across all articles.
    pub fn new(
        annotator: Arc<dyn AnnotationService>,
        classifier: Arc<dyn InteractionClassifier>,
        concurrency: usize,
    ) -> Self {
        lexicon::init();
        let concurrency = concurrency.max(1);
        Self {
            annotator,
            classifier,
            permits: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    /// Run every article, keeping input order.
    #[instrument(skip_all, fields(articles = records.len()))]
    pub async fn analyze_batch(&self, records: &[ArticleRecord]) -> BatchOutcome {
        let results: Vec<_> = stream::iter(records)
            .map(|record| self.analyze_article(record))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut outcome = BatchOutcome::default();
        for (article, failures) in results {
            outcome.articles.push(article);
            outcome.failures.extend(failures);
        }
        info!(
            articles = outcome.articles.len(),
            candidates = outcome.candidate_count(),
            failures = outcome.failures.len(),
            "batch analysed"
        );
        outcome
    }

    /// Run one article. Failed sentences stay in the result unannotated.
    pub async fn analyze_article(
        &self,
        record: &ArticleRecord,
    ) -> (AnalyzedArticle, Vec<ItemFailure>) {
        let pmid = record.pmid.clone();
        let mut sentences: Vec<Sentence> = segmenter::segment(record.text().unwrap_or_default())
            .into_iter()
            .map(Sentence::new)
            .collect();
        debug!(%pmid, sentences = sentences.len(), "segmented article");

        let annotations: Vec<_> = stream::iter(sentences.iter().map(|s| s.text.clone()).enumerate())
            .map(|(idx, text)| async move {
                // the semaphore is never closed
                let _permit = self.permits.acquire().await.ok();
                (idx, self.annotator.annotate(&text).await)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut failures = Vec::new();
        for (idx, result) in annotations {
            match result {
                Ok(tokens) => sentences[idx].set_tokens(tokens),
                Err(err) => {
                    warn!(%pmid, sentence = idx, error = %err, "annotation failed");
                    sentences[idx].clear_tokens();
                    failures.push(ItemFailure {
                        pmid: pmid.clone(),
                        sentence_index: idx,
                        candidate_index: None,
                        kind: FailureKind::Annotation,
                        message: err.to_string(),
                    });
                }
            }
        }

        for (idx, sentence) in sentences.iter_mut().enumerate() {
            if !sentence.is_annotated() {
                continue;
            }
            let outcomes = match sentence.score(self.classifier.as_ref()) {
                Ok(outcomes) => outcomes,
                Err(err) => {
                    warn!(%pmid, sentence = idx, error = %err, "candidate extraction failed");
                    failures.push(ItemFailure {
                        pmid: pmid.clone(),
                        sentence_index: idx,
                        candidate_index: None,
                        kind: FailureKind::Mention,
                        message: err.to_string(),
                    });
                    continue;
                }
            };
            for (candidate_idx, outcome) in outcomes.into_iter().enumerate() {
                if let Err(err) = outcome {
                    warn!(%pmid, sentence = idx, candidate = candidate_idx, error = %err, "scoring failed");
                    failures.push(ItemFailure {
                        pmid: pmid.clone(),
                        sentence_index: idx,
                        candidate_index: Some(candidate_idx),
                        kind: FailureKind::Classifier,
                        message: err.to_string(),
                    });
                }
            }
        }

        (AnalyzedArticle { pmid, sentences }, failures)
    }
}
