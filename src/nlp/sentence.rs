//! Sentence state: text, annotation, and the mentions and candidates derived
//! from it.

use serde::Serialize;

use crate::{
    error::{AnnotationError, ClassifierError, PipelineError, Result},
    nlp::{
        annotation::{AnnotationService, Token},
        candidates::{self, Candidate},
        classifier::{InteractionClassifier, Prediction},
        proteins::{self, ProteinMention},
    },
};

#[derive(Debug, Clone, Serialize)]
pub struct Sentence {
    pub text: String,
    tokens: Option<Vec<Token>>,
    proteins: Option<Vec<ProteinMention>>,
    candidates: Option<Vec<Candidate>>,
}

impl Sentence {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tokens: None,
            proteins: None,
            candidates: None,
        }
    }

    pub fn is_annotated(&self) -> bool {
        self.tokens.is_some()
    }

    pub fn tokens(&self) -> Option<&[Token]> {
        self.tokens.as_deref()
    }

    /// Attach annotator output. Drops mentions and candidates derived from a
    /// previous annotation.
    pub fn set_tokens(&mut self, tokens: Vec<Token>) {
        self.tokens = Some(tokens);
        self.proteins = None;
        self.candidates = None;
    }

    /// Mark the sentence as unannotated.
    pub fn clear_tokens(&mut self) {
        self.tokens = None;
        self.proteins = None;
        self.candidates = None;
    }

    pub async fn annotate(
        &mut self,
        service: &dyn AnnotationService,
    ) -> std::result::Result<(), AnnotationError> {
        match service.annotate(&self.text).await {
            Ok(tokens) => {
                self.set_tokens(tokens);
                Ok(())
            }
            Err(err) => {
                self.clear_tokens();
                Err(err)
            }
        }
    }

    /// Protein mentions, extracted on first use.
    pub fn proteins(&mut self) -> Result<&[ProteinMention]> {
        if self.proteins.is_none() {
            let tokens = self.tokens.as_deref().ok_or(PipelineError::NotAnnotated)?;
            self.proteins = Some(proteins::extract_mentions(tokens)?);
        }
        Ok(self.proteins.as_deref().unwrap_or_default())
    }

    /// Interaction candidates, generated on first use.
    pub fn candidates(&mut self) -> Result<&[Candidate]> {
        if self.candidates.is_none() {
            let generated = candidates::generate(self.proteins()?);
            self.candidates = Some(generated);
        }
        Ok(self.candidates.as_deref().unwrap_or_default())
    }

    /// Mentions already extracted, without triggering extraction.
    pub fn cached_proteins(&self) -> &[ProteinMention] {
        self.proteins.as_deref().unwrap_or_default()
    }

    /// Candidates already generated, without triggering generation.
    pub fn cached_candidates(&self) -> &[Candidate] {
        self.candidates.as_deref().unwrap_or_default()
    }

    /// Compute the feature vector of every candidate.
    pub fn compute_features(&mut self) -> Result<()> {
        self.candidates()?;
        let tokens = self.tokens.as_deref().ok_or(PipelineError::NotAnnotated)?;
        for candidate in self.candidates.iter_mut().flatten() {
            candidate.compute_features(tokens);
        }
        Ok(())
    }

    /// Score every candidate. One outcome per candidate, in candidate order;
    /// a failing candidate does not stop its siblings.
    pub fn score(
        &mut self,
        classifier: &dyn InteractionClassifier,
    ) -> Result<Vec<std::result::Result<Prediction, ClassifierError>>> {
        self.candidates()?;
        let tokens = self.tokens.as_deref().ok_or(PipelineError::NotAnnotated)?;
        Ok(self
            .candidates
            .iter_mut()
            .flatten()
            .map(|candidate| candidate.predict(tokens, classifier))
            .collect())
    }

    /// HTML markup of candidate `idx`, when annotated.
    pub fn candidate_html(&self, idx: usize) -> Option<String> {
        let tokens = self.tokens.as_deref()?;
        self.cached_candidates()
            .get(idx)
            .map(|candidate| candidate.to_html(tokens))
    }
}
