//! Pairwise interaction candidates within one sentence.

use quick_xml::escape::escape;
use serde::Serialize;

use crate::{
    error::ClassifierError,
    nlp::{
        annotation::Token,
        classifier::{self, InteractionClassifier, Prediction},
        features::{self, FeatureVector},
        positions::BetweenRange,
        proteins::ProteinMention,
    },
};

/// Ordered protein pair; `prot1` occurs before `prot2` in the sentence.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub prot1: ProteinMention,
    pub prot2: ProteinMention,
    features: Option<FeatureVector>,
    prediction: Option<Prediction>,
}

impl Candidate {
    /// Pair two mentions, placing the earlier one first.
    pub fn new(a: ProteinMention, b: ProteinMention) -> Self {
        let (prot1, prot2) = if a.first() <= b.first() { (a, b) } else { (b, a) };
        Self {
            prot1,
            prot2,
            features: None,
            prediction: None,
        }
    }

    pub fn between_range(&self) -> BetweenRange {
        BetweenRange::new(self.prot1.last(), self.prot2.first())
    }

    pub fn features(&self) -> Option<&FeatureVector> {
        self.features.as_ref()
    }

    pub fn prediction(&self) -> Option<Prediction> {
        self.prediction
    }

    pub fn label(&self) -> Option<bool> {
        self.prediction.map(|p| p.label)
    }

    pub fn confidence(&self) -> Option<f64> {
        self.prediction.map(|p| p.confidence)
    }

    /// Feature vector over the owning sentence's tokens, computed once.
    pub fn compute_features(&mut self, tokens: &[Token]) -> &FeatureVector {
        let (prot1, prot2) = (&self.prot1, &self.prot2);
        self.features
            .get_or_insert_with(|| features::compute(prot1, prot2, tokens))
    }

    /// Score the candidate, computing features first when needed. The first
    /// successful prediction is kept.
    pub fn predict(
        &mut self,
        tokens: &[Token],
        classifier: &dyn InteractionClassifier,
    ) -> Result<Prediction, ClassifierError> {
        if let Some(prediction) = self.prediction {
            return Ok(prediction);
        }
        let features = self.compute_features(tokens);
        let probability = classifier.predict_proba(features)?;
        let prediction = classifier::normalize(probability)?;
        self.prediction = Some(prediction);
        Ok(prediction)
    }

    /// Sentence markup with both mentions and every verb highlighted.
    pub fn to_html(&self, tokens: &[Token]) -> String {
        let mut pieces: Vec<String> = Vec::with_capacity(tokens.len());
        let mut open: Vec<&str> = Vec::new();
        for token in tokens {
            let in_mention = self.prot1.contains(token.index) || self.prot2.contains(token.index);
            if in_mention {
                open.push(&token.word);
                let closes = token.index == self.prot1.last() || token.index == self.prot2.last();
                if closes {
                    pieces.push(format!(
                        "<span class=\"prot\"> {} </span>",
                        escape(&open.join(" "))
                    ));
                    open.clear();
                }
            } else if token.is_verb() {
                pieces.push(format!(
                    "<span class=\"verb\">{}</span>",
                    escape(&token.word)
                ));
            } else {
                pieces.push(escape(&token.word).into_owned());
            }
        }
        pieces.join(" ")
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] may interact with [{}]",
            self.prot1.symbol, self.prot2.symbol
        )
    }
}

/// One candidate per unordered pair of mentions, in combination order.
pub fn generate(mentions: &[ProteinMention]) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for (i, first) in mentions.iter().enumerate() {
        for second in &mentions[i + 1..] {
            candidates.push(Candidate::new(first.clone(), second.clone()));
        }
    }
    candidates
}
