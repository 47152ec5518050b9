#![allow(dead_code)]

use ppaxe::{
    error::ClassifierError,
    nlp::{features::columns, FeatureVector, InteractionClassifier, NerTag, Token},
};

pub const MAPK_SENTENCE: &str =
    "The protein MAPK interacts directly with cryoglobulin which is very interesting.";
pub const PROT12_SENTENCE: &str = "PROT12 interacts interacts and acetylates PROT1.";

/// Build tokens from `(word, lemma, pos, is_protein)` rows, numbering from 1.
pub fn tokens(rows: &[(&str, &str, &str, bool)]) -> Vec<Token> {
    rows.iter()
        .enumerate()
        .map(|(i, (word, lemma, pos, protein))| {
            let ner = if *protein { NerTag::Protein } else { NerTag::Other };
            Token::new(i + 1, *word, *lemma, *pos, ner)
        })
        .collect()
}

pub fn mapk_tokens() -> Vec<Token> {
    tokens(&[
        ("The", "the", "DT", false),
        ("protein", "protein", "NN", false),
        ("MAPK", "MAPK", "NN", true),
        ("interacts", "interact", "VBZ", false),
        ("directly", "directly", "RB", false),
        ("with", "with", "IN", false),
        ("cryoglobulin", "cryoglobulin", "NN", true),
        ("which", "which", "WDT", false),
        ("is", "be", "VBZ", false),
        ("very", "very", "RB", false),
        ("interesting", "interesting", "JJ", false),
        (".", ".", ".", false),
    ])
}

pub fn prot12_tokens() -> Vec<Token> {
    tokens(&[
        ("PROT12", "PROT12", "NN", true),
        ("interacts", "interact", "VBZ", false),
        ("interacts", "interact", "VBZ", false),
        ("and", "and", "CC", false),
        ("acetylates", "acetylate", "VBZ", false),
        ("PROT1", "PROT1", "NN", true),
        (".", ".", ".", false),
    ])
}

/// Returns the same probability for every candidate.
pub struct FixedClassifier(pub f64);

impl InteractionClassifier for FixedClassifier {
    fn predict_proba(&self, _features: &FeatureVector) -> Result<f64, ClassifierError> {
        Ok(self.0)
    }
}

/// Reports an out-of-range probability for candidates `distance` tokens apart.
pub struct BrokenAtDistance {
    pub distance: u32,
    pub otherwise: f64,
}

impl InteractionClassifier for BrokenAtDistance {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ClassifierError> {
        if features.get(columns::TOKEN_DISTANCE) == self.distance {
            Ok(1.5)
        } else {
            Ok(self.otherwise)
        }
    }
}
