//! Protein mention recovery from NER-tagged token streams.

use serde::{Deserialize, Serialize};

use crate::{
    error::{PipelineError, Result},
    nlp::{annotation::Token, positions},
};

/// A contiguous run of protein-tagged tokens within one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProteinMention {
    /// Surface text: token words joined by single spaces.
    pub symbol: String,
    /// 1-based token indices, strictly increasing by one.
    pub positions: Vec<usize>,
}

impl ProteinMention {
    /// Build a mention from annotator indices, resolving its words in `tokens`.
    ///
    /// Gapped or empty position lists mean the annotator broke its contract
    /// and are reported as defects.
    pub fn from_positions(positions: Vec<usize>, tokens: &[Token]) -> Result<Self> {
        let contiguous = !positions.is_empty() && positions.windows(2).all(|w| w[1] == w[0] + 1);
        if !contiguous {
            return Err(PipelineError::NonContiguousMention(positions));
        }
        let words = positions
            .iter()
            .map(|&index| {
                positions::token_at(tokens, index)
                    .map(|token| token.word.as_str())
                    .ok_or(PipelineError::PositionOutOfRange(index))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            symbol: words.join(" "),
            positions,
        })
    }

    pub fn first(&self) -> usize {
        self.positions[0]
    }

    pub fn last(&self) -> usize {
        self.positions[self.positions.len() - 1]
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.first()..=self.last()).contains(&index)
    }

    /// Upper-cased symbol used as the aggregation key.
    pub fn normalized_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }
}

impl std::fmt::Display for ProteinMention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let positions: Vec<String> = self.positions.iter().map(|p| p.to_string()).collect();
        write!(f, "{} found in positions {}", self.symbol, positions.join(":"))
    }
}

/// Position lists of every maximal run of consecutive protein tokens.
pub fn extract_spans(tokens: &[Token]) -> Vec<Vec<usize>> {
    let mut spans: Vec<Vec<usize>> = Vec::new();
    let mut inside = false;
    for token in tokens {
        if token.is_protein() {
            if !inside {
                spans.push(Vec::new());
                inside = true;
            }
            if let Some(current) = spans.last_mut() {
                current.push(token.index);
            }
        } else {
            inside = false;
        }
    }
    spans
}

/// Protein mentions of one annotated sentence, in sentence order.
pub fn extract_mentions(tokens: &[Token]) -> Result<Vec<ProteinMention>> {
    extract_spans(tokens)
        .into_iter()
        .map(|positions| ProteinMention::from_positions(positions, tokens))
        .collect()
}
