//! Fixed-schema feature engineering for interaction candidates.
//!
//! Every candidate maps to a vector of [`FEATURE_COUNT`] columns laid out in
//! contiguous bands:
//!
//! | band                         | columns |
//! |------------------------------|---------|
//! | token distance               | 1       |
//! | sentence length              | 1       |
//! | verb features, between       | 12      |
//! | verb features, all           | 12      |
//! | POS counts, between          | 43      |
//! | POS counts, all              | 43      |
//! | protein occurrences, between | 2       |
//! | protein occurrences, all     | 2       |
//! | keyword counts, between      | 62      |
//!
//! The classifier depends on this layout column for column.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    error::ClassifierError,
    nlp::{
        annotation::Token,
        lexicon::{self, INTERACTION_VERBS, POS_TAGS, VERB_TAGS},
        positions::{self, BetweenRange},
        proteins::ProteinMention,
    },
};

/// Columns per verb band: six tag counts, max score, total score, four distances.
pub const VERB_BAND_WIDTH: usize = VERB_TAGS.len() + 2 + 4;

/// Band start columns.
pub mod columns {
    use super::{INTERACTION_VERBS, POS_TAGS, VERB_BAND_WIDTH};

    pub const TOKEN_DISTANCE: usize = 0;
    pub const TOTAL_TOKENS: usize = 1;
    pub const VERBS_BETWEEN: usize = 2;
    pub const VERBS_ALL: usize = VERBS_BETWEEN + VERB_BAND_WIDTH;
    pub const POS_BETWEEN: usize = VERBS_ALL + VERB_BAND_WIDTH;
    pub const POS_ALL: usize = POS_BETWEEN + POS_TAGS.len();
    pub const PROTEINS_BETWEEN: usize = POS_ALL + POS_TAGS.len();
    pub const PROTEINS_ALL: usize = PROTEINS_BETWEEN + 2;
    pub const KEYWORDS_BETWEEN: usize = PROTEINS_ALL + 2;
    pub const END: usize = KEYWORDS_BETWEEN + INTERACTION_VERBS.len();
}

/// Width of the dense feature vector.
pub const FEATURE_COUNT: usize = columns::END;

const _: () = assert!(FEATURE_COUNT == 178);

/// Sparse feature vector: `(column, value)` pairs in ascending column order.
/// Absent columns are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureVector")]
pub struct FeatureVector {
    entries: Vec<(usize, u32)>,
}

#[derive(Deserialize)]
struct RawFeatureVector {
    entries: Vec<(usize, u32)>,
}

impl TryFrom<RawFeatureVector> for FeatureVector {
    type Error = ClassifierError;

    fn try_from(raw: RawFeatureVector) -> Result<Self, Self::Error> {
        Self::from_entries(raw.entries)
    }
}

impl FeatureVector {
    /// Build a vector from stored pairs. Columns must lie inside the schema
    /// and be strictly ascending.
    pub fn from_entries(entries: Vec<(usize, u32)>) -> Result<Self, ClassifierError> {
        if let Some(&(column, _)) = entries.iter().find(|(column, _)| *column >= FEATURE_COUNT) {
            return Err(ClassifierError::InvalidFeatures(format!(
                "column {column} is outside the {FEATURE_COUNT}-column schema"
            )));
        }
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].0 >= pair[1].0) {
            return Err(ClassifierError::InvalidFeatures(format!(
                "column {} follows column {}",
                pair[1].0, pair[0].0
            )));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(usize, u32)] {
        &self.entries
    }

    /// Value of `column`, zero when it is not stored.
    pub fn get(&self, column: usize) -> u32 {
        self.entries
            .binary_search_by_key(&column, |(col, _)| *col)
            .map(|at| self.entries[at].1)
            .unwrap_or(0)
    }

    pub fn contains(&self, column: usize) -> bool {
        self.entries
            .binary_search_by_key(&column, |(col, _)| *col)
            .is_ok()
    }

    /// Number of explicitly stored columns.
    pub fn stored(&self) -> usize {
        self.entries.len()
    }

    pub fn width(&self) -> usize {
        FEATURE_COUNT
    }

    /// Densified vector of width [`FEATURE_COUNT`].
    pub fn to_dense(&self) -> Array1<f64> {
        let mut dense = Array1::zeros(FEATURE_COUNT);
        for &(column, value) in &self.entries {
            dense[column] = f64::from(value);
        }
        dense
    }
}

/// Appends values column by column, dropping zeros unless told otherwise.
#[derive(Debug, Default)]
struct FeatureBuilder {
    cursor: usize,
    entries: Vec<(usize, u32)>,
}

impl FeatureBuilder {
    fn push(&mut self, value: usize) {
        if value != 0 {
            self.entries.push((self.cursor, to_count(value)));
        }
        self.cursor += 1;
    }

    fn push_kept(&mut self, value: usize) {
        self.entries.push((self.cursor, to_count(value)));
        self.cursor += 1;
    }

    fn expect_column(&self, column: usize) {
        debug_assert_eq!(self.cursor, column, "feature band started at wrong column");
    }

    fn finish(self) -> FeatureVector {
        debug_assert_eq!(self.cursor, FEATURE_COUNT);
        FeatureVector {
            entries: self.entries,
        }
    }
}

fn to_count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Compute the feature vector of the candidate `(prot1, prot2)` over the
/// sentence `tokens`. Pure: equal inputs give equal vectors.
pub fn compute(prot1: &ProteinMention, prot2: &ProteinMention, tokens: &[Token]) -> FeatureVector {
    let range = BetweenRange::new(prot1.last(), prot2.first());
    let between = range.padded(tokens);
    let mut builder = FeatureBuilder::default();

    builder.expect_column(columns::TOKEN_DISTANCE);
    builder.push(range.tokens(tokens).len());
    builder.push(tokens.len());

    builder.expect_column(columns::VERBS_BETWEEN);
    verb_features(&mut builder, between, prot1, prot2);
    builder.expect_column(columns::VERBS_ALL);
    verb_features(&mut builder, tokens, prot1, prot2);

    builder.expect_column(columns::POS_BETWEEN);
    pos_counts(&mut builder, between);
    builder.expect_column(columns::POS_ALL);
    pos_counts(&mut builder, tokens);

    builder.expect_column(columns::PROTEINS_BETWEEN);
    protein_counts(&mut builder, between, prot1, prot2);
    builder.expect_column(columns::PROTEINS_ALL);
    protein_counts(&mut builder, tokens, prot1, prot2);

    builder.expect_column(columns::KEYWORDS_BETWEEN);
    keyword_counts(&mut builder, between);

    let vector = builder.finish();
    trace!(
        prot1 = %prot1.symbol,
        prot2 = %prot2.symbol,
        stored = vector.stored(),
        "computed features"
    );
    vector
}

fn verb_features(
    builder: &mut FeatureBuilder,
    scope: &[Token],
    prot1: &ProteinMention,
    prot2: &ProteinMention,
) {
    let mut tag_counts = [0usize; VERB_TAGS.len()];
    let mut max_score = 0u32;
    let mut total_score = 0u32;
    let mut verb_positions = Vec::new();

    for token in scope {
        let Some(slot) = lexicon::verb_tag_slot(&token.pos) else {
            continue;
        };
        tag_counts[slot] += 1;
        verb_positions.push(token.index);
        let score = lexicon::verb_score(&token.lemma);
        total_score += score;
        max_score = max_score.max(score);
    }

    for count in tag_counts {
        builder.push(count);
    }
    builder.push(max_score as usize);
    builder.push(total_score as usize);

    for protein in [prot1, prot2] {
        let (closest, farthest) = positions::verb_distances(&verb_positions, protein.last());
        builder.push(closest);
        builder.push(farthest);
    }
}

fn pos_counts(builder: &mut FeatureBuilder, scope: &[Token]) {
    let mut counts = [0usize; POS_TAGS.len()];
    for token in scope {
        if let Some(slot) = lexicon::pos_slot(&token.pos) {
            counts[slot] += 1;
        }
    }
    for count in counts {
        builder.push(count);
    }
}

fn protein_counts(
    builder: &mut FeatureBuilder,
    scope: &[Token],
    prot1: &ProteinMention,
    prot2: &ProteinMention,
) {
    for protein in [prot1, prot2] {
        let count = scope
            .iter()
            .filter(|token| token.word == protein.symbol)
            .count();
        builder.push_kept(count);
    }
}

fn keyword_counts(builder: &mut FeatureBuilder, scope: &[Token]) {
    let mut counts = [0usize; INTERACTION_VERBS.len()];
    for token in scope {
        if let Some(slot) = lexicon::keyword_slot(&token.lemma) {
            counts[slot] += 1;
        }
    }
    for count in counts {
        builder.push(count);
    }
}

/// Column of a keyword lemma in the between keyword band.
pub fn keyword_column(lemma: &str) -> Option<usize> {
    lexicon::keyword_slot(lemma).map(|slot| columns::KEYWORDS_BETWEEN + slot)
}

/// Column of a POS tag in the between (`all == false`) or sentence-wide band.
pub fn pos_column(tag: &str, all: bool) -> Option<usize> {
    let start = if all {
        columns::POS_ALL
    } else {
        columns::POS_BETWEEN
    };
    lexicon::pos_slot(tag).map(|slot| start + slot)
}
