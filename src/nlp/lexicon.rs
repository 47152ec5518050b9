//! Closed lexicon tables shared by every feature computation.
//!
//! The tables are immutable and built once. Call [`init`] during startup so no
//! lazy initialisation races with concurrent feature extraction.

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;

/// Verb part-of-speech tags, in feature column order.
pub const VERB_TAGS: [&str; 6] = ["VB", "VBD", "VBG", "VBN", "VBP", "VBZ"];

/// Penn Treebank tag universe counted by the POS bands.
pub const POS_TAGS: [&str; 43] = [
    "''", ",", "-LRB-", "-RRB-", ".", ":", "CC", "CD", "DT", "EX", "FW", "IN", "JJ", "JJR", "JJS",
    "LS", "MD", "NN", "NNP", "NNPS", "NNS", "PDT", "POS", "PRP", "PRP$", "RB", "RBR", "RBS", "RP",
    "SYM", "TO", "UH", "VB", "VBD", "VBG", "VBN", "VBP", "VBZ", "WDT", "WP", "WP$", "WRB", "``",
];

/// Interaction verb lemmas and their relevance weight.
pub const INTERACTION_VERBS: [(&str, u32); 62] = [
    ("acetylate", 1),
    ("activate", 3),
    ("anchor", 1),
    ("antagonize", 1),
    ("assemble", 1),
    ("associate", 2),
    ("attach", 1),
    ("bind", 2),
    ("block", 2),
    ("bridge", 1),
    ("catalyze", 1),
    ("cleave", 1),
    ("coimmunoprecipitate", 3),
    ("colocalize", 2),
    ("complex", 2),
    ("conjugate", 1),
    ("contact", 1),
    ("control", 1),
    ("cooperate", 2),
    ("couple", 1),
    ("deacetylate", 1),
    ("degrade", 1),
    ("demethylate", 1),
    ("dephosphorylate", 1),
    ("destabilize", 1),
    ("dimerize", 2),
    ("dissociate", 1),
    ("downregulate", 2),
    ("enhance", 1),
    ("glycosylate", 1),
    ("heterodimerize", 2),
    ("hydrolyze", 1),
    ("inactivate", 2),
    ("induce", 1),
    ("inhibit", 3),
    ("interact", 4),
    ("link", 1),
    ("mediate", 1),
    ("methylate", 1),
    ("modulate", 2),
    ("neddylate", 1),
    ("oligomerize", 1),
    ("phosphorylate", 1),
    ("potentiate", 1),
    ("precipitate", 1),
    ("promote", 1),
    ("recognize", 1),
    ("recruit", 2),
    ("regulate", 2),
    ("repress", 2),
    ("sequester", 1),
    ("stabilize", 1),
    ("stimulate", 2),
    ("sumoylate", 1),
    ("suppress", 2),
    ("target", 1),
    ("tether", 1),
    ("transactivate", 2),
    ("translocate", 1),
    ("ubiquitinate", 1),
    ("ubiquitylate", 1),
    ("upregulate", 2),
];

static VERB_SCORES: Lazy<IndexMap<&'static str, u32>> = Lazy::new(|| {
    let mut table: IndexMap<&'static str, u32> = INTERACTION_VERBS.iter().copied().collect();
    table.sort_keys();
    table
});

static POS_UNIVERSE: Lazy<IndexSet<&'static str>> = Lazy::new(|| {
    let mut tags: IndexSet<&'static str> = POS_TAGS.iter().copied().collect();
    tags.sort();
    tags
});

/// Force construction of every lexicon table.
pub fn init() {
    Lazy::force(&VERB_SCORES);
    Lazy::force(&POS_UNIVERSE);
    tracing::debug!(
        verbs = VERB_SCORES.len(),
        pos_tags = POS_UNIVERSE.len(),
        "lexicon tables ready"
    );
}

/// Slot of a verb tag within [`VERB_TAGS`], `None` for non-verbs.
pub fn verb_tag_slot(pos: &str) -> Option<usize> {
    VERB_TAGS.iter().position(|tag| *tag == pos)
}

/// Interaction relevance of a lemma; unknown lemmas score 0.
pub fn verb_score(lemma: &str) -> u32 {
    VERB_SCORES.get(lemma).copied().unwrap_or(0)
}

/// Alphabetical column offset of a lexicon lemma within the keyword band.
pub fn keyword_slot(lemma: &str) -> Option<usize> {
    VERB_SCORES.get_index_of(lemma)
}

/// Alphabetical column offset of a POS tag within a POS band.
pub fn pos_slot(tag: &str) -> Option<usize> {
    POS_UNIVERSE.get_index_of(tag)
}

/// Lexicon lemmas in column order.
pub fn keywords() -> impl Iterator<Item = &'static str> {
    VERB_SCORES.keys().copied()
}

/// POS tags in column order.
pub fn pos_tags() -> impl Iterator<Item = &'static str> {
    POS_UNIVERSE.iter().copied()
}
