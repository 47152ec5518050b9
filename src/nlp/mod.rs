//! Natural language processing core: from article text to scored
//! protein-protein interaction candidates.

pub mod annotation;
pub mod candidates;
pub mod classifier;
pub mod features;
pub mod lexicon;
pub mod pipeline;
pub mod positions;
pub mod proteins;
pub mod segmenter;
pub mod sentence;

pub use annotation::{AnnotationService, CoreNlpClient, NerTag, StaticAnnotator, Token};
pub use candidates::Candidate;
pub use classifier::{InteractionClassifier, LogisticClassifier, Prediction};
pub use features::{FeatureVector, FEATURE_COUNT};
pub use pipeline::{AnalyzedArticle, BatchOutcome, ItemFailure, Pipeline};
pub use proteins::ProteinMention;
pub use sentence::Sentence;
