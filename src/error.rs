//! Typed failures surfaced by the extraction pipeline.

use thiserror::Error;

/// Failure of the external annotation service for one sentence.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("annotation transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("annotation service returned status {status}")]
    Status { status: u16 },

    #[error("malformed annotation response: {0}")]
    Malformed(String),

    #[error("annotation payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no annotation available for sentence: {0}")]
    Missing(String),
}

/// Failure of the interaction classifier for one candidate.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("feature schema mismatch: expected {expected} columns, model has {found}")]
    Schema { expected: usize, found: usize },

    #[error("classifier returned probability {0} outside [0, 1]")]
    OutOfRange(f64),

    #[error("classifier model could not be loaded: {0}")]
    Load(String),

    #[error("invalid feature vector: {0}")]
    InvalidFeatures(String),
}

/// Defects and per-item failures of the core pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("protein mention positions {0:?} are not contiguous")]
    NonContiguousMention(Vec<usize>),

    #[error("protein mention position {0} is outside the sentence")]
    PositionOutOfRange(usize),

    #[error("sentence has not been annotated")]
    NotAnnotated,

    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Failure while retrieving articles from PubMed or PMC.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("request to {service} failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} answered with status {status}")]
    Status { service: &'static str, status: u16 },

    #[error("could not decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
