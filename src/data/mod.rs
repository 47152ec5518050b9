//! Article retrieval and persistence layer.

pub mod pubmed;
