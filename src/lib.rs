//! ppaxe: protein-protein interaction candidate extraction and scoring.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod nlp;
pub mod summary;
