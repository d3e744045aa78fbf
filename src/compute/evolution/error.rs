//! Error types for the search core.

use std::io;

use crate::compute::problems::ProblemError;
use crate::schema::{ConfigError, DescriptorError};

/// Errors raised while building or running a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Evaluation info is missing descriptor field '{0}'")]
    MissingDescriptorField(String),
    #[error("Chromosome must be evaluated before it can be placed")]
    NotEvaluated,
    #[error("Evaluation failed: {0}")]
    Evaluation(String),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid descriptor space: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("Snapshot export failed: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl From<ProblemError> for SearchError {
    fn from(err: ProblemError) -> Self {
        match err {
            ProblemError::MissingField(field) => SearchError::MissingDescriptorField(field),
            ProblemError::Evaluation(msg) => SearchError::Evaluation(msg),
        }
    }
}

/// Errors raised by snapshot sinks.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
