//! Error kinds reported by the search core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Failure raised by an embedding backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncoderError {
    #[error("nothing to encode: input has no tokens")]
    EmptyInput,

    #[error("invalid encoder configuration: {0}")]
    InvalidConfig(String),

    #[error("encoder failure: {0}")]
    Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// Search before any successful build, or a build with zero items
    #[error("corpus is empty: index at least one description first")]
    EmptyCorpus,

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Encoder(#[from] EncoderError),
}
