//! scent-search library
//!
//! Semantic nearest-neighbor search over short text descriptions.
//!
//! # Modules
//!
//! - `search`: encoder contract, vector store, exact k-NN search, query engine
//! - `core`: configuration and sensor log ingestion

pub mod core;
pub mod search;

// Re-exports for convenience
pub use crate::core::config::ScentConfig;
pub use search::embedding::{Encoder, HtpEncoder};
pub use search::engine::{IndexingStats, QueryEngine};
pub use search::error::{EncoderError, SearchError};
pub use search::index::{FlatL2Index, QueryResult};
pub use search::store::VectorStore;
