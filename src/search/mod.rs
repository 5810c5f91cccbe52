//! Semantic search core
//!
//! Encoder → VectorStore → exact flat L2 search.

pub mod embedding;
pub mod engine;
pub mod error;
pub mod index;
pub mod store;

pub use embedding::{Encoder, HtpEncoder};
pub use engine::{IndexingStats, QueryEngine};
pub use error::{EncoderError, SearchError};
pub use index::{FlatL2Index, QueryResult};
pub use store::{CorpusItem, CorpusSnapshot, VectorStore};
