//! In-memory vector store
//!
//! The corpus lives in an immutable [`CorpusSnapshot`]: descriptions plus one
//! flat arena of `n * d` floats addressed by item id. A build constructs a new
//! snapshot off to the side and publishes it with a single atomic swap, so a
//! concurrent reader sees either the old corpus or the new one, never a mix.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};

use super::error::{Result, SearchError};

/// Borrowed view of one stored item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusItem<'a> {
    pub id: usize,
    pub description: &'a str,
    pub vector: &'a [f32],
}

/// One fully built corpus
#[derive(Debug)]
pub struct CorpusSnapshot {
    descriptions: Vec<String>,
    /// Row-major, `dimension` floats per item
    vectors: Vec<f32>,
    dimension: usize,
    built_at: DateTime<Utc>,
}

impl CorpusSnapshot {
    fn new(descriptions: Vec<String>, vectors: &[Vec<f32>]) -> Result<Self> {
        if descriptions.len() != vectors.len() {
            return Err(SearchError::InvalidArgument(format!(
                "{} descriptions but {} vectors",
                descriptions.len(),
                vectors.len()
            )));
        }

        let Some(first) = vectors.first() else {
            return Err(SearchError::EmptyCorpus);
        };

        let dimension = first.len();
        if dimension == 0 {
            return Err(SearchError::InvalidArgument(
                "vectors must have at least one component".to_string(),
            ));
        }

        let mut arena = Vec::with_capacity(vectors.len() * dimension);
        for vector in vectors {
            if vector.len() != dimension {
                return Err(SearchError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            if vector.iter().any(|x| !x.is_finite()) {
                return Err(SearchError::InvalidArgument(format!(
                    "vector {} has a non-finite component",
                    arena.len() / dimension
                )));
            }
            arena.extend_from_slice(vector);
        }

        Ok(Self {
            descriptions,
            vectors: arena,
            dimension,
            built_at: Utc::now(),
        })
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    /// Always false: empty builds are rejected
    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn get(&self, id: usize) -> Option<CorpusItem<'_>> {
        let description = self.descriptions.get(id)?;
        Some(CorpusItem {
            id,
            description,
            vector: self.vector(id),
        })
    }

    /// Description for `id`. Panics when out of range.
    pub(crate) fn description(&self, id: usize) -> &str {
        &self.descriptions[id]
    }

    /// Vector slice for `id`. Panics when out of range.
    pub(crate) fn vector(&self, id: usize) -> &[f32] {
        let start = id * self.dimension;
        &self.vectors[start..start + self.dimension]
    }

    /// Items in id order
    pub fn iter(&self) -> impl Iterator<Item = CorpusItem<'_>> + '_ {
        self.descriptions
            .iter()
            .zip(self.vectors.chunks_exact(self.dimension))
            .enumerate()
            .map(|(id, (description, vector))| CorpusItem {
                id,
                description,
                vector,
            })
    }
}

/// Store statistics
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStats {
    pub size: usize,
    pub dimension: usize,
    pub built_at: DateTime<Utc>,
}

/// Vector store with two states: uninitialized (no snapshot) and built
#[derive(Debug, Default)]
pub struct VectorStore {
    current: ArcSwapOption<CorpusSnapshot>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole corpus.
    ///
    /// Ids `0..n` follow input order. On error the previous corpus (or the
    /// uninitialized state) is kept untouched.
    pub fn build<S: Into<String>>(&self, descriptions: Vec<S>, vectors: &[Vec<f32>]) -> Result<()> {
        let descriptions = descriptions.into_iter().map(Into::into).collect();
        let snapshot = CorpusSnapshot::new(descriptions, vectors)?;

        log::info!(
            "Added {} items to index, vector shape ({}, {})",
            snapshot.len(),
            snapshot.len(),
            snapshot.dimension()
        );

        self.current.store(Some(Arc::new(snapshot)));
        Ok(())
    }

    /// Current snapshot, or `EmptyCorpus` while uninitialized
    pub fn snapshot(&self) -> Result<Arc<CorpusSnapshot>> {
        self.current.load_full().ok_or(SearchError::EmptyCorpus)
    }

    pub fn is_built(&self) -> bool {
        self.current.load().is_some()
    }

    /// Number of items, 0 while uninitialized
    pub fn size(&self) -> usize {
        self.current.load_full().map_or(0, |s| s.len())
    }

    /// Vector dimension, `None` while uninitialized
    pub fn dimension(&self) -> Option<usize> {
        self.current.load_full().map(|s| s.dimension())
    }

    /// Owned copy of one item: `(description, vector)`
    pub fn get(&self, id: usize) -> Option<(String, Vec<f32>)> {
        let snapshot = self.current.load_full()?;
        let item = snapshot.get(id)?;
        Some((item.description.to_string(), item.vector.to_vec()))
    }

    pub fn stats(&self) -> Option<StoreStats> {
        self.current.load_full().map(|s| StoreStats {
            size: s.len(),
            dimension: s.dimension(),
            built_at: s.built_at(),
        })
    }

    /// Drop the corpus and return to the uninitialized state
    pub fn clear(&self) {
        self.current.store(None);
    }
}
