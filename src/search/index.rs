//! Exact nearest-neighbor search
//!
//! Flat L2 index: every query is compared against every stored vector.
//! A bounded max-heap keeps the `k` best candidates seen so far.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::error::{Result, SearchError};
use super::store::{CorpusSnapshot, VectorStore};

/// One ranked hit
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub item_id: usize,
    pub description: String,
    /// Squared Euclidean distance
    pub distance: f32,
    /// 0 = closest
    pub rank: usize,
}

/// Sum of squared per-component differences
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Ordered by distance, then by id so equal distances keep insertion order
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f32,
    id: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Brute-force L2 index over a [`VectorStore`]
pub struct FlatL2Index<'a> {
    store: &'a VectorStore,
}

impl<'a> FlatL2Index<'a> {
    pub fn new(store: &'a VectorStore) -> Self {
        Self { store }
    }

    /// `k` closest items in ascending distance.
    ///
    /// `k` larger than the corpus returns every item. Read-only: the scan
    /// runs against the snapshot current at call time.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<QueryResult>> {
        let snapshot = self.store.snapshot()?;
        search_snapshot(&snapshot, query, k)
    }
}

/// Scan one snapshot
pub fn search_snapshot(
    snapshot: &CorpusSnapshot,
    query: &[f32],
    k: usize,
) -> Result<Vec<QueryResult>> {
    if k == 0 {
        return Err(SearchError::InvalidArgument(
            "k must be at least 1".to_string(),
        ));
    }
    if query.len() != snapshot.dimension() {
        return Err(SearchError::DimensionMismatch {
            expected: snapshot.dimension(),
            actual: query.len(),
        });
    }
    if query.iter().any(|x| !x.is_finite()) {
        return Err(SearchError::InvalidArgument(
            "query vector has a non-finite component".to_string(),
        ));
    }

    let k = k.min(snapshot.len());
    let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);

    for item in snapshot.iter() {
        let candidate = Candidate {
            distance: squared_l2(query, item.vector),
            id: item.id,
        };

        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().is_some_and(|worst| candidate < *worst) {
            heap.pop();
            heap.push(candidate);
        }
    }

    Ok(heap
        .into_sorted_vec()
        .into_iter()
        .enumerate()
        .map(|(rank, c)| QueryResult {
            item_id: c.id,
            description: snapshot.description(c.id).to_string(),
            distance: c.distance,
            rank,
        })
        .collect())
}
