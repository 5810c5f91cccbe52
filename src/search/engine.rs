//! Query engine - combines an encoder with the vector store

use std::time::Instant;

use super::embedding::Encoder;
use super::error::{Result, SearchError};
use super::index::{FlatL2Index, QueryResult};
use super::store::{StoreStats, VectorStore};

/// Indexing statistics
#[derive(Debug, Clone, PartialEq)]
pub struct IndexingStats {
    pub indexed: usize,
    pub dimension: usize,
    pub duration_ms: u128,
}

/// Encoder → vector store → exact search
///
/// The encoder is owned by the engine and handed in by the caller; nothing is
/// shared through process-wide state. All methods take `&self`, so one engine
/// can serve concurrent callers: queries read a stable snapshot while
/// `index_corpus` swaps in a new one.
pub struct QueryEngine<E> {
    encoder: E,
    store: VectorStore,
}

impl<E: Encoder> QueryEngine<E> {
    pub fn new(encoder: E) -> Self {
        Self {
            encoder,
            store: VectorStore::new(),
        }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Encode and index `descriptions`, replacing any previous corpus.
    ///
    /// On failure the previous corpus stays in place.
    pub fn index_corpus<S: AsRef<str>>(&self, descriptions: &[S]) -> Result<IndexingStats> {
        let start = Instant::now();

        let texts: Vec<&str> = descriptions.iter().map(AsRef::as_ref).collect();
        if texts.is_empty() {
            return Err(SearchError::EmptyCorpus);
        }

        let vectors = self.encoder.encode_batch(&texts)?;
        if vectors.len() != texts.len() {
            return Err(SearchError::InvalidArgument(format!(
                "encoder {} returned {} vectors for {} texts",
                self.encoder.model_id(),
                vectors.len(),
                texts.len()
            )));
        }

        self.store.build(texts, &vectors)?;

        Ok(IndexingStats {
            indexed: vectors.len(),
            dimension: self.store.dimension().unwrap_or_default(),
            duration_ms: start.elapsed().as_millis(),
        })
    }

    /// Ranked `(description, distance)` pairs for `text`
    pub fn query(&self, text: &str, k: usize) -> Result<Vec<(String, f32)>> {
        Ok(self
            .search(text, k)?
            .into_iter()
            .map(|r| (r.description, r.distance))
            .collect())
    }

    /// Full ranked results for `text`
    pub fn search(&self, text: &str, k: usize) -> Result<Vec<QueryResult>> {
        if k == 0 {
            return Err(SearchError::InvalidArgument(
                "k must be at least 1".to_string(),
            ));
        }
        // Fail before paying for inference
        if !self.store.is_built() {
            return Err(SearchError::EmptyCorpus);
        }

        let query_vector = self.encoder.encode_one(text)?;

        let results = FlatL2Index::new(&self.store).search(&query_vector, k)?;

        log::debug!("query {:?} (k={}) returned {} items", text, k, results.len());

        Ok(results)
    }

    pub fn stats(&self) -> Option<StoreStats> {
        self.store.stats()
    }

    /// Drop the indexed corpus
    pub fn reset(&self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::embedding::HtpEncoder;
    use crate::search::error::EncoderError;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    const SCENTS: [&str; 4] = [
        "lavender floral soft soothing",
        "lemongrass fresh grassy lemon herbal",
        "orange fresh citrus tangy sweet",
        "garlic pungent wasabi spicy",
    ];

    /// Maps a text to [len, vowel count]; counts calls
    struct CountingEncoder {
        calls: Cell<usize>,
    }

    impl CountingEncoder {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
            }
        }
    }

    impl Encoder for CountingEncoder {
        fn model_id(&self) -> &str {
            "counting"
        }

        fn dimension(&self) -> usize {
            2
        }

        fn encode_one(&self, text: &str) -> std::result::Result<Vec<f32>, EncoderError> {
            self.calls.set(self.calls.get() + 1);
            let vowels = text.chars().filter(|c| "aeiou".contains(*c)).count();
            Ok(vec![text.len() as f32, vowels as f32])
        }
    }

    struct FailingEncoder;

    impl Encoder for FailingEncoder {
        fn model_id(&self) -> &str {
            "failing"
        }

        fn dimension(&self) -> usize {
            1
        }

        fn encode_one(&self, text: &str) -> std::result::Result<Vec<f32>, EncoderError> {
            if text.contains("bad") {
                Err(EncoderError::Backend("cannot encode".to_string()))
            } else {
                Ok(vec![text.len() as f32])
            }
        }
    }

    /// One-dimensional; "broken" encodes to a negative NaN
    struct NanEncoder;

    impl Encoder for NanEncoder {
        fn model_id(&self) -> &str {
            "nan"
        }

        fn dimension(&self) -> usize {
            1
        }

        fn encode_one(&self, text: &str) -> std::result::Result<Vec<f32>, EncoderError> {
            Ok(match text {
                "broken" => vec![-f32::NAN],
                "garlic" => vec![1.0],
                _ => vec![5.0],
            })
        }
    }

    #[test]
    fn test_garlic_scenario() {
        let engine = QueryEngine::new(HtpEncoder::new());
        engine.index_corpus(&SCENTS).unwrap();

        let results = engine.query("garlic", 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "garlic pungent wasabi spicy");
        assert!(results[1].1 >= results[0].1);
    }

    #[test]
    fn test_result_count_is_min_k_n() {
        let engine = QueryEngine::new(HtpEncoder::new());
        engine.index_corpus(&SCENTS).unwrap();

        for k in 1..=6 {
            let results = engine.query("fresh citrus", k).unwrap();
            assert_eq!(results.len(), k.min(SCENTS.len()));
            assert!(results.windows(2).all(|w| w[0].1 <= w[1].1));
        }
    }

    #[test]
    fn test_exact_match_has_zero_distance() {
        let engine = QueryEngine::new(HtpEncoder::new());
        engine.index_corpus(&SCENTS).unwrap();

        for scent in SCENTS {
            let results = engine.query(scent, 4).unwrap();
            assert_eq!(results[0].0, scent);
            assert_eq!(results[0].1, 0.0);
        }
    }

    #[test]
    fn test_query_is_deterministic() {
        let engine = QueryEngine::new(HtpEncoder::new());
        engine.index_corpus(&SCENTS).unwrap();

        let first = engine.search("sweet herbal", 3).unwrap();
        let second = engine.search("sweet herbal", 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reindex_replaces_corpus() {
        let engine = QueryEngine::new(HtpEncoder::new());
        engine.index_corpus(&SCENTS).unwrap();

        let second = ["cedar smoky woody", "vanilla sweet creamy"];
        engine.index_corpus(&second).unwrap();

        let results = engine.query("garlic pungent wasabi spicy", 10).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(d, _)| second.contains(&d.as_str())));
    }

    #[test]
    fn test_query_before_index_fails_without_encoding() {
        let engine = QueryEngine::new(CountingEncoder::new());
        let err = engine.query("garlic", 1).unwrap_err();
        assert_eq!(err, SearchError::EmptyCorpus);
        assert_eq!(engine.encoder().calls.get(), 0);
    }

    #[test]
    fn test_zero_k_is_invalid() {
        let engine = QueryEngine::new(HtpEncoder::new());
        engine.index_corpus(&SCENTS).unwrap();
        let err = engine.query("garlic", 0).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_corpus_is_rejected() {
        let engine = QueryEngine::new(CountingEncoder::new());
        let err = engine.index_corpus::<&str>(&[]).unwrap_err();
        assert_eq!(err, SearchError::EmptyCorpus);
        assert!(engine.stats().is_none());
    }

    #[test]
    fn test_index_stats() {
        let engine = QueryEngine::new(CountingEncoder::new());
        let stats = engine.index_corpus(&["ab", "abc", "a"]).unwrap();
        assert_eq!(stats.indexed, 3);
        assert_eq!(stats.dimension, 2);
        assert_eq!(engine.encoder().calls.get(), 3);

        let store_stats = engine.stats().unwrap();
        assert_eq!(store_stats.size, 3);
        assert_eq!(store_stats.dimension, 2);
    }

    #[test]
    fn test_encoder_error_surfaces_and_keeps_corpus() {
        let engine = QueryEngine::new(FailingEncoder);
        engine.index_corpus(&["good one", "fine"]).unwrap();

        let err = engine.index_corpus(&["ok", "bad input"]).unwrap_err();
        assert_eq!(
            err,
            SearchError::Encoder(EncoderError::Backend("cannot encode".to_string()))
        );
        assert_eq!(engine.store().size(), 2);

        let err = engine.query("bad query", 1).unwrap_err();
        assert!(matches!(err, SearchError::Encoder(_)));

        let results = engine.query("fine", 1).unwrap();
        assert_eq!(results, vec![("fine".to_string(), 0.0)]);
    }

    #[test]
    fn test_nan_vectors_never_reach_the_index() {
        let engine = QueryEngine::new(NanEncoder);
        engine.index_corpus(&["garlic", "other"]).unwrap();

        let err = engine.index_corpus(&["garlic", "broken", "other"]).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));
        assert_eq!(engine.store().size(), 2);

        let err = engine.query("broken", 1).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));

        let results = engine.query("garlic", 3).unwrap();
        assert_eq!(
            results,
            vec![("garlic".to_string(), 0.0), ("other".to_string(), 16.0)]
        );
    }

    #[test]
    fn test_borrowed_encoder() {
        let encoder = CountingEncoder::new();
        {
            let engine = QueryEngine::new(&encoder);
            engine.index_corpus(&["ab", "aaaa"]).unwrap();
            assert_eq!(engine.encoder().model_id(), "counting");
            assert_eq!(engine.query("aa", 1).unwrap()[0].0, "ab");
        }
        // calls land on the caller's encoder
        assert_eq!(encoder.calls.get(), 3);
    }

    #[test]
    fn test_search_reports_ids_and_ranks() {
        let engine = QueryEngine::new(CountingEncoder::new());
        engine.index_corpus(&["aaaa", "b", "aa"]).unwrap();

        let results = engine.search("aa", 3).unwrap();
        let ids: Vec<usize> = results.iter().map(|r| r.item_id).collect();
        let ranks: Vec<usize> = results.iter().map(|r| r.rank).collect();
        assert_eq!(ids, vec![2, 1, 0]);
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn test_reset() {
        let engine = QueryEngine::new(HtpEncoder::new());
        engine.index_corpus(&SCENTS).unwrap();
        engine.reset();
        assert_eq!(engine.query("garlic", 1).unwrap_err(), SearchError::EmptyCorpus);
    }

    #[test]
    fn test_concurrent_queries_during_reindex() {
        let engine = QueryEngine::new(HtpEncoder::new());
        engine.index_corpus(&SCENTS).unwrap();
        let other = ["cedar smoky woody", "vanilla sweet creamy", "mint cool fresh"];

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        let results = engine.query("fresh", 10).unwrap();
                        // either the old corpus or the new one, never a mix
                        let old = results.iter().all(|(d, _)| SCENTS.contains(&d.as_str()));
                        let new = results.iter().all(|(d, _)| other.contains(&d.as_str()));
                        assert!(old || new);
                        assert!(results.len() == SCENTS.len() || results.len() == other.len());
                    }
                });
            }
            scope.spawn(|| {
                for i in 0..20 {
                    if i % 2 == 0 {
                        engine.index_corpus(&other).unwrap();
                    } else {
                        engine.index_corpus(&SCENTS).unwrap();
                    }
                }
            });
        });
    }
}
