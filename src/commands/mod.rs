pub mod convert;
pub mod index;
pub mod init;
pub mod query;

use anyhow::{Context, Result};

use scent_search::search::embedding::HtpEncoder;
use scent_search::search::engine::{IndexingStats, QueryEngine};
use scent_search::ScentConfig;

/// Engine indexed with the configured scents
pub(crate) fn indexed_engine(config: &ScentConfig) -> Result<(QueryEngine<HtpEncoder>, IndexingStats)> {
    let engine = QueryEngine::new(config.encoder()?);
    let stats = engine
        .index_corpus(&config.scents)
        .context("Failed to index scents")?;
    Ok((engine, stats))
}
