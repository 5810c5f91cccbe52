//! Index command - build the scent index and report its shape

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use scent_search::search::embedding::Encoder;
use scent_search::ScentConfig;

use super::indexed_engine;

/// Run index command
pub fn run(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = ScentConfig::resolve(config_path)?;

    if !json {
        println!("{} Building scent index...", "→".dimmed());
    }

    let (engine, stats) = indexed_engine(&config)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "model": engine.encoder().model_id(),
                "indexed": stats.indexed,
                "dimension": stats.dimension,
                "duration_ms": stats.duration_ms,
            })
        );
        return Ok(());
    }

    println!();
    println!(
        "{} Indexed {} scents in {:.3}s",
        "✓".green().bold(),
        stats.indexed.to_string().cyan(),
        stats.duration_ms as f64 / 1000.0
    );
    println!(
        "  {} Vector shape: ({}, {})",
        "→".dimmed(),
        stats.indexed,
        stats.dimension
    );
    println!("  {} Model: {}", "→".dimmed(), engine.encoder().model_id());

    Ok(())
}
