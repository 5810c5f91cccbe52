//! Query command - find the scents closest to a free-text query

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use scent_search::search::index::QueryResult;
use scent_search::ScentConfig;

use super::indexed_engine;

/// Run query command
pub fn run(query: &str, k: Option<usize>, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = ScentConfig::resolve(config_path)?;
    let k = k.unwrap_or(config.default_k);

    let (engine, _) = indexed_engine(&config)?;
    let results = engine.search(query, k)?;

    if json {
        let json_results: Vec<_> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "rank": r.rank,
                    "id": r.item_id,
                    "scent": r.description,
                    "distance": r.distance,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_results)?);
        return Ok(());
    }

    println!(
        "{} {} results for: {}",
        "→".dimmed(),
        results.len(),
        query.cyan()
    );
    println!();

    for line in format_results(&results) {
        println!("{}", line);
    }

    Ok(())
}

/// `N. description   (distance: x.xxxx)`, distances aligned in one column
fn format_results(results: &[QueryResult]) -> Vec<String> {
    let width = results
        .iter()
        .map(|r| r.description.width())
        .max()
        .unwrap_or(0);

    results
        .iter()
        .map(|r| {
            let padding = " ".repeat(width - r.description.width());
            let distance = format!("{:.4}", r.distance);
            let distance = if r.rank == 0 {
                distance.green()
            } else {
                distance.dimmed()
            };
            format!(
                "{}. {}{}  (distance: {})",
                (r.rank + 1).to_string().bold(),
                r.description.cyan(),
                padding,
                distance
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(rank: usize, description: &str, distance: f32) -> QueryResult {
        QueryResult {
            item_id: rank,
            description: description.to_string(),
            distance,
            rank,
        }
    }

    #[test]
    fn test_distance_column_aligned() {
        colored::control::set_override(false);

        let lines = format_results(&[
            result(0, "garlic pungent wasabi spicy", 0.5),
            result(1, "라벤더", 1.25),
        ]);

        assert_eq!(lines[0], "1. garlic pungent wasabi spicy  (distance: 0.5000)");
        // 라벤더 is 6 columns wide, so 21 spaces of padding
        assert_eq!(
            lines[1],
            format!("2. 라벤더{}  (distance: 1.2500)", " ".repeat(21))
        );
    }
}
