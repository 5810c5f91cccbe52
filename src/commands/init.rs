//! Init command - write a default `scent.yaml`

use std::path::Path;

use anyhow::Result;
use colored::*;

use scent_search::ScentConfig;

pub fn run(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(ScentConfig::default_path);

    if path.exists() && !force {
        println!(
            "{} {} already exists (use {} to overwrite)",
            "!".yellow().bold(),
            path.display(),
            "--force".cyan()
        );
        return Ok(());
    }

    let config = ScentConfig::default();
    config.save(&path)?;

    println!("{} Wrote {}", "✓".green().bold(), path.display());
    println!(
        "  {} {} scents, dimension {}",
        "→".dimmed(),
        config.scents.len().to_string().cyan(),
        config.dimension
    );

    Ok(())
}
