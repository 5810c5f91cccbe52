//! Convert command - turn raw sensor logs into labeled JSON records

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::Colorize;

use scent_search::core::sensor::{combine_records, read_sensor_logs, to_records, SensorReading};

/// Combined file name inside `--output-dir`
const COMBINED_FILE: &str = "combined_scents.json";

pub fn run(dir: &Path, output: Option<&Path>, output_dir: Option<&Path>) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let logs = read_sensor_logs(dir)?;
    let start = Local::now();

    if let Some(out_dir) = output_dir {
        let written = write_output_dir(&logs, start, out_dir)?;
        for path in &written {
            eprintln!("{} Wrote {}", "✓".green().bold(), path.display());
        }
    }

    let records = combine_records(&logs, start);
    let json = serde_json::to_string_pretty(&records)?;

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {} readings to {}",
                "✓".green().bold(),
                records.len().to_string().cyan(),
                path.display()
            );
        }
        None if output_dir.is_none() => println!("{}", json),
        None => {}
    }

    Ok(())
}

/// One `<scent>.json` per log with readings, plus the combined file
fn write_output_dir(
    logs: &[(String, Vec<SensorReading>)],
    start: DateTime<Local>,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut written = Vec::new();
    for (scent, readings) in logs {
        if readings.is_empty() {
            log::warn!("No valid readings for {}, skipping", scent);
            continue;
        }
        let path = out_dir.join(format!("{}.json", scent));
        let json = serde_json::to_string_pretty(&to_records(readings, scent, start))?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    let records = combine_records(logs, start);
    if records.is_empty() {
        log::warn!("No readings in any log, {} not written", COMBINED_FILE);
        return Ok(written);
    }

    let path = out_dir.join(COMBINED_FILE);
    fs::write(&path, serde_json::to_string_pretty(&records)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    written.push(path);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading(gas: f64) -> SensorReading {
        SensorReading {
            gas_resistance: gas,
            temperature: 24.0,
            humidity: 40.0,
        }
    }

    #[test]
    fn test_output_dir_has_one_file_per_scent() {
        let out = tempfile::tempdir().unwrap();
        let logs = vec![
            ("garlic".to_string(), vec![reading(1.0), reading(2.0)]),
            ("empty".to_string(), vec![]),
            ("lemon".to_string(), vec![reading(3.0)]),
        ];
        let start = Local.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        let written = write_output_dir(&logs, start, out.path()).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["garlic.json", "lemon.json", COMBINED_FILE]);

        let lemon: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.path().join("lemon.json")).unwrap())
                .unwrap();
        assert_eq!(lemon[0]["timestamp"], "2025-03-01 12:00:00");
        assert_eq!(lemon[0]["scent"], "lemon");

        let combined: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.path().join(COMBINED_FILE)).unwrap())
                .unwrap();
        assert_eq!(combined.as_array().unwrap().len(), 3);
        assert_eq!(combined[2]["scent"], "lemon");
        assert_eq!(combined[2]["timestamp"], "2025-03-01 12:00:10");
    }

    #[test]
    fn test_output_dir_without_readings_writes_nothing() {
        let out = tempfile::tempdir().unwrap();
        let logs = vec![("empty".to_string(), vec![])];
        let written = write_output_dir(&logs, Local::now(), out.path()).unwrap();
        assert!(written.is_empty());
        assert!(!out.path().join(COMBINED_FILE).exists());
    }
}
