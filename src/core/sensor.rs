//! Sensor log ingestion
//!
//! Raw logs from the gas sensor come as groups of three lines:
//!
//! ```text
//! Gas Resistance: 10234.5
//! Temperature: 24.1
//! Humidity: 40.2
//! ```
//!
//! Each `<scent>.txt` file in a directory holds the readings recorded for
//! one scent.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Assumed interval between two readings
pub const READING_INTERVAL_SECS: i64 = 5;

lazy_static! {
    static ref GAS_RE: Regex = Regex::new(r"Gas Resistance:\s*([\d.]+)").unwrap();
    static ref TEMPERATURE_RE: Regex = Regex::new(r"Temperature:\s*([\d.]+)").unwrap();
    static ref HUMIDITY_RE: Regex = Regex::new(r"Humidity:\s*([\d.]+)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub gas_resistance: f64,
    pub temperature: f64,
    pub humidity: f64,
}

/// One timestamped, labeled row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorRecord {
    pub timestamp: String,
    pub scent: String,
    pub gas_resistance: f64,
    pub temperature: f64,
    pub humidity: f64,
}

fn capture_value(re: &Regex, line: &str) -> Option<f64> {
    re.captures(line)?.get(1)?.as_str().parse().ok()
}

/// Parse every complete three-line group; malformed groups are skipped
pub fn parse_sensor_log(content: &str) -> Vec<SensorReading> {
    let lines: Vec<&str> = content.lines().collect();
    let mut readings = Vec::new();

    for (group, chunk) in lines.chunks_exact(3).enumerate() {
        let gas = capture_value(&GAS_RE, chunk[0].trim());
        let temperature = capture_value(&TEMPERATURE_RE, chunk[1].trim());
        let humidity = capture_value(&HUMIDITY_RE, chunk[2].trim());

        match (gas, temperature, humidity) {
            (Some(gas_resistance), Some(temperature), Some(humidity)) => {
                readings.push(SensorReading {
                    gas_resistance,
                    temperature,
                    humidity,
                })
            }
            _ => log::warn!("Failed to match pattern at line {}", group * 3),
        }
    }

    readings
}

/// Label readings with a scent and timestamps spaced by [`READING_INTERVAL_SECS`]
pub fn to_records(
    readings: &[SensorReading],
    scent: &str,
    start: DateTime<Local>,
) -> Vec<SensorRecord> {
    readings
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let timestamp = start + Duration::seconds(READING_INTERVAL_SECS * i as i64);
            SensorRecord {
                timestamp: timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                scent: scent.to_string(),
                gas_resistance: r.gas_resistance,
                temperature: r.temperature,
                humidity: r.humidity,
            }
        })
        .collect()
}

/// `*.txt` logs in `dir`, sorted, paired with their scent name (file stem)
pub fn find_sensor_logs(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let pattern = dir.join("*.txt");
    let pattern = pattern
        .to_str()
        .with_context(|| format!("Non UTF-8 path: {}", dir.display()))?;

    let mut logs = Vec::new();
    for entry in glob::glob(pattern)? {
        let path = entry?;
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            logs.push((stem.to_string(), path.clone()));
        }
    }

    logs.sort();
    Ok(logs)
}

/// Readings of every log in `dir`, per scent, in file order
pub fn read_sensor_logs(dir: &Path) -> Result<Vec<(String, Vec<SensorReading>)>> {
    let mut logs = Vec::new();

    for (scent, path) in find_sensor_logs(dir)? {
        let bytes = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let content = String::from_utf8_lossy(&bytes);
        let readings = parse_sensor_log(&content);
        log::info!("Found {} readings in {}", readings.len(), path.display());
        logs.push((scent, readings));
    }

    Ok(logs)
}

/// Merge per-scent readings onto one clock starting at `start`
pub fn combine_records(logs: &[(String, Vec<SensorReading>)], start: DateTime<Local>) -> Vec<SensorRecord> {
    let mut records = Vec::new();

    for (scent, readings) in logs {
        let offset = Duration::seconds(READING_INTERVAL_SECS * records.len() as i64);
        records.extend(to_records(readings, scent, start + offset));
    }

    records
}

/// Parse every log in `dir` into labeled records on a single clock
pub fn collect_sensor_records(dir: &Path, start: DateTime<Local>) -> Result<Vec<SensorRecord>> {
    Ok(combine_records(&read_sensor_logs(dir)?, start))
}
