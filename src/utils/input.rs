//! Reads input lists of identifiers, optionally paired with secrets.

use crate::core::error::{AppError, Result};
use crate::core::models::InputRecord;
use std::path::Path;
use tracing::{debug, info, warn};

/// Parses one input line into `(identifier, secret)`. Returns `None` for
/// blank lines and `#` comments. The secret defaults to an empty string
/// when the line carries no `:` separator.
pub fn parse_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    match trimmed.split_once(':') {
        Some((identifier, secret)) => {
            Some((identifier.trim().to_string(), secret.trim().to_string()))
        }
        None => Some((trimmed.to_string(), String::new())),
    }
}

/// Reads a single input file into records tagged with the file stem.
pub fn read_input_file(path: &Path) -> Result<Vec<InputRecord>> {
    let source_tag = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    let contents = std::fs::read_to_string(path)?;
    let records: Vec<InputRecord> = contents
        .lines()
        .filter_map(parse_line)
        .map(|(identifier, secret)| InputRecord::new(identifier, secret, source_tag.clone()))
        .collect();

    debug!(target: "input", "Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Scans a directory for `.txt` input files and ingests them all.
/// Files are visited in name order so runs are deterministic.
pub fn read_input_dir(dir: &Path) -> Result<Vec<InputRecord>> {
    if !dir.is_dir() {
        return Err(AppError::InvalidInput(format!(
            "input directory '{}' does not exist",
            dir.display()
        )));
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("txt"))
        // proxies.txt holds the proxy pool, not identifiers.
        .filter(|p| p.file_name().and_then(|n| n.to_str()) != Some("proxies.txt"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        warn!(target: "input", "No .txt files found in {}", dir.display());
    }

    let mut records = Vec::new();
    for path in &paths {
        records.extend(read_input_file(path)?);
    }

    info!(
        target: "input",
        "Ingested {} records from {} file(s) in {}",
        records.len(),
        paths.len(),
        dir.display()
    );
    Ok(records)
}

/// Reads a proxy pool file: one proxy URL per line, `#` comments and blank
/// lines skipped.
pub fn read_proxy_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    let proxies: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    debug!(target: "input", "Read {} proxies from {}", proxies.len(), path.display());
    Ok(proxies)
}
