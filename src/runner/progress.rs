//! Resumable progress persistence.
//!
//! The tracker is saved after every completed batch. On restart, any
//! identifier already in the processed set is skipped outright, whatever its
//! previous status was.

use crate::core::error::Result;
use crate::core::models::ValidationResult;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A result paired with the input file it came from, so reports can be
/// regrouped per source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedResult {
    pub source_tag: String,
    #[serde(flatten)]
    pub result: ValidationResult,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProgressFile {
    session_id: String,
    total: usize,
    processed_identifiers: Vec<String>,
    results: Vec<TaggedResult>,
}

/// Owns the processed set and accumulated results for a run.
pub struct ProgressTracker {
    path: PathBuf,
    session_id: String,
    total: usize,
    processed: HashSet<String>,
    results: Vec<TaggedResult>,
}

impl ProgressTracker {
    /// Resumes from an existing progress file, or starts a fresh session.
    /// `total` is the expected record count of the current run.
    pub fn load_or_new(path: &Path, total: usize) -> Result<Self> {
        if path.is_file() {
            let contents = std::fs::read_to_string(path)?;
            let file: ProgressFile = serde_json::from_str(&contents)?;
            info!(
                target: "progress",
                "Resuming session {} ({} already processed)",
                file.session_id,
                file.processed_identifiers.len()
            );
            return Ok(Self {
                path: path.to_path_buf(),
                session_id: file.session_id,
                total: total.max(file.total),
                processed: file
                    .processed_identifiers
                    .into_iter()
                    .map(|s| s.to_lowercase())
                    .collect(),
                results: file.results,
            });
        }

        let session_id = format!(
            "{}-{:04x}",
            Utc::now().format("%Y%m%d%H%M%S"),
            rand::thread_rng().gen_range(0u16..=0xffff)
        );
        debug!(target: "progress", "Starting new session {}", session_id);
        Ok(Self {
            path: path.to_path_buf(),
            session_id,
            total,
            processed: HashSet::new(),
            results: Vec::new(),
        })
    }

    /// Whether this identifier was already validated in this or a previous
    /// run. Case-insensitive.
    pub fn is_processed(&self, identifier: &str) -> bool {
        self.processed.contains(&identifier.to_lowercase())
    }

    /// Records a completed validation. The processed set only ever grows.
    pub fn record(&mut self, source_tag: &str, result: ValidationResult) {
        self.processed.insert(result.identifier.to_lowercase());
        self.results.push(TaggedResult {
            source_tag: source_tag.to_string(),
            result,
        });
    }

    /// Persists the current state. Written via a sibling temp file so a
    /// crash mid-write cannot truncate the previous snapshot.
    pub fn save(&self) -> Result<()> {
        let file = ProgressFile {
            session_id: self.session_id.clone(),
            total: self.total,
            processed_identifiers: {
                let mut ids: Vec<String> = self.processed.iter().cloned().collect();
                ids.sort();
                ids
            },
            results: self.results.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(
            target: "progress",
            "Saved progress: {}/{} processed",
            self.processed.len(),
            self.total
        );
        Ok(())
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn results(&self) -> &[TaggedResult] {
        &self.results
    }
}
