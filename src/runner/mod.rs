//! Batch coordination: splits input into batches, runs the pipeline over
//! each batch with bounded concurrency, and persists progress between
//! batches.

pub mod progress;
pub mod report;

pub use progress::{ProgressTracker, TaggedResult};
pub use report::ReportWriter;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::models::{InputRecord, ValidationResult, ValidationStatus};
use crate::pipeline::Pipeline;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Aggregate outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub valid: usize,
    pub invalid: usize,
    pub skipped: usize,
    /// Set when an interrupt stopped dispatch before all batches ran.
    pub interrupted: bool,
}

/// Drives the pipeline over batches of records. The shutdown flag stops
/// dispatching new batches; in-flight work finishes and is persisted.
pub struct BatchRunner {
    config: Arc<Config>,
    pipeline: Arc<Pipeline>,
    shutdown: Arc<AtomicBool>,
    bar: Option<ProgressBar>,
}

impl BatchRunner {
    pub fn new(config: Arc<Config>, pipeline: Arc<Pipeline>, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            config,
            pipeline,
            shutdown,
            bar: None,
        }
    }

    pub fn with_progress_bar(mut self, bar: ProgressBar) -> Self {
        self.bar = Some(bar);
        self
    }

    /// Validates every pending record, saving the tracker once per batch.
    /// Records already in the processed set, and duplicates within the
    /// input, are skipped without touching the network.
    pub async fn run(
        &self,
        records: &[InputRecord],
        tracker: &mut ProgressTracker,
    ) -> Result<RunSummary> {
        let pending = self.pending_records(records, tracker);
        info!(
            target: "runner",
            "{} of {} record(s) pending validation",
            pending.len(),
            records.len()
        );

        let mut summary = RunSummary::default();
        for batch in pending.chunks(self.config.batch_size) {
            if self.shutdown.load(Ordering::SeqCst) {
                warn!(target: "runner", "Interrupt received, stopping before the next batch");
                summary.interrupted = true;
                break;
            }
            self.pipeline.reset_proxy_usage();

            // All records of a batch run concurrently; the batch completes
            // when every worker has finished. Each validation runs in its
            // own task so one record blowing up cannot take the batch down.
            let outcomes: Vec<(String, _)> = stream::iter(batch.iter().map(|record| {
                let pipeline = self.pipeline.clone();
                let record = record.clone();
                async move {
                    let tag = record.source_tag.clone();
                    let identifier = record.identifier.clone();
                    let secret = record.secret.clone();
                    let handle =
                        tokio::spawn(async move { pipeline.validate(&record).await });
                    let result = match handle.await {
                        Ok(result) => result,
                        Err(e) => {
                            warn!(target: "runner", "Validation of {} aborted: {}", identifier, e);
                            let mut result = ValidationResult::pending(identifier, secret);
                            result.details.push(format!("Unexpected failure: {}", e));
                            result
                        }
                    };
                    (tag, result)
                }
            }))
            .buffer_unordered(self.config.max_workers)
            .collect()
            .await;

            for (source_tag, result) in outcomes {
                match result.status {
                    ValidationStatus::Valid => summary.valid += 1,
                    ValidationStatus::Invalid => summary.invalid += 1,
                    ValidationStatus::Skipped => summary.skipped += 1,
                }
                summary.processed += 1;
                tracker.record(&source_tag, result);
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
            }

            // Persisted on the coordinating task only, after the batch joins.
            tracker.save()?;
        }

        info!(
            target: "runner",
            "Run complete: {} processed ({} valid, {} invalid, {} skipped){}",
            summary.processed,
            summary.valid,
            summary.invalid,
            summary.skipped,
            if summary.interrupted { ", interrupted" } else { "" }
        );
        Ok(summary)
    }

    /// Drops already-processed identifiers and in-run duplicates, preserving
    /// first-seen order.
    fn pending_records(
        &self,
        records: &[InputRecord],
        tracker: &ProgressTracker,
    ) -> Vec<InputRecord> {
        let mut seen: HashSet<String> = HashSet::new();
        records
            .iter()
            .filter(|r| {
                let key = r.identifier.to_lowercase();
                if tracker.is_processed(&key) || !seen.insert(key) {
                    return false;
                }
                true
            })
            .cloned()
            .collect()
    }
}
