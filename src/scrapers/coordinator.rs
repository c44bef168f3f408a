//! Bounded fan-out of detail extractions.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use super::browser::MediaHarvester;
use super::error::ExtractError;
use super::extract::{DetailExtractor, Extraction, SkipReason};
use crate::models::Watchface;

/// Concurrent extractions against the storefront.
pub const DEFAULT_WORKERS: usize = 5;

/// What came out of a batch of extractions.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Extracted records, in completion order.
    pub records: Vec<Watchface>,
    pub skipped: Vec<(String, SkipReason)>,
    /// `(id, error message)` for every failed item.
    pub failed: Vec<(String, String)>,
}

impl ExtractionReport {
    pub fn attempted(&self) -> usize {
        self.records.len() + self.skipped.len() + self.failed.len()
    }
}

/// Runs one extraction task per id on a fixed-size worker pool.
///
/// Each task yields its own `Result`; a failing or panicking task is logged
/// and counted, never allowed to affect its siblings.
pub struct ExtractionCoordinator<H> {
    extractor: Arc<DetailExtractor<H>>,
    workers: usize,
}

impl<H: MediaHarvester + 'static> ExtractionCoordinator<H> {
    pub fn new(extractor: DetailExtractor<H>, workers: usize) -> Self {
        Self {
            extractor: Arc::new(extractor),
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Extract every id, at most `workers` at a time.
    pub async fn run_all(&self, ids: Vec<String>) -> ExtractionReport {
        info!(
            "Starting scraping {} watchfaces with {} workers...",
            ids.len(),
            self.workers
        );

        let semaphore = Arc::new(Semaphore::new(self.workers));

        let mut pending: FuturesUnordered<_> = ids
            .into_iter()
            .map(|id| {
                let extractor = Arc::clone(&self.extractor);
                let semaphore = Arc::clone(&semaphore);
                let task_id = id.clone();

                let handle = tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| ExtractError::Aborted(e.to_string()))?;
                    extractor.extract(&task_id).await
                });

                async move {
                    let outcome = match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => Err(ExtractError::Aborted(e.to_string())),
                    };
                    (id, outcome)
                }
            })
            .collect();

        let mut report = ExtractionReport::default();
        while let Some((id, outcome)) = pending.next().await {
            match outcome {
                Ok(Extraction::Extracted(watchface)) => report.records.push(watchface),
                Ok(Extraction::Skipped(reason)) => {
                    info!(id = %id, reason = reason.as_str(), "Skipping watchface");
                    report.skipped.push((id, reason));
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "Error scraping watchface");
                    report.failed.push((id, e.to_string()));
                }
            }
        }

        info!(
            extracted = report.records.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Finished scraping watchfaces"
        );
        report
    }
}
