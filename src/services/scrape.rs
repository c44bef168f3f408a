//! Catalog scrape service.
//!
//! Lists the catalog, keeps the obtainable entries, extracts each one through
//! the worker pool and writes the records in a single pass at the end.

use tracing::{error, info, warn};

use crate::models::Watchface;
use crate::repository::{RepositoryError, WatchfaceRepository};
use crate::scrapers::{
    candidate_ids, filter_catalog, CatalogClient, DetailExtractor, ExtractionCoordinator,
    MediaHarvester,
};

/// Per-run switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrapeOptions {
    /// Extract but do not write anything.
    pub dry_run: bool,
}

/// Counts for one run.
#[derive(Debug, Default)]
pub struct ScrapeSummary {
    /// Entries returned by the listing.
    pub listed: usize,
    /// Distinct ids that passed the filter.
    pub eligible: usize,
    pub extracted: usize,
    pub skipped: usize,
    /// `(id, error message)` per failed extraction.
    pub failures: Vec<(String, String)>,
    /// Rows written (0 on a dry run).
    pub written: usize,
    /// The extracted records, in completion order.
    pub records: Vec<Watchface>,
}

impl ScrapeSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Service driving one scrape from listing to storage.
pub struct ScrapeService<H> {
    catalog: CatalogClient,
    coordinator: ExtractionCoordinator<H>,
    repository: WatchfaceRepository,
    options: ScrapeOptions,
}

impl<H: MediaHarvester + 'static> ScrapeService<H> {
    pub fn new(
        catalog: CatalogClient,
        harvester: H,
        repository: WatchfaceRepository,
        workers: usize,
    ) -> Self {
        let extractor = DetailExtractor::new(catalog.clone(), harvester);
        Self {
            catalog,
            coordinator: ExtractionCoordinator::new(extractor, workers),
            repository,
            options: ScrapeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScrapeOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the full pipeline.
    ///
    /// Listing and per-item failures are logged and counted. Only storage
    /// errors are returned, and in that case nothing later is attempted.
    pub async fn run(&self) -> Result<ScrapeSummary, RepositoryError> {
        let entries = self.catalog.fetch_catalog().await;
        let listed = entries.len();
        if listed == 0 {
            warn!("Catalog listing returned no entries");
        }

        let eligible = filter_catalog(entries);
        let ids = candidate_ids(&eligible);

        let eligible_count = ids.len();
        let report = self.coordinator.run_all(ids).await;
        let extracted = report.records.len();

        let (written, records) = if self.options.dry_run {
            info!("Dry run, skipping {} writes", extracted);
            (0, report.records)
        } else {
            self.store(report.records)
                .await
                .inspect_err(|e| error!(error = %e, "Failed to store watchfaces"))?
        };

        Ok(ScrapeSummary {
            listed,
            eligible: eligible_count,
            extracted,
            skipped: report.skipped.len(),
            failures: report.failed,
            written,
            records,
        })
    }

    /// Write `records` off the async runtime, handing them back afterwards.
    async fn store(
        &self,
        records: Vec<Watchface>,
    ) -> Result<(usize, Vec<Watchface>), RepositoryError> {
        let repository = self.repository.clone();

        tokio::task::spawn_blocking(move || {
            repository.ensure_schema()?;
            let written = repository.upsert_all(&records)?;
            info!(
                "Stored {} watchfaces in {}",
                written,
                repository.db_path().display()
            );
            Ok((written, records))
        })
        .await
        .map_err(|e| RepositoryError::Io(std::io::Error::other(e)))?
    }
}
