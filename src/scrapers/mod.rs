//! Catalog discovery and storefront extraction.

pub mod browser;
pub mod catalog;
pub mod coordinator;
pub mod error;
pub mod extract;
pub mod filter;
mod http_client;

#[cfg(feature = "browser")]
pub use browser::BrowserSession;
pub use browser::{BrowserEngineConfig, ChromeHarvester, MediaHarvester};
pub use catalog::{parse_catalog_page, CatalogClient, CatalogConfig, CatalogPage};
pub use coordinator::{ExtractionCoordinator, ExtractionReport, DEFAULT_WORKERS};
pub use error::{BrowserError, CatalogError, ExtractError};
pub use extract::{DetailExtractor, Extraction, SkipReason};
pub use filter::{candidate_ids, filter_catalog};
pub use http_client::{HttpClient, USER_AGENT};
