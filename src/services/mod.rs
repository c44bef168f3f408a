//! Service layer for facescrape.
//!
//! Domain logic separated from the CLI; the binary is one caller among many.

pub mod scrape;

pub use scrape::{ScrapeOptions, ScrapeService, ScrapeSummary};
