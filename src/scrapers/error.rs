//! Error types for catalog fetching, browser automation and extraction.

use std::time::Duration;

use thiserror::Error;

/// Failure talking to, or decoding, the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("watchface {id}: missing field `{field}`")]
    MissingField { id: String, field: &'static str },

    #[error("watchface {id}: invalid `{field}` value {value:?}")]
    InvalidField {
        id: String,
        field: &'static str,
        value: String,
    },

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl CatalogError {
    /// True for network and status failures, false for payload problems.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CatalogError::Http(_) | CatalogError::UnexpectedStatus { .. }
        )
    }
}

/// Failure driving the storefront browser.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("selector `{selector}` not found within {timeout:?}")]
    SelectorTimeout { selector: String, timeout: Duration },

    #[error("browser session error: {0}")]
    Session(String),

    #[error("browser support not compiled. Rebuild with: cargo build --features browser")]
    NotCompiled,
}

/// Why a single watchface extraction failed.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("extraction task aborted: {0}")]
    Aborted(String),
}
