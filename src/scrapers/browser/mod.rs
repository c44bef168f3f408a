//! Storefront media harvesting through a real browser.
//!
//! The Play Store renders its screenshot carousel client-side, so media URLs
//! are read from a live page driven by chromiumoxide (CDP).

mod config;
#[cfg(feature = "browser")]
mod session;

pub use config::{BrowserEngineConfig, DEFAULT_MEDIA_SELECTOR};
#[cfg(feature = "browser")]
pub use session::BrowserSession;

use async_trait::async_trait;

use super::error::BrowserError;

/// Reads media URLs from a storefront page.
#[async_trait]
pub trait MediaHarvester: Send + Sync {
    /// Image sources of every matching media element on `url`, in page order.
    async fn harvest(&self, url: &str) -> Result<Vec<String>, BrowserError>;
}

/// Harvester backed by a fresh Chrome session per page.
#[derive(Debug, Clone)]
pub struct ChromeHarvester {
    config: BrowserEngineConfig,
}

impl ChromeHarvester {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl MediaHarvester for ChromeHarvester {
    async fn harvest(&self, url: &str) -> Result<Vec<String>, BrowserError> {
        let selector = self.config.media_selector.as_str();
        let timeout = self.config.timeout();
        let scroll_steps = self.config.scroll_steps;

        BrowserSession::scoped(&self.config, |page| async move {
            session::navigate(&page, url).await?;
            if scroll_steps > 0 {
                session::scroll_page(&page, scroll_steps).await;
            }
            let elements = session::wait_for_selector(&page, selector, timeout).await?;
            tracing::debug!(url, matched = elements.len(), "Media elements found");
            Ok(session::collect_sources(url, &elements).await)
        })
        .await
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
#[async_trait]
impl MediaHarvester for ChromeHarvester {
    async fn harvest(&self, _url: &str) -> Result<Vec<String>, BrowserError> {
        Err(BrowserError::NotCompiled)
    }
}
