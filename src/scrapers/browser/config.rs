//! Browser engine configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Screenshot images in the Play Store listing carousel.
pub const DEFAULT_MEDIA_SELECTOR: &str = "img.T75of.B5GQxf";

/// Browser engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    /// Set to false to watch the storefront pages load.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080").
    #[serde(default)]
    pub proxy: Option<String>,

    /// Navigation and selector wait timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// CSS selector matching the media elements to harvest.
    #[serde(default = "default_media_selector")]
    pub media_selector: String,

    /// Scroll this many 200px steps before waiting, for lazily loaded media.
    #[serde(default)]
    pub scroll_steps: u32,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            proxy: None,
            timeout: default_timeout(),
            media_selector: default_media_selector(),
            scroll_steps: 0,
            chrome_args: Vec::new(),
            remote_url: None,
        }
    }
}

impl BrowserEngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

pub fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    30
}

pub fn default_media_selector() -> String {
    DEFAULT_MEDIA_SELECTOR.to_string()
}
