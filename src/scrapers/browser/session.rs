//! Scoped Chrome sessions over CDP.
//!
//! A session owns one browser (launched or remote) plus one page. It is
//! always torn down by [`BrowserSession::scoped`], whatever the body returns;
//! if the owning task is cancelled or panics, `Drop` aborts the CDP handler
//! and chromiumoxide kills the child process.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::config::BrowserEngineConfig;
use crate::scrapers::error::BrowserError;
use crate::scrapers::http_client::BROWSER_USER_AGENT;

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);
const SCROLL_STEP_PX: u32 = 200;

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    // Common install locations
    "/opt/google/chrome/google-chrome",
];

pub struct BrowserSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    /// Connected to someone else's Chrome; leave it running on close.
    remote: bool,
}

impl BrowserSession {
    /// Open a session, run `body` against its page, then release everything.
    pub async fn scoped<F, Fut, T>(config: &BrowserEngineConfig, body: F) -> Result<T, BrowserError>
    where
        F: FnOnce(Page) -> Fut,
        Fut: Future<Output = Result<T, BrowserError>>,
    {
        let mut session = Self::open(config).await?;
        let page = session.page()?;
        let result = body(page).await;
        session.close().await;
        result
    }

    /// Launch (or connect to) Chrome and open a blank page with our user agent.
    pub async fn open(config: &BrowserEngineConfig) -> Result<Self, BrowserError> {
        let (browser, handler, remote) = match config.remote_url.as_deref() {
            Some(remote_url) => {
                let (browser, handler) = connect_remote(remote_url).await?;
                (browser, handler, true)
            }
            None => {
                let (browser, handler) = launch(config).await?;
                (browser, handler, false)
            }
        };

        let mut session = Self {
            browser: Some(browser),
            page: None,
            handler: Some(handler),
            remote,
        };

        let page = match session.browser.as_ref() {
            Some(browser) => browser
                .new_page("about:blank")
                .await
                .map_err(|e| BrowserError::Session(e.to_string()))?,
            None => return Err(BrowserError::Session("browser already closed".to_string())),
        };
        page.execute(SetUserAgentOverrideParams::new(
            BROWSER_USER_AGENT.to_string(),
        ))
        .await
        .map_err(|e| BrowserError::Session(e.to_string()))?;

        session.page = Some(page);
        Ok(session)
    }

    pub fn page(&self) -> Result<Page, BrowserError> {
        self.page
            .clone()
            .ok_or_else(|| BrowserError::Session("page already closed".to_string()))
    }

    /// Close the page, then the browser process and its handler task.
    pub async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("Page close failed: {}", e);
            }
        }

        if let Some(mut browser) = self.browser.take() {
            if !self.remote {
                if let Err(e) = browser.close().await {
                    debug!("Browser close failed: {}", e);
                }
                if let Err(e) = browser.wait().await {
                    debug!("Waiting for browser exit failed: {}", e);
                }
            }
        }

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

/// Navigate `page` to `url` and wait for the load event.
pub async fn navigate(page: &Page, url: &str) -> Result<(), BrowserError> {
    info!("Navigating to {}", url);
    let params = NavigateParams::builder()
        .url(url)
        .build()
        .map_err(|e| BrowserError::Navigation {
            url: url.to_string(),
            reason: e,
        })?;

    page.goto(params)
        .await
        .map_err(|e| BrowserError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    Ok(())
}

/// Scroll down in fixed steps so lazily loaded elements get rendered.
pub async fn scroll_page(page: &Page, steps: u32) {
    for _ in 0..steps {
        let script = format!("window.scrollBy(0, {})", SCROLL_STEP_PX);
        if let Err(e) = page.evaluate(script).await {
            debug!("Scroll step failed: {}", e);
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Poll until at least one element matches `selector`, or time out.
pub async fn wait_for_selector(
    page: &Page,
    selector: &str,
    timeout: Duration,
) -> Result<Vec<Element>, BrowserError> {
    let poll = async {
        loop {
            match page.find_elements(selector).await {
                Ok(elements) if !elements.is_empty() => return elements,
                Ok(_) => {}
                Err(e) => debug!("Selector query failed, retrying: {}", e),
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    };

    tokio::time::timeout(timeout, poll)
        .await
        .map_err(|_| BrowserError::SelectorTimeout {
            selector: selector.to_string(),
            timeout,
        })
}

/// Image source of each element on `url`, in the order given. Elements
/// without a usable `src` (or lazy-load `data-src`) are skipped.
pub async fn collect_sources(url: &str, elements: &[Element]) -> Vec<String> {
    let mut sources = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        let mut values = Vec::with_capacity(SOURCE_ATTRIBUTES.len());
        for attribute in SOURCE_ATTRIBUTES {
            match element.attribute(attribute).await {
                Ok(value) => values.push(value),
                Err(e) => {
                    debug!(url, index, "Reading {} failed: {}", attribute, e);
                    values.push(None);
                }
            }
        }
        match first_source(values) {
            Some(value) => sources.push(value),
            None => warn!(url, index, "Media element without source attribute, skipping"),
        }
    }
    sources
}

/// Attributes that may carry an image source, in order of preference.
const SOURCE_ATTRIBUTES: [&str; 2] = ["src", "data-src"];

/// First non-blank attribute value.
fn first_source(values: Vec<Option<String>>) -> Option<String> {
    values
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

async fn launch(config: &BrowserEngineConfig) -> Result<(Browser, JoinHandle<()>), BrowserError> {
    info!("Launching browser (headless={})", config.headless);

    let chrome_path = find_chrome()?;
    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .request_timeout(config.timeout());

    // with_head means NOT headless
    if !config.headless {
        builder = builder.with_head();
    }

    if let Some(ref proxy) = config.proxy {
        builder = builder.arg(format!("--proxy-server={}", proxy));
    }

    builder = builder
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-dev-shm-usage")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-background-networking")
        .arg("--disable-sync")
        .arg("--disable-translate")
        .arg("--no-sandbox")
        .arg("--disable-gpu");

    for arg in &config.chrome_args {
        builder = builder.arg(arg);
    }

    let browser_config = builder.build().map_err(BrowserError::Launch)?;

    let (browser, handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| BrowserError::Launch(e.to_string()))?;

    Ok((browser, spawn_handler(handler)))
}

async fn connect_remote(url: &str) -> Result<(Browser, JoinHandle<()>), BrowserError> {
    info!("Connecting to remote browser at {}", url);

    // Get WebSocket URL from the /json/version endpoint
    let http_url = url
        .replace("ws://", "http://")
        .replace("wss://", "https://");
    let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

    let resp: serde_json::Value = reqwest::get(&version_url)
        .await
        .map_err(|e| BrowserError::Launch(format!("failed to reach remote browser: {}", e)))?
        .json()
        .await
        .map_err(|e| BrowserError::Launch(format!("bad browser version info: {}", e)))?;

    let ws_url = resp
        .get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .ok_or_else(|| BrowserError::Launch("no webSocketDebuggerUrl in response".to_string()))?;

    let (browser, handler) = Browser::connect(ws_url)
        .await
        .map_err(|e| BrowserError::Launch(e.to_string()))?;

    Ok((browser, spawn_handler(handler)))
}

fn spawn_handler(mut handler: chromiumoxide::Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    })
}

/// Find a Chrome executable on disk or in PATH.
fn find_chrome() -> Result<PathBuf, BrowserError> {
    for path in CHROME_PATHS {
        let p = std::path::Path::new(path);
        if p.exists() {
            debug!("Found Chrome at: {}", path);
            return Ok(p.to_path_buf());
        }
    }

    for cmd in &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    debug!("Found Chrome in PATH: {}", path);
                    return Ok(PathBuf::from(path));
                }
            }
        }
    }

    Err(BrowserError::Launch(
        "Chrome/Chromium not found. Install chromium or set browser.remote_url".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_source_prefers_src_then_data_src() {
        assert_eq!(
            first_source(vec![Some("a.png".into()), Some("b.png".into())]),
            Some("a.png".to_string())
        );
        assert_eq!(
            first_source(vec![Some("  ".into()), Some("lazy.png".into())]),
            Some("lazy.png".to_string())
        );
        assert_eq!(first_source(vec![None, Some("lazy.png".into())]), Some("lazy.png".to_string()));
    }

    #[test]
    fn first_source_is_none_without_usable_attribute() {
        assert_eq!(first_source(vec![None, None]), None);
        assert_eq!(first_source(vec![Some(String::new()), None]), None);
    }
}
