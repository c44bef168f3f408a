//! HTTP client for the catalog JSON API.

mod response;
mod user_agent;

pub use response::{body_excerpt, HttpResponse};
pub use user_agent::{resolve_user_agent, BROWSER_USER_AGENT, USER_AGENT};

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::CatalogError;

/// Thin wrapper over a shared `reqwest::Client` with timing logs and an
/// optional fixed delay after every request.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_delay: Duration,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(timeout: Duration, request_delay: Duration) -> Result<Self, CatalogError> {
        Self::with_user_agent(timeout, request_delay, None)
    }

    /// Create a new HTTP client with custom user agent configuration.
    /// - None: Use default facescrape user agent
    /// - Some("impersonate"): Use random real browser user agent
    /// - Some(custom): Use custom user agent string
    pub fn with_user_agent(
        timeout: Duration,
        request_delay: Duration,
        user_agent_config: Option<&str>,
    ) -> Result<Self, CatalogError> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            request_delay,
        })
    }

    /// Make a GET request asking for JSON.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        debug!(
            url,
            status = response.status().as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "GET"
        );

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        Ok(HttpResponse {
            status: response.status(),
            content_type,
            response,
        })
    }

    /// GET `url` and decode a 200 body as `T`.
    ///
    /// Any non-success status is an error; the body is logged for diagnosis.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let response = self.get(url).await?;
        let status = response.status;

        if !response.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                url,
                status = status.as_u16(),
                body = %body_excerpt(&body, 200),
                "request failed"
            );
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response.content_type.clone();
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| CatalogError::Deserialize {
            context: match content_type {
                Some(content_type) => format!("{} ({})", url, content_type),
                None => url.to_string(),
            },
            source,
        })
    }
}
