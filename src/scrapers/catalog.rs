//! Catalog API client: paginated listing and per-item detail lookups.

use tracing::{debug, info, warn};
use url::Url;

use super::error::CatalogError;
use super::http_client::HttpClient;
use crate::models::{CatalogEntry, DetailPayload, ListingItem};

/// Where the catalog lives and how much of it to walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Listing endpoint, e.g. `https://api.facesapps.com/api/watchface`.
    pub api_url: String,
    /// Public site; detail pages live under `{site_url}/watchface/{id}`.
    pub site_url: String,
    pub start_page: u32,
    pub page_size: u32,
    pub max_pages: u32,
}

/// Client for the vendor's watchface catalog.
#[derive(Clone)]
pub struct CatalogClient {
    http: HttpClient,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(http: HttpClient, config: CatalogConfig) -> Self {
        Self { http, config }
    }

    /// `GET {api_url}?page={page}&limit={page_size}`
    pub fn page_url(&self, page: u32) -> Result<String, CatalogError> {
        let mut url = parse_url(&self.config.api_url)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &self.config.page_size.to_string());
        Ok(url.to_string())
    }

    /// `GET {api_url}/{id}`
    pub fn detail_url(&self, id: &str) -> Result<String, CatalogError> {
        append_segment(&self.config.api_url, id)
    }

    /// Public page for a watchface, stored alongside the record.
    pub fn detail_page_url(&self, id: &str) -> String {
        format!(
            "{}/watchface/{}",
            self.config.site_url.trim_end_matches('/'),
            id
        )
    }

    /// Fetch every configured listing page.
    ///
    /// Never fails: a page that errors contributes nothing and the walk moves
    /// on. A page shorter than `page_size` is treated as the last one.
    pub async fn fetch_catalog(&self) -> Vec<CatalogEntry> {
        info!(
            api = %self.config.api_url,
            pages = self.config.max_pages,
            page_size = self.config.page_size,
            "Fetching watchface catalog"
        );

        let mut entries = Vec::new();
        let first = self.config.start_page;
        let last = first.saturating_add(self.config.max_pages);

        for page in first..last {
            match self.fetch_page(page).await {
                Ok(page_entries) => {
                    let raw_len = page_entries.raw_len;
                    debug!(page, items = raw_len, "Fetched catalog page");
                    entries.extend(page_entries.entries);
                    if raw_len < self.config.page_size as usize {
                        break;
                    }
                }
                Err(e) => {
                    warn!(page, error = %e, "Catalog page fetch failed, skipping");
                }
            }
        }

        info!("Fetched {} catalog entries", entries.len());
        entries
    }

    /// Fetch and decode one listing page.
    pub async fn fetch_page(&self, page: u32) -> Result<CatalogPage, CatalogError> {
        let url = self.page_url(page)?;
        let items: Vec<serde_json::Value> = self.http.get_json(&url).await?;
        Ok(parse_catalog_page(items))
    }

    /// Fetch the authoritative detail payload for one watchface.
    pub async fn fetch_detail(&self, id: &str) -> Result<DetailPayload, CatalogError> {
        let url = self.detail_url(id)?;
        self.http.get_json(&url).await
    }
}

/// Decoded listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    /// Items the server returned, including ones we couldn't decode.
    pub raw_len: usize,
}

/// Decode listing items one by one so a bad record only costs itself.
pub fn parse_catalog_page(items: Vec<serde_json::Value>) -> CatalogPage {
    let raw_len = items.len();
    let mut entries = Vec::with_capacity(raw_len);

    for (index, value) in items.into_iter().enumerate() {
        let item: ListingItem = match serde_json::from_value(value) {
            Ok(item) => item,
            Err(e) => {
                warn!(index, error = %e, "Skipping undecodable catalog item");
                continue;
            }
        };

        let Some(id) = item.id else {
            debug!(index, "Skipping catalog item without id");
            continue;
        };

        let distribution = item
            .distribution_kind
            .as_deref()
            .and_then(|kind| kind.parse().ok());

        entries.push(CatalogEntry::new(id, distribution));
    }

    CatalogPage { entries, raw_len }
}

fn parse_url(raw: &str) -> Result<Url, CatalogError> {
    Url::parse(raw).map_err(|source| CatalogError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

fn append_segment(base: &str, segment: &str) -> Result<String, CatalogError> {
    let mut url = parse_url(base)?;
    url.path_segments_mut()
        .map_err(|_| CatalogError::InvalidUrl {
            url: base.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        })?
        .pop_if_empty()
        .push(segment);
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DistributionKind;
    use serde_json::json;
    use std::time::Duration;

    fn client() -> CatalogClient {
        CatalogClient::new(
            HttpClient::new(Duration::from_secs(5), Duration::ZERO).unwrap(),
            CatalogConfig {
                api_url: "https://api.example.com/api/watchface".to_string(),
                site_url: "https://example.com/".to_string(),
                start_page: 0,
                page_size: 10,
                max_pages: 1,
            },
        )
    }

    #[test]
    fn builds_page_url() {
        assert_eq!(
            client().page_url(3).unwrap(),
            "https://api.example.com/api/watchface?page=3&limit=10"
        );
    }

    #[test]
    fn builds_detail_urls() {
        let c = client();
        assert_eq!(
            c.detail_url("abc").unwrap(),
            "https://api.example.com/api/watchface/abc"
        );
        assert_eq!(
            c.detail_url("a b").unwrap(),
            "https://api.example.com/api/watchface/a%20b"
        );
        assert_eq!(
            c.detail_page_url("abc"),
            "https://example.com/watchface/abc"
        );
    }

    #[test]
    fn parse_page_skips_missing_ids_and_keeps_unknown_kinds() {
        let page = parse_catalog_page(vec![
            json!({"id": "a", "distributionKind": "FREE"}),
            json!({"distributionKind": "FREE"}),
            json!({"id": "c", "distributionType": "coupon"}),
            json!({"id": "d"}),
            json!({"id": "e", "distributionKind": "BUNDLE"}),
            json!("not an object"),
        ]);

        assert_eq!(page.raw_len, 6);
        assert_eq!(
            page.entries,
            vec![
                CatalogEntry::new("a", Some(DistributionKind::Free)),
                CatalogEntry::new("c", Some(DistributionKind::Coupon)),
                CatalogEntry::new("d", None),
                CatalogEntry::new("e", None),
            ]
        );
    }
}
