//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use facescrape::scrapers::{
    BrowserError, CatalogClient, CatalogConfig, HttpClient, MediaHarvester,
};

pub const API_PATH: &str = "/api/watchface";

/// Catalog client pointed at `server`, walking `max_pages` pages of `page_size`.
pub fn catalog_client(server: &MockServer, page_size: u32, max_pages: u32) -> CatalogClient {
    let http = HttpClient::new(Duration::from_secs(5), Duration::ZERO)
        .expect("failed to build test HttpClient");
    CatalogClient::new(
        http,
        CatalogConfig {
            api_url: format!("{}{}", server.uri(), API_PATH),
            site_url: "https://facesapps.test".to_string(),
            start_page: 0,
            page_size,
            max_pages,
        },
    )
}

pub fn listing_item(id: &str, kind: &str) -> Value {
    json!({ "id": id, "distributionKind": kind, "name": format!("Face {id}") })
}

pub fn storefront(id: &str) -> String {
    format!("https://play.google.com/store/apps/details?id=face.{id}")
}

pub async fn mount_page(server: &MockServer, page: u32, items: Value) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(items))
        .mount(server)
        .await;
}

pub async fn mount_detail(server: &MockServer, id: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("{API_PATH}/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_free_detail(server: &MockServer, id: &str) {
    mount_detail(
        server,
        id,
        json!({ "link": storefront(id), "distributionType": "FREE" }),
    )
    .await;
}

pub async fn mount_coupon_detail(server: &MockServer, id: &str, coupons: i64) {
    mount_detail(
        server,
        id,
        json!({ "link": storefront(id), "distributionType": "COUPON", "couponsCount": coupons }),
    )
    .await;
}

/// Stands in for the browser: serves canned image lists per storefront URL.
#[derive(Clone, Default)]
pub struct FakeHarvester {
    images: Arc<HashMap<String, Vec<String>>>,
    failing: Arc<Vec<String>>,
    calls: Arc<AtomicUsize>,
}

impl FakeHarvester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_images(mut self, url: impl Into<String>, images: &[&str]) -> Self {
        Arc::make_mut(&mut self.images)
            .insert(url.into(), images.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Harvesting `url` fails as if the selector never appeared.
    pub fn failing_on(mut self, url: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.failing).push(url.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaHarvester for FakeHarvester {
    async fn harvest(&self, url: &str) -> Result<Vec<String>, BrowserError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.iter().any(|failing| failing == url) {
            return Err(BrowserError::SelectorTimeout {
                selector: "img.T75of.B5GQxf".to_string(),
                timeout: Duration::from_secs(30),
            });
        }
        Ok(self.images.get(url).cloned().unwrap_or_default())
    }
}
