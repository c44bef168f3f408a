//! Per-watchface detail extraction.
//!
//! One extraction is: fetch the detail payload, gate on availability, then
//! harvest screenshot URLs from the storefront page the payload links to.

use std::num::NonZeroU32;

use tracing::info;
use url::Url;

use super::browser::MediaHarvester;
use super::catalog::CatalogClient;
use super::error::{CatalogError, ExtractError};
use crate::models::{Availability, DetailPayload, DistributionKind, Pricing, Watchface};

/// Outcome of a successful extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Extracted(Watchface),
    /// The item is valid but must not be stored.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Coupon-gated with zero coupons left.
    NoCoupons,
    /// Detail payload says the item is paid.
    Paid,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoCoupons => "no coupons left",
            SkipReason::Paid => "paid",
        }
    }
}

/// Turns a catalog id into a [`Watchface`].
pub struct DetailExtractor<H> {
    catalog: CatalogClient,
    harvester: H,
}

impl<H: MediaHarvester> DetailExtractor<H> {
    pub fn new(catalog: CatalogClient, harvester: H) -> Self {
        Self { catalog, harvester }
    }

    /// Run one extraction. A single attempt; callers decide what a failure costs.
    pub async fn extract(&self, id: &str) -> Result<Extraction, ExtractError> {
        info!(id, "Scraping watchface");

        let detail = self.catalog.fetch_detail(id).await?;

        let pricing = match availability(id, &detail)? {
            Availability::Free => Pricing::Free,
            Availability::Coupons(count) => Pricing::Coupons(count),
            Availability::Exhausted => return Ok(Extraction::Skipped(SkipReason::NoCoupons)),
            Availability::Paid => return Ok(Extraction::Skipped(SkipReason::Paid)),
        };

        let link = storefront_link(id, &detail)?;
        let image_urls = self.harvester.harvest(&link).await?;

        Ok(Extraction::Extracted(Watchface::new(
            link,
            self.catalog.detail_page_url(id),
            image_urls,
            pricing,
        )))
    }
}

/// Decide availability from the detail payload.
///
/// Coupon items must carry a non-negative `couponsCount`.
pub fn availability(id: &str, detail: &DetailPayload) -> Result<Availability, CatalogError> {
    let raw = detail
        .distribution_type
        .as_deref()
        .ok_or_else(|| CatalogError::MissingField {
            id: id.to_string(),
            field: "distributionType",
        })?;

    let kind: DistributionKind = raw.parse().map_err(|_| CatalogError::InvalidField {
        id: id.to_string(),
        field: "distributionType",
        value: raw.to_string(),
    })?;

    match kind {
        DistributionKind::Free => Ok(Availability::Free),
        DistributionKind::Paid => Ok(Availability::Paid),
        DistributionKind::Coupon => {
            let count = detail
                .coupons_count
                .ok_or_else(|| CatalogError::MissingField {
                    id: id.to_string(),
                    field: "couponsCount",
                })?;
            let count = u32::try_from(count).map_err(|_| CatalogError::InvalidField {
                id: id.to_string(),
                field: "couponsCount",
                value: count.to_string(),
            })?;
            Ok(NonZeroU32::new(count).map_or(Availability::Exhausted, Availability::Coupons))
        }
    }
}

/// The storefront URL; must be an absolute http(s) URL.
pub fn storefront_link(id: &str, detail: &DetailPayload) -> Result<String, CatalogError> {
    let link = detail
        .link
        .as_deref()
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .ok_or_else(|| CatalogError::MissingField {
            id: id.to_string(),
            field: "link",
        })?;

    match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(link.to_string()),
        _ => Err(CatalogError::InvalidField {
            id: id.to_string(),
            field: "link",
            value: link.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(kind: Option<&str>, coupons: Option<i64>) -> DetailPayload {
        DetailPayload {
            link: Some("https://play.google.com/store/apps/details?id=x".to_string()),
            distribution_type: kind.map(str::to_string),
            coupons_count: coupons,
        }
    }

    #[test]
    fn free_items_ignore_coupon_count() {
        assert_eq!(
            availability("a", &detail(Some("FREE"), None)).unwrap(),
            Availability::Free
        );
        assert_eq!(
            availability("a", &detail(Some("free"), Some(0))).unwrap(),
            Availability::Free
        );
    }

    #[test]
    fn zero_coupons_is_exhausted() {
        assert_eq!(
            availability("a", &detail(Some("COUPON"), Some(0))).unwrap(),
            Availability::Exhausted
        );
    }

    #[test]
    fn positive_coupons() {
        assert_eq!(
            availability("a", &detail(Some("COUPON"), Some(25))).unwrap(),
            Availability::Coupons(NonZeroU32::new(25).unwrap())
        );
    }

    #[test]
    fn paid_detail() {
        assert_eq!(
            availability("a", &detail(Some("PAID"), None)).unwrap(),
            Availability::Paid
        );
    }

    #[test]
    fn malformed_payloads_are_parse_failures() {
        let missing_kind = availability("a", &detail(None, Some(3))).unwrap_err();
        assert!(matches!(
            missing_kind,
            CatalogError::MissingField { field: "distributionType", .. }
        ));

        let unknown_kind = availability("a", &detail(Some("TRIAL"), None)).unwrap_err();
        assert!(matches!(unknown_kind, CatalogError::InvalidField { .. }));

        let missing_count = availability("a", &detail(Some("COUPON"), None)).unwrap_err();
        assert!(matches!(
            missing_count,
            CatalogError::MissingField { field: "couponsCount", .. }
        ));

        let negative = availability("a", &detail(Some("COUPON"), Some(-2))).unwrap_err();
        assert!(matches!(negative, CatalogError::InvalidField { .. }));
        assert!(!negative.is_transport());
    }

    #[test]
    fn storefront_link_validation() {
        let ok = storefront_link("a", &detail(Some("FREE"), None)).unwrap();
        assert!(ok.starts_with("https://play.google.com/"));

        let mut blank = detail(Some("FREE"), None);
        blank.link = Some("   ".to_string());
        assert!(matches!(
            storefront_link("a", &blank),
            Err(CatalogError::MissingField { field: "link", .. })
        ));

        let mut relative = detail(Some("FREE"), None);
        relative.link = Some("/store/apps/x".to_string());
        assert!(matches!(
            storefront_link("a", &relative),
            Err(CatalogError::InvalidField { field: "link", .. })
        ));
    }
}
