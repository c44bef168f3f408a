//! Scraped watchface record.

use std::num::NonZeroU32;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Stored in `remainingCoupons` for free watchfaces.
pub const FREE_COUPON_SENTINEL: i64 = -1;

/// How the watchface can be obtained.
///
/// Coupon-gated faces always have at least one coupon left; exhausted items are
/// never turned into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "remaining")]
pub enum Pricing {
    Free,
    Coupons(NonZeroU32),
}

impl Pricing {
    pub fn is_free(&self) -> bool {
        matches!(self, Pricing::Free)
    }

    /// Coupon count as persisted: `-1` when free.
    pub fn remaining_coupons(&self) -> i64 {
        match self {
            Pricing::Free => FREE_COUPON_SENTINEL,
            Pricing::Coupons(n) => i64::from(n.get()),
        }
    }

    /// Rebuild pricing from the stored `(isFree, remainingCoupons)` columns.
    /// Returns `None` for combinations we never write.
    pub fn from_columns(is_free: bool, remaining_coupons: i64) -> Option<Self> {
        if is_free {
            return (remaining_coupons == FREE_COUPON_SENTINEL).then_some(Pricing::Free);
        }
        u32::try_from(remaining_coupons)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Pricing::Coupons)
    }
}

/// A watchface as harvested from its storefront page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watchface {
    /// Canonical storefront URL; primary key in storage.
    pub play_store_url: String,
    /// Catalog detail page the item was discovered on.
    pub coupons_url: String,
    /// Screenshot URLs in page order.
    pub image_urls: Vec<String>,
    pub pricing: Pricing,
    /// Capture time in Unix milliseconds.
    pub scrape_time_millis: i64,
}

impl Watchface {
    /// Create a record stamped with the current time.
    pub fn new(
        play_store_url: String,
        coupons_url: String,
        image_urls: Vec<String>,
        pricing: Pricing,
    ) -> Self {
        Self::with_scrape_time(
            Utc::now().timestamp_millis(),
            play_store_url,
            coupons_url,
            image_urls,
            pricing,
        )
    }

    /// Create a record with an explicit capture time (used when loading rows).
    pub fn with_scrape_time(
        scrape_time_millis: i64,
        play_store_url: String,
        coupons_url: String,
        image_urls: Vec<String>,
        pricing: Pricing,
    ) -> Self {
        Self {
            play_store_url,
            coupons_url,
            image_urls,
            pricing,
            scrape_time_millis,
        }
    }

    pub fn is_free(&self) -> bool {
        self.pricing.is_free()
    }

    pub fn remaining_coupons(&self) -> i64 {
        self.pricing.remaining_coupons()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_pricing_uses_sentinel() {
        let face = Watchface::new(
            "https://play.google.com/x".to_string(),
            "https://facesapps.com/watchface/a".to_string(),
            vec![],
            Pricing::Free,
        );

        assert!(face.is_free());
        assert_eq!(face.remaining_coupons(), -1);
        assert!(face.scrape_time_millis > 0);
    }

    #[test]
    fn coupon_pricing_reports_count() {
        let pricing = Pricing::Coupons(NonZeroU32::new(7).unwrap());
        assert!(!pricing.is_free());
        assert_eq!(pricing.remaining_coupons(), 7);
    }

    #[test]
    fn pricing_from_columns() {
        assert_eq!(Pricing::from_columns(true, -1), Some(Pricing::Free));
        assert_eq!(
            Pricing::from_columns(false, 3),
            Some(Pricing::Coupons(NonZeroU32::new(3).unwrap()))
        );
        assert_eq!(Pricing::from_columns(false, 0), None);
        assert_eq!(Pricing::from_columns(false, -1), None);
        assert_eq!(Pricing::from_columns(true, 5), None);
    }
}
