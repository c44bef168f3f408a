//! Wire-level catalog types: listing entries and per-item detail payloads.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::Deserialize;

/// How a watchface is distributed in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistributionKind {
    Free,
    Coupon,
    Paid,
}

impl DistributionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionKind::Free => "FREE",
            DistributionKind::Coupon => "COUPON",
            DistributionKind::Paid => "PAID",
        }
    }
}

impl FromStr for DistributionKind {
    type Err = String;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("FREE") {
            Ok(DistributionKind::Free)
        } else if s.eq_ignore_ascii_case("COUPON") {
            Ok(DistributionKind::Coupon)
        } else if s.eq_ignore_ascii_case("PAID") {
            Ok(DistributionKind::Paid)
        } else {
            Err(format!("unknown distribution kind: {}", s))
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item from a listing page.
///
/// `distribution` is `None` when the listing omitted the field or carried a
/// value we don't recognise. The catalog filter drops such entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub distribution: Option<DistributionKind>,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, distribution: Option<DistributionKind>) -> Self {
        Self {
            id: id.into(),
            distribution,
        }
    }
}

/// Raw listing item as served by the catalog API.
///
/// Only the fields we read are declared; everything else in the object is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingItem {
    #[serde(default, deserialize_with = "id_as_string")]
    pub id: Option<String>,
    #[serde(default, alias = "distributionType")]
    pub distribution_kind: Option<String>,
}

/// Authoritative per-item payload from `GET {catalog}/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailPayload {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, alias = "distributionKind")]
    pub distribution_type: Option<String>,
    #[serde(default)]
    pub coupons_count: Option<i64>,
}

/// Availability of an item at scrape time, derived from its detail payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Free to install; coupons don't apply.
    Free,
    /// Coupon-gated with this many coupons left.
    Coupons(NonZeroU32),
    /// Coupon-gated with no coupons left.
    Exhausted,
    /// Paid only.
    Paid,
}

/// Accept ids served either as strings or as bare numbers.
fn id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
