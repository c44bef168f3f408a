//! Data models for catalog entries and scraped watchfaces.

mod catalog;
mod watchface;

pub use catalog::{Availability, CatalogEntry, DetailPayload, DistributionKind, ListingItem};
pub use watchface::{Pricing, Watchface, FREE_COUPON_SENTINEL};
