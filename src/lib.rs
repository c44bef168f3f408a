//! facescrape - watchface catalog scraper.
//!
//! Lists the facesapps watchface catalog, keeps the entries that can be
//! obtained for free or with a coupon, harvests their storefront screenshots
//! with a headless browser and stores the results in SQLite.

pub mod cli;
pub mod config;
pub mod models;
pub mod repository;
pub mod scrapers;
pub mod services;
