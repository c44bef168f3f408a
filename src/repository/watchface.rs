//! Watchface repository for SQLite persistence.
//!
//! Connections are opened per operation and dropped right after, so nothing
//! is held open while extraction runs.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, Row};
use tracing::{debug, info, warn};

use super::{connect, to_option, RepositoryError, Result};
use crate::models::{Pricing, Watchface};

pub const WATCHFACES_TABLE: &str = "watchfaces";

/// Rows per transaction in [`WatchfaceRepository::upsert_all`].
pub const DEFAULT_BATCH_SIZE: usize = 1000;

const INSERT_SQL: &str = r#"
    INSERT OR REPLACE INTO watchfaces
        (playStoreUrl, scrapeTimeMillis, couponsUrl, imageUrls, isFree, remainingCoupons)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

/// SQLite-backed watchface repository.
#[derive(Debug, Clone)]
pub struct WatchfaceRepository {
    db_path: PathBuf,
    batch_size: usize,
}

impl WatchfaceRepository {
    /// Create a repository for the database at `db_path`. Does not touch the file.
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        connect(&self.db_path)
    }

    /// Create the watchfaces table if it doesn't exist.
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS watchfaces (
                playStoreUrl TEXT PRIMARY KEY NOT NULL,
                scrapeTimeMillis INTEGER NOT NULL,
                couponsUrl TEXT,
                imageUrls TEXT,
                isFree INTEGER NOT NULL,
                remainingCoupons INTEGER NOT NULL
            );
        "#,
        )
        .map_err(|e| {
            warn!("Error creating table '{}': {}", WATCHFACES_TABLE, e);
            RepositoryError::from(e)
        })?;
        info!("Table '{}' created or already exists.", WATCHFACES_TABLE);
        Ok(())
    }

    /// Insert or replace every record, keyed by storefront URL.
    ///
    /// Rows are written in transactions of `batch_size`, each on its own
    /// connection. Returns the number of rows written.
    pub fn upsert_all(&self, watchfaces: &[Watchface]) -> Result<usize> {
        if watchfaces.is_empty() {
            info!("No watchfaces provided to write.");
            return Ok(0);
        }

        info!("Writing {} watchfaces to the database...", watchfaces.len());

        let mut written = 0;
        for batch in watchfaces.chunks(self.batch_size) {
            self.write_batch(batch).map_err(|e| {
                warn!(
                    "Error writing watchfaces to table '{}' after {} rows: {}",
                    WATCHFACES_TABLE, written, e
                );
                e
            })?;
            written += batch.len();
            debug!("Executed batch of {} watchfaces.", batch.len());
        }

        info!(
            "Successfully wrote/updated {} watchfaces in table '{}'.",
            written, WATCHFACES_TABLE
        );
        Ok(written)
    }

    fn write_batch(&self, batch: &[Watchface]) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_SQL)?;
            for face in batch {
                stmt.execute(params![
                    face.play_store_url,
                    face.scrape_time_millis,
                    face.coupons_url,
                    serialize_image_urls(&face.image_urls)?,
                    face.is_free(),
                    face.remaining_coupons(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Get a watchface by storefront URL.
    pub fn get(&self, play_store_url: &str) -> Result<Option<Watchface>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM watchfaces WHERE playStoreUrl = ?")?;
        let row = to_option(stmt.query_row(params![play_store_url], read_row))?;
        row.map(StoredRow::into_watchface).transpose()
    }

    /// Get all watchfaces, most recently scraped first.
    pub fn get_all(&self) -> Result<Vec<Watchface>> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT * FROM watchfaces ORDER BY scrapeTimeMillis DESC, playStoreUrl")?;

        let rows = stmt
            .query_map([], read_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(StoredRow::into_watchface).collect()
    }

    /// Count stored watchfaces.
    pub fn count(&self) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM watchfaces", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Encode the URL list as a JSON array; empty lists become `[]`, never NULL.
pub fn serialize_image_urls(image_urls: &[String]) -> Result<String> {
    Ok(serde_json::to_string(image_urls)?)
}

/// Decode a stored URL list. NULL or blank reads as empty.
pub fn deserialize_image_urls(raw: Option<&str>) -> Result<Vec<String>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(json) => Ok(serde_json::from_str(json)?),
    }
}

/// Raw column values of one `watchfaces` row.
struct StoredRow {
    play_store_url: String,
    scrape_time_millis: i64,
    coupons_url: Option<String>,
    image_urls: Option<String>,
    is_free: bool,
    remaining_coupons: i64,
}

impl StoredRow {
    fn into_watchface(self) -> Result<Watchface> {
        let pricing = Pricing::from_columns(self.is_free, self.remaining_coupons).ok_or_else(
            || RepositoryError::InvalidRow {
                key: self.play_store_url.clone(),
                reason: format!(
                    "isFree={} with remainingCoupons={}",
                    self.is_free, self.remaining_coupons
                ),
            },
        )?;
        let image_urls = deserialize_image_urls(self.image_urls.as_deref())?;

        Ok(Watchface::with_scrape_time(
            self.scrape_time_millis,
            self.play_store_url,
            self.coupons_url.unwrap_or_default(),
            image_urls,
            pricing,
        ))
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow {
        play_store_url: row.get("playStoreUrl")?,
        scrape_time_millis: row.get("scrapeTimeMillis")?,
        coupons_url: row.get("couponsUrl")?,
        image_urls: row.get("imageUrls")?,
        is_free: row.get("isFree")?,
        remaining_coupons: row.get("remainingCoupons")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;
    use tempfile::TempDir;

    fn repo(dir: &TempDir) -> WatchfaceRepository {
        let repo = WatchfaceRepository::new(&dir.path().join("test.db"));
        repo.ensure_schema().unwrap();
        repo
    }

    fn face(url: &str, millis: i64, images: &[&str], pricing: Pricing) -> Watchface {
        Watchface::with_scrape_time(
            millis,
            url.to_string(),
            format!("https://facesapps.com/watchface/{}", millis),
            images.iter().map(|s| s.to_string()).collect(),
            pricing,
        )
    }

    #[test]
    fn image_url_encoding() {
        assert_eq!(serialize_image_urls(&[]).unwrap(), "[]");
        assert_eq!(
            serialize_image_urls(&["u1".to_string(), "u2".to_string()]).unwrap(),
            r#"["u1","u2"]"#
        );
        assert!(deserialize_image_urls(None).unwrap().is_empty());
        assert_eq!(
            deserialize_image_urls(Some(r#"["a","b"]"#)).unwrap(),
            vec!["a", "b"]
        );
        assert!(deserialize_image_urls(Some("{")).is_err());
    }

    #[test]
    fn ensure_schema_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        repo.ensure_schema().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn upsert_and_read_back() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        let coupons = Pricing::Coupons(NonZeroU32::new(4).unwrap());

        let written = repo
            .upsert_all(&[
                face("https://play.google.com/a", 10, &["u1", "u2"], Pricing::Free),
                face("https://play.google.com/b", 20, &[], coupons),
            ])
            .unwrap();
        assert_eq!(written, 2);

        let a = repo.get("https://play.google.com/a").unwrap().unwrap();
        assert_eq!(a.image_urls, vec!["u1", "u2"]);
        assert_eq!(a.remaining_coupons(), -1);
        assert_eq!(a.scrape_time_millis, 10);

        let b = repo.get("https://play.google.com/b").unwrap().unwrap();
        assert!(b.image_urls.is_empty());
        assert_eq!(b.pricing, coupons);

        let all = repo.get_all().unwrap();
        assert_eq!(all[0].play_store_url, "https://play.google.com/b");
        assert!(repo.get("https://play.google.com/missing").unwrap().is_none());
    }

    #[test]
    fn empty_images_stored_as_empty_list() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        repo.upsert_all(&[face("https://play.google.com/a", 1, &[], Pricing::Free)])
            .unwrap();

        let conn = Connection::open(repo.db_path()).unwrap();
        let (images, is_free): (Option<String>, i64) = conn
            .query_row("SELECT imageUrls, isFree FROM watchfaces", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(images.as_deref(), Some("[]"));
        assert_eq!(is_free, 1);
    }

    #[test]
    fn rescrape_replaces_row() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        repo.upsert_all(&[face("https://play.google.com/a", 1, &["old"], Pricing::Free)])
            .unwrap();
        repo.upsert_all(&[face("https://play.google.com/a", 2, &["new"], Pricing::Free)])
            .unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        let row = repo.get("https://play.google.com/a").unwrap().unwrap();
        assert_eq!(row.scrape_time_millis, 2);
        assert_eq!(row.image_urls, vec!["new"]);
    }

    #[test]
    fn upsert_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        let faces = vec![
            face("https://play.google.com/a", 1, &["u1"], Pricing::Free),
            face("https://play.google.com/b", 2, &["u2"], Pricing::Free),
        ];

        repo.upsert_all(&faces).unwrap();
        let once = repo.get_all().unwrap();
        repo.upsert_all(&faces).unwrap();
        let twice = repo.get_all().unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn partial_final_batch_is_flushed() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir).with_batch_size(2);
        let faces: Vec<_> = (0..5)
            .map(|i| face(&format!("https://play.google.com/{}", i), i, &[], Pricing::Free))
            .collect();

        assert_eq!(repo.upsert_all(&faces).unwrap(), 5);
        assert_eq!(repo.count().unwrap(), 5);
    }

    #[test]
    fn empty_upsert_does_not_touch_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never.db");
        let repo = WatchfaceRepository::new(&path);

        assert_eq!(repo.upsert_all(&[]).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn upsert_without_schema_reports_failure() {
        let dir = TempDir::new().unwrap();
        let repo = WatchfaceRepository::new(&dir.path().join("bare.db"));

        let err = repo
            .upsert_all(&[face("https://play.google.com/a", 1, &[], Pricing::Free)])
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Sqlite(_)));
    }
}
