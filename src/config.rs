//! Configuration management for facescrape.
//!
//! Settings start from built-in defaults, then a TOML config file (if one is
//! found) is applied on top, then CLI flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repository::DEFAULT_BATCH_SIZE;
use crate::scrapers::{BrowserEngineConfig, CatalogConfig, DEFAULT_WORKERS};

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "facescrape.db";

/// Config filename looked up in the working directory.
pub const CONFIG_FILENAME: &str = "facescrape.toml";

pub const DEFAULT_API_URL: &str = "https://api.facesapps.com/api/watchface";
pub const DEFAULT_SITE_URL: &str = "https://facesapps.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to create data directory '{path}': {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename inside `data_dir`.
    pub database_filename: String,
    /// Catalog listing endpoint.
    pub api_url: String,
    /// Public catalog site (detail pages).
    pub site_url: String,
    /// First listing page to request.
    pub start_page: u32,
    /// Items per listing page.
    pub page_size: u32,
    /// Upper bound on listing pages per run.
    pub max_pages: u32,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Delay after each API request in milliseconds.
    pub request_delay_ms: u64,
    /// User agent for API requests: None, "impersonate", or a custom string.
    pub user_agent: Option<String>,
    /// Concurrent storefront extractions.
    pub workers: usize,
    /// Rows per write transaction.
    pub batch_size: usize,
    /// Storefront browser options.
    pub browser: BrowserEngineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        // Platform data dir -> Home dir -> Current dir
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .map(|dir| dir.join("facescrape"))
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            start_page: 0,
            page_size: 10,
            max_pages: 1,
            request_timeout: 15,
            request_delay_ms: 0,
            user_agent: None,
            workers: DEFAULT_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
            browser: BrowserEngineConfig::default(),
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Get the full path to the database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            api_url: self.api_url.clone(),
            site_url: self.site_url.clone(),
            start_page: self.start_page,
            page_size: self.page_size.max(1),
            max_pages: self.max_pages,
        }
    }

    /// Point at a data directory or, for a `.db` path, a database file.
    pub fn apply_target(&mut self, target: &Path) {
        let is_db_file = target
            .extension()
            .is_some_and(|ext| ext == "db" || ext == "sqlite" || ext == "sqlite3");

        if is_db_file {
            if let Some(name) = target.file_name() {
                self.database_filename = name.to_string_lossy().into_owned();
            }
            self.data_dir = target
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
        } else {
            self.data_dir = target.to_path_buf();
        }
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        tracing::debug!("Ensuring data directory {}", self.data_dir.display());
        fs::create_dir_all(&self.data_dir).map_err(|source| ConfigError::DataDir {
            path: self.data_dir.clone(),
            source,
        })
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Catalog listing endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Catalog site URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Delay between requests in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_delay_ms: Option<u64>,
    /// User agent string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Concurrent storefront extractions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Rows per write transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    /// Browser options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserEngineConfig>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Find a config file: `./facescrape.toml`, then the user config dir.
    pub fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILENAME);
        if local.is_file() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("facescrape").join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(ref api_url) = self.api_url {
            settings.api_url = api_url.clone();
        }
        if let Some(ref site_url) = self.site_url {
            settings.site_url = site_url.clone();
        }
        if let Some(start_page) = self.start_page {
            settings.start_page = start_page;
        }
        if let Some(page_size) = self.page_size {
            settings.page_size = page_size;
        }
        if let Some(max_pages) = self.max_pages {
            settings.max_pages = max_pages;
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(delay) = self.request_delay_ms {
            settings.request_delay_ms = delay;
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(workers) = self.workers {
            settings.workers = workers;
        }
        if let Some(batch_size) = self.batch_size {
            settings.batch_size = batch_size;
        }
        if let Some(ref browser) = self.browser {
            settings.browser = browser.clone();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (skips discovery).
    pub config_path: Option<PathBuf>,
    /// Data directory or database file (overrides the config file).
    pub target: Option<PathBuf>,
    /// Resolve relative config paths from the working directory.
    pub use_cwd: bool,
}

/// Build settings from defaults, the config file and `options`.
pub fn load_settings(options: &LoadOptions) -> Result<(Settings, Config), ConfigError> {
    let mut settings = Settings::default();

    let config_path = options.config_path.clone().or_else(Config::discover);
    let config = match config_path {
        Some(ref path) => {
            tracing::debug!("Loading config from {}", path.display());
            Config::load_from_path(path)?
        }
        None => Config::default(),
    };

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = if options.use_cwd {
        cwd
    } else {
        config.base_dir().unwrap_or(cwd)
    };
    config.apply_to_settings(&mut settings, &base_dir);

    if let Some(ref target) = options.target {
        settings.apply_target(target);
    }

    Ok((settings, config))
}
