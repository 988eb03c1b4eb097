use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use chrono_tz::Tz;

use crate::domain::{CatalogKind, Domain};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// List and detail URL templates for one catalog product kind.
///
/// `list_url` contains a `{page}` placeholder and `detail_url` a
/// `{product_id}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEndpoints {
    pub list_url: String,
    pub detail_url: String,
}

impl CatalogEndpoints {
    #[must_use]
    pub fn detail_page_url(&self, product_id: i64) -> String {
        self.detail_url
            .replace("{product_id}", &product_id.to_string())
    }
}

/// Upstream source locations. A domain with no URL is "not configured".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceConfig {
    pub assets_url: Option<String>,
    pub cars_url: Option<String>,
    pub motorcycles_url: Option<String>,
    pub catalog: BTreeMap<CatalogKind, CatalogEndpoints>,
}

impl SourceConfig {
    #[must_use]
    pub fn is_configured(&self, domain: Domain) -> bool {
        match domain {
            Domain::Assets => self.assets_url.is_some(),
            Domain::Cars => self.cars_url.is_some(),
            Domain::Motorcycles => self.motorcycles_url.is_some(),
            Domain::Catalog(kind) => self.catalog.contains_key(&kind),
        }
    }

    /// Domains with a source location, in [`Domain::ALL`] order.
    #[must_use]
    pub fn configured_domains(&self) -> Vec<Domain> {
        Domain::ALL
            .into_iter()
            .filter(|d| self.is_configured(*d))
            .collect()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub asset_names_path: PathBuf,
    pub source_timezone: Tz,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scraper_request_timeout_secs: u64,
    pub scraper_max_retries: u32,
    pub scraper_retry_delay_secs: u64,
    pub scraper_inter_request_delay_ms: u64,
    pub worker_concurrency: usize,
    pub default_max_pages: u32,
    pub motorcycles_page_size: u32,
    pub sources: SourceConfig,
    pub schedules: BTreeMap<Domain, String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("asset_names_path", &self.asset_names_path)
            .field("source_timezone", &self.source_timezone)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field("scraper_retry_delay_secs", &self.scraper_retry_delay_secs)
            .field(
                "scraper_inter_request_delay_ms",
                &self.scraper_inter_request_delay_ms,
            )
            .field("worker_concurrency", &self.worker_concurrency)
            .field("default_max_pages", &self.default_max_pages)
            .field("motorcycles_page_size", &self.motorcycles_page_size)
            .field("sources", &self.sources)
            .field("schedules", &self.schedules)
            .finish()
    }
}
