//! Offline unit tests for pricedb-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use pricedb_core::{AppConfig, Environment, SourceConfig};
use pricedb_db::{PoolConfig, ScrapeRunCounts, ScrapeRunRow};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        asset_names_path: PathBuf::from("./config/asset_names.yaml"),
        source_timezone: chrono_tz::Asia::Tehran,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        scraper_request_timeout_secs: 20,
        scraper_max_retries: 3,
        scraper_retry_delay_secs: 60,
        scraper_inter_request_delay_ms: 250,
        worker_concurrency: 4,
        default_max_pages: 10,
        motorcycles_page_size: 20,
        sources: SourceConfig::default(),
        schedules: BTreeMap::new(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`ScrapeRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn scrape_run_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = ScrapeRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        domain: "mobile".to_string(),
        trigger_source: "scheduler".to_string(),
        status: "queued".to_string(),
        started_at: None,
        completed_at: None,
        pages_fetched: 0_i32,
        items_enqueued: 0,
        items_created: 0,
        items_updated: 0,
        items_skipped: 0,
        items_failed: 0,
        logs_appended: 0,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.domain, "mobile");
    assert_eq!(row.status, "queued");
    assert!(row.started_at.is_none());
    assert!(row.error_message.is_none());
}

#[test]
fn scrape_run_counts_default_to_zero() {
    let counts = ScrapeRunCounts::default();
    assert_eq!(counts.items_created + counts.items_failed + counts.logs_appended, 0);
}
