use std::collections::BTreeMap;

use crate::app_config::{AppConfig, CatalogEndpoints, Environment, SourceConfig};
use crate::domain::{CatalogKind, Domain};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from the variables already in the process.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Default cron expression (with seconds) for a domain's scheduled run.
#[must_use]
pub fn default_schedule(domain: Domain) -> &'static str {
    match domain {
        Domain::Assets => "0 */10 * * * *",
        Domain::Cars => "0 0 3 * * *",
        Domain::Motorcycles => "0 30 3 * * *",
        Domain::Catalog(_) => "0 0 4 * * *",
    }
}

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset so `.env` templates can leave sources blank.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("PRICEDB_ENV", "development"));
    let bind_addr = parse_addr("PRICEDB_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("PRICEDB_LOG_LEVEL", "info");
    let asset_names_path = PathBuf::from(or_default(
        "PRICEDB_ASSET_NAMES_PATH",
        "./config/asset_names.yaml",
    ));
    let source_timezone = or_default("PRICEDB_SOURCE_TIMEZONE", "Asia/Tehran")
        .parse::<chrono_tz::Tz>()
        .map_err(|e| invalid("PRICEDB_SOURCE_TIMEZONE", e.to_string()))?;

    let db_max_connections = parse_u32("PRICEDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("PRICEDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PRICEDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("PRICEDB_SCRAPER_REQUEST_TIMEOUT_SECS", "20")?;
    let scraper_max_retries = parse_u32("PRICEDB_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_delay_secs = parse_u64("PRICEDB_SCRAPER_RETRY_DELAY_SECS", "60")?;
    let scraper_inter_request_delay_ms =
        parse_u64("PRICEDB_SCRAPER_INTER_REQUEST_DELAY_MS", "250")?;

    let worker_concurrency = parse_usize("PRICEDB_WORKER_CONCURRENCY", "4")?;
    if worker_concurrency == 0 {
        return Err(invalid(
            "PRICEDB_WORKER_CONCURRENCY",
            "must be at least 1".to_string(),
        ));
    }
    let default_max_pages = parse_u32("PRICEDB_DEFAULT_MAX_PAGES", "10")?;
    let motorcycles_page_size = parse_u32("PRICEDB_MOTORCYCLES_PAGE_SIZE", "20")?;
    if motorcycles_page_size == 0 {
        return Err(invalid(
            "PRICEDB_MOTORCYCLES_PAGE_SIZE",
            "must be at least 1".to_string(),
        ));
    }

    let mut catalog = BTreeMap::new();
    for kind in CatalogKind::ALL {
        let upper = kind.as_str().to_ascii_uppercase();
        let list_var = format!("PRICEDB_CATALOG_{upper}_LIST_URL");
        let detail_var = format!("PRICEDB_CATALOG_{upper}_DETAIL_URL");
        match (optional(&list_var), optional(&detail_var)) {
            (None, None) => {}
            (Some(list_url), Some(detail_url)) => {
                if !list_url.contains("{page}") {
                    return Err(invalid(&list_var, "missing {page} placeholder".to_string()));
                }
                if !detail_url.contains("{product_id}") {
                    return Err(invalid(
                        &detail_var,
                        "missing {product_id} placeholder".to_string(),
                    ));
                }
                catalog.insert(
                    kind,
                    CatalogEndpoints {
                        list_url,
                        detail_url,
                    },
                );
            }
            (Some(_), None) => return Err(ConfigError::MissingEnvVar(detail_var)),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar(list_var)),
        }
    }

    let sources = SourceConfig {
        assets_url: optional("PRICEDB_ASSETS_URL"),
        cars_url: optional("PRICEDB_CARS_URL"),
        motorcycles_url: optional("PRICEDB_MOTORCYCLES_URL"),
        catalog,
    };

    let mut schedules = BTreeMap::new();
    for domain in Domain::ALL {
        let var = format!("PRICEDB_SCHEDULE_{}", domain.env_suffix());
        let expr = or_default(&var, default_schedule(domain));
        let fields = expr.split_whitespace().count();
        if fields != 6 {
            return Err(invalid(
                &var,
                format!("expected 6 cron fields (with seconds), got {fields}"),
            ));
        }
        schedules.insert(domain, expr);
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        asset_names_path,
        source_timezone,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_max_retries,
        scraper_retry_delay_secs,
        scraper_inter_request_delay_ms,
        worker_concurrency,
        default_max_pages,
        motorcycles_page_size,
        sources,
        schedules,
    })
}

/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
