//! Database operations for `assets` and `asset_price_logs`.

use chrono::{DateTime, Utc};
use pricedb_core::AssetObservation;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::{DbError, Upserted};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `assets` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssetRow {
    pub id: i64,
    pub symbol: String,
    pub name_fa: String,
    pub name_en: String,
    /// One of the `AssetCategory` wire names, e.g. `"CRYPTO_IRR"`.
    pub category: String,
    pub is_monitored: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `asset_price_logs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssetPriceLogRow {
    pub id: i64,
    pub asset_id: i64,
    pub observed_at: DateTime<Utc>,
    pub price: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub change_amount: Decimal,
    pub change_percent: Decimal,
}

// ---------------------------------------------------------------------------
// assets operations
// ---------------------------------------------------------------------------

/// Upserts an asset on `symbol`.
///
/// Names and category are overwritten on every observation. `is_monitored`
/// is an operator flag and is never touched here.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_asset(
    conn: &mut PgConnection,
    obs: &AssetObservation,
) -> Result<Upserted, DbError> {
    let row = sqlx::query_as::<_, Upserted>(
        "INSERT INTO assets (symbol, name_fa, name_en, category) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (symbol) DO UPDATE SET \
             name_fa    = EXCLUDED.name_fa, \
             name_en    = EXCLUDED.name_en, \
             category   = EXCLUDED.category, \
             updated_at = NOW() \
         RETURNING id, (xmax = 0) AS created",
    )
    .bind(&obs.symbol)
    .bind(&obs.name_fa)
    .bind(&obs.name_en)
    .bind(obs.category.as_str())
    .fetch_one(conn)
    .await?;

    Ok(row)
}

/// Appends a price observation. A second observation for the same
/// `(asset_id, observed_at)` is ignored; the first write wins.
///
/// Returns `true` if a row was inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_asset_price_log(
    conn: &mut PgConnection,
    asset_id: i64,
    obs: &AssetObservation,
) -> Result<bool, DbError> {
    let rows_affected = sqlx::query(
        "INSERT INTO asset_price_logs \
             (asset_id, observed_at, price, high, low, change_amount, change_percent) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (asset_id, observed_at) DO NOTHING",
    )
    .bind(asset_id)
    .bind(obs.observed_at)
    .bind(obs.price)
    .bind(obs.high)
    .bind(obs.low)
    .bind(obs.change_amount)
    .bind(obs.change_percent)
    .execute(conn)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Flags an asset as monitored (or not) by operator request.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no asset has this symbol, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_asset_monitored(
    pool: &PgPool,
    symbol: &str,
    is_monitored: bool,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE assets SET is_monitored = $1, updated_at = NOW() WHERE symbol = $2",
    )
    .bind(is_monitored)
    .bind(symbol)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_asset_by_symbol(pool: &PgPool, symbol: &str) -> Result<Option<AssetRow>, DbError> {
    let row = sqlx::query_as::<_, AssetRow>(
        "SELECT id, symbol, name_fa, name_en, category, is_monitored, created_at, updated_at \
         FROM assets \
         WHERE symbol = $1",
    )
    .bind(symbol)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Price logs for one asset, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_asset_price_logs(
    pool: &PgPool,
    asset_id: i64,
) -> Result<Vec<AssetPriceLogRow>, DbError> {
    let rows = sqlx::query_as::<_, AssetPriceLogRow>(
        "SELECT id, asset_id, observed_at, price, high, low, change_amount, change_percent \
         FROM asset_price_logs \
         WHERE asset_id = $1 \
         ORDER BY observed_at, id",
    )
    .bind(asset_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
