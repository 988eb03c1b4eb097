//! Database operations for `vehicle_brands`, `vehicles` and
//! `vehicle_price_logs`.

use chrono::{DateTime, NaiveDate, Utc};
use pricedb_core::VehicleObservation;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::{DbError, Upserted};

/// A row from the `vehicles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VehicleRow {
    pub id: i64,
    pub brand_id: i64,
    pub name: String,
    pub trim_level: String,
    pub production_year: i32,
    pub specifications: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Returns the id of the brand called `name`, creating it on first use.
///
/// Concurrent callers racing on the same name both get the same id: the
/// loser's insert is a no-op and it falls through to the select.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails.
pub async fn get_or_create_vehicle_brand(
    conn: &mut PgConnection,
    name: &str,
) -> Result<i64, DbError> {
    let inserted = sqlx::query_scalar::<_, i64>(
        "INSERT INTO vehicle_brands (name) VALUES ($1) \
         ON CONFLICT (name) DO NOTHING \
         RETURNING id",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = inserted {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM vehicle_brands WHERE name = $1")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

/// Upserts a vehicle on its full natural key. Every column is part of the
/// key, so a hit only refreshes `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_vehicle(
    conn: &mut PgConnection,
    brand_id: i64,
    obs: &VehicleObservation,
) -> Result<Upserted, DbError> {
    let row = sqlx::query_as::<_, Upserted>(
        "INSERT INTO vehicles (brand_id, name, trim_level, production_year, specifications) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (brand_id, name, trim_level, production_year, specifications) \
         DO UPDATE SET updated_at = NOW() \
         RETURNING id, (xmax = 0) AS created",
    )
    .bind(brand_id)
    .bind(&obs.name)
    .bind(&obs.trim)
    .bind(obs.production_year)
    .bind(&obs.specifications)
    .fetch_one(conn)
    .await?;

    Ok(row)
}

/// Appends the daily quote. At most one row per vehicle and date; the first
/// write wins.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_vehicle_price_log(
    conn: &mut PgConnection,
    vehicle_id: i64,
    log_date: NaiveDate,
    price: Decimal,
) -> Result<bool, DbError> {
    let rows_affected = sqlx::query(
        "INSERT INTO vehicle_price_logs (vehicle_id, log_date, price) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (vehicle_id, log_date) DO NOTHING",
    )
    .bind(vehicle_id)
    .bind(log_date)
    .bind(price)
    .execute(conn)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_vehicles_by_brand(pool: &PgPool, brand: &str) -> Result<Vec<VehicleRow>, DbError> {
    let rows = sqlx::query_as::<_, VehicleRow>(
        "SELECT v.id, v.brand_id, v.name, v.trim_level, v.production_year, v.specifications, \
                v.created_at, v.updated_at \
         FROM vehicles v \
         JOIN vehicle_brands b ON b.id = v.brand_id \
         WHERE b.name = $1 \
         ORDER BY v.id",
    )
    .bind(brand)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
