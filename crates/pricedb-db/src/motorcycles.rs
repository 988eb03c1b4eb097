//! Database operations for `motorcycle_brands`, `motorcycles` and
//! `motorcycle_price_logs`.

use chrono::{DateTime, NaiveDate, Utc};
use pricedb_core::MotorcycleObservation;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::{DbError, Upserted};

/// A row from the `motorcycles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MotorcycleRow {
    pub id: i64,
    pub brand_id: i64,
    pub model_fa: String,
    pub model_en: Option<String>,
    pub trim_fa: Option<String>,
    pub production_year: Option<i32>,
    pub origin: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Returns the id of the brand with Persian name `name_fa`, creating it on
/// first use. The English slug is recorded only when the brand is created.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails.
pub async fn get_or_create_motorcycle_brand(
    conn: &mut PgConnection,
    name_fa: &str,
    name_en: Option<&str>,
) -> Result<i64, DbError> {
    let inserted = sqlx::query_scalar::<_, i64>(
        "INSERT INTO motorcycle_brands (name_fa, name_en) VALUES ($1, $2) \
         ON CONFLICT (name_fa) DO NOTHING \
         RETURNING id",
    )
    .bind(name_fa)
    .bind(name_en)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = inserted {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM motorcycle_brands WHERE name_fa = $1")
        .bind(name_fa)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

/// Upserts a motorcycle on `(brand, model_fa, trim_fa, production_year)`,
/// where a missing trim or year still collides with another missing one.
/// The English model slug and origin are refreshed on every hit.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_motorcycle(
    conn: &mut PgConnection,
    brand_id: i64,
    obs: &MotorcycleObservation,
) -> Result<Upserted, DbError> {
    let row = sqlx::query_as::<_, Upserted>(
        "INSERT INTO motorcycles \
             (brand_id, model_fa, model_en, trim_fa, production_year, origin) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (brand_id, model_fa, (COALESCE(trim_fa, '')), (COALESCE(production_year, 0))) \
         DO UPDATE SET \
             model_en   = EXCLUDED.model_en, \
             origin     = EXCLUDED.origin, \
             updated_at = NOW() \
         RETURNING id, (xmax = 0) AS created",
    )
    .bind(brand_id)
    .bind(&obs.model_fa)
    .bind(&obs.model_en_slug)
    .bind(&obs.trim_fa)
    .bind(obs.production_year)
    .bind(&obs.origin)
    .fetch_one(conn)
    .await?;

    Ok(row)
}

/// Appends a provider's daily quote; unique on
/// `(motorcycle_id, log_date, source)`, first write wins.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_motorcycle_price_log(
    conn: &mut PgConnection,
    motorcycle_id: i64,
    log_date: NaiveDate,
    source: &str,
    price: Decimal,
) -> Result<bool, DbError> {
    let rows_affected = sqlx::query(
        "INSERT INTO motorcycle_price_logs (motorcycle_id, log_date, source, price) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (motorcycle_id, log_date, source) DO NOTHING",
    )
    .bind(motorcycle_id)
    .bind(log_date)
    .bind(source)
    .bind(price)
    .execute(conn)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_motorcycles_by_brand(
    pool: &PgPool,
    brand_fa: &str,
) -> Result<Vec<MotorcycleRow>, DbError> {
    let rows = sqlx::query_as::<_, MotorcycleRow>(
        "SELECT m.id, m.brand_id, m.model_fa, m.model_en, m.trim_fa, m.production_year, \
                m.origin, m.created_at, m.updated_at \
         FROM motorcycles m \
         JOIN motorcycle_brands b ON b.id = m.brand_id \
         WHERE b.name_fa = $1 \
         ORDER BY m.id",
    )
    .bind(brand_fa)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
