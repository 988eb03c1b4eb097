//! Database operations for `product_variants` and `price_history`.

use chrono::{DateTime, Utc};
use pricedb_core::VariantRecord;
use sqlx::{PgConnection, PgPool};

use crate::{DbError, Upserted};

/// A row from the `product_variants` table. Prices are in toman.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VariantRow {
    pub id: i64,
    pub product_id: i64,
    pub api_id: i64,
    pub selling_price: i64,
    pub rrp_price: i64,
    pub order_limit: i32,
    pub is_incredible: bool,
    pub color_id: Option<i64>,
    pub seller_id: Option<i64>,
    pub warranty_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `price_history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PriceHistoryRow {
    pub id: i64,
    pub variant_id: i64,
    pub selling_price: i64,
    pub rrp_price: i64,
    pub recorded_at: DateTime<Utc>,
}

/// Resolved lookup ids for a variant's optional color, seller and warranty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariantLinks {
    pub color_id: Option<i64>,
    pub seller_id: Option<i64>,
    pub warranty_id: Option<i64>,
}

/// Upserts a variant on `(product_id, api_id)`. The row id is stable across
/// cycles, so price history keeps pointing at it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_variant(
    conn: &mut PgConnection,
    product_id: i64,
    variant: &VariantRecord,
    links: VariantLinks,
) -> Result<Upserted, DbError> {
    let row = sqlx::query_as::<_, Upserted>(
        "INSERT INTO product_variants \
             (product_id, api_id, selling_price, rrp_price, order_limit, is_incredible, \
              color_id, seller_id, warranty_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (product_id, api_id) DO UPDATE SET \
             selling_price = EXCLUDED.selling_price, \
             rrp_price     = EXCLUDED.rrp_price, \
             order_limit   = EXCLUDED.order_limit, \
             is_incredible = EXCLUDED.is_incredible, \
             color_id      = EXCLUDED.color_id, \
             seller_id     = EXCLUDED.seller_id, \
             warranty_id   = EXCLUDED.warranty_id, \
             updated_at    = NOW() \
         RETURNING id, (xmax = 0) AS created",
    )
    .bind(product_id)
    .bind(variant.api_id)
    .bind(variant.selling_price)
    .bind(variant.rrp_price)
    .bind(variant.order_limit)
    .bind(variant.is_incredible)
    .bind(links.color_id)
    .bind(links.seller_id)
    .bind(links.warranty_id)
    .fetch_one(conn)
    .await?;

    Ok(row)
}

/// Deletes the product's variants whose `api_id` is not in `keep_api_ids`,
/// cascading to their price history. Returns the number of variants removed.
///
/// An empty `keep_api_ids` removes every variant of the product:
/// `api_id != ALL('{}')` is true for every row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn prune_variants(
    conn: &mut PgConnection,
    product_id: i64,
    keep_api_ids: &[i64],
) -> Result<u64, DbError> {
    let rows_affected = sqlx::query(
        "DELETE FROM product_variants \
         WHERE product_id = $1 \
           AND api_id != ALL($2::int8[])",
    )
    .bind(product_id)
    .bind(keep_api_ids)
    .execute(conn)
    .await?
    .rows_affected();

    Ok(rows_affected)
}

/// Appends a price history row only when `selling_price` differs from the
/// variant's latest row, or the variant has none.
///
/// The latest-row lookup and the insert are one statement, so two writers
/// cannot both see a stale "latest" between check and insert.
///
/// Returns `true` if a row was inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails.
pub async fn insert_price_history_if_changed(
    conn: &mut PgConnection,
    variant_id: i64,
    selling_price: i64,
    rrp_price: i64,
) -> Result<bool, DbError> {
    let rows_affected = sqlx::query(
        "WITH last AS ( \
             SELECT selling_price \
             FROM price_history \
             WHERE variant_id = $1 \
             ORDER BY recorded_at DESC, id DESC \
             LIMIT 1 \
         ) \
         INSERT INTO price_history (variant_id, selling_price, rrp_price) \
         SELECT $1, $2, $3 \
         WHERE NOT EXISTS ( \
             SELECT 1 FROM last WHERE last.selling_price = $2 \
         )",
    )
    .bind(variant_id)
    .bind(selling_price)
    .bind(rrp_price)
    .execute(conn)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Variants of a product ordered by external id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_variants(pool: &PgPool, product_id: i64) -> Result<Vec<VariantRow>, DbError> {
    let rows = sqlx::query_as::<_, VariantRow>(
        "SELECT id, product_id, api_id, selling_price, rrp_price, order_limit, is_incredible, \
                color_id, seller_id, warranty_id, created_at, updated_at \
         FROM product_variants \
         WHERE product_id = $1 \
         ORDER BY api_id",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Price history for a variant, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_price_history(
    pool: &PgPool,
    variant_id: i64,
) -> Result<Vec<PriceHistoryRow>, DbError> {
    let rows = sqlx::query_as::<_, PriceHistoryRow>(
        "SELECT id, variant_id, selling_price, rrp_price, recorded_at \
         FROM price_history \
         WHERE variant_id = $1 \
         ORDER BY recorded_at, id",
    )
    .bind(variant_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
