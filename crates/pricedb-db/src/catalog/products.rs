use chrono::{DateTime, Utc};
use pricedb_core::ProductDetail;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::{DbError, Upserted};

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub api_id: i64,
    /// Catalog kind wire name, e.g. `"mobile"`.
    pub kind: String,
    pub title_fa: String,
    pub title_en: String,
    pub status: String,
    pub rating_rate: Decimal,
    pub rating_count: i32,
    pub review_description: String,
    pub brand_id: i64,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upserts a product on `api_id`, overwriting every non-key column.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_product(
    conn: &mut PgConnection,
    brand_id: i64,
    category_id: i64,
    product: &ProductDetail,
) -> Result<Upserted, DbError> {
    let row = sqlx::query_as::<_, Upserted>(
        "INSERT INTO products \
             (api_id, kind, title_fa, title_en, status, rating_rate, rating_count, \
              review_description, brand_id, category_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (api_id) DO UPDATE SET \
             kind               = EXCLUDED.kind, \
             title_fa           = EXCLUDED.title_fa, \
             title_en           = EXCLUDED.title_en, \
             status             = EXCLUDED.status, \
             rating_rate        = EXCLUDED.rating_rate, \
             rating_count       = EXCLUDED.rating_count, \
             review_description = EXCLUDED.review_description, \
             brand_id           = EXCLUDED.brand_id, \
             category_id        = EXCLUDED.category_id, \
             updated_at         = NOW() \
         RETURNING id, (xmax = 0) AS created",
    )
    .bind(product.api_id)
    .bind(product.kind.as_str())
    .bind(&product.title_fa)
    .bind(&product.title_en)
    .bind(&product.status)
    .bind(product.rating_rate)
    .bind(product.rating_count)
    .bind(&product.review_description)
    .bind(brand_id)
    .bind(category_id)
    .fetch_one(conn)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_by_api_id(pool: &PgPool, api_id: i64) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, api_id, kind, title_fa, title_en, status, rating_rate, rating_count, \
                review_description, brand_id, category_id, created_at, updated_at \
         FROM products \
         WHERE api_id = $1",
    )
    .bind(api_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
