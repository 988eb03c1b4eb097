//! Auxiliary catalog lookups.
//!
//! Brands and categories are refreshed on every observation. Colors,
//! sellers, warranties and specification groups/attributes are created once
//! and then reused as-is.

use pricedb_core::{BrandRef, CategoryRef, ColorRef, SellerRef, WarrantyRef};
use sqlx::PgConnection;

use crate::DbError;

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_catalog_brand(conn: &mut PgConnection, brand: &BrandRef) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO catalog_brands (api_id, code, title_fa, title_en, logo_url) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (api_id) DO UPDATE SET \
             code       = EXCLUDED.code, \
             title_fa   = EXCLUDED.title_fa, \
             title_en   = EXCLUDED.title_en, \
             logo_url   = EXCLUDED.logo_url, \
             updated_at = NOW() \
         RETURNING id",
    )
    .bind(brand.api_id)
    .bind(&brand.code)
    .bind(&brand.title_fa)
    .bind(&brand.title_en)
    .bind(&brand.logo_url)
    .fetch_one(conn)
    .await?;

    Ok(id)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_catalog_category(
    conn: &mut PgConnection,
    category: &CategoryRef,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO catalog_categories (api_id, code, title_fa, title_en) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (api_id) DO UPDATE SET \
             code       = EXCLUDED.code, \
             title_fa   = EXCLUDED.title_fa, \
             title_en   = EXCLUDED.title_en, \
             updated_at = NOW() \
         RETURNING id",
    )
    .bind(category.api_id)
    .bind(&category.code)
    .bind(&category.title_fa)
    .bind(&category.title_en)
    .fetch_one(conn)
    .await?;

    Ok(id)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails.
pub async fn get_or_create_color(conn: &mut PgConnection, color: &ColorRef) -> Result<i64, DbError> {
    let inserted = sqlx::query_scalar::<_, i64>(
        "INSERT INTO colors (api_id, title, hex_code) VALUES ($1, $2, $3) \
         ON CONFLICT (api_id) DO NOTHING \
         RETURNING id",
    )
    .bind(color.api_id)
    .bind(&color.title)
    .bind(&color.hex_code)
    .fetch_optional(&mut *conn)
    .await?;

    match inserted {
        Some(id) => Ok(id),
        None => id_by_api_id(conn, "colors", color.api_id).await,
    }
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails.
pub async fn get_or_create_seller(
    conn: &mut PgConnection,
    seller: &SellerRef,
) -> Result<i64, DbError> {
    let inserted = sqlx::query_scalar::<_, i64>(
        "INSERT INTO sellers (api_id, title, code, url) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (api_id) DO NOTHING \
         RETURNING id",
    )
    .bind(seller.api_id)
    .bind(&seller.title)
    .bind(&seller.code)
    .bind(&seller.url)
    .fetch_optional(&mut *conn)
    .await?;

    match inserted {
        Some(id) => Ok(id),
        None => id_by_api_id(conn, "sellers", seller.api_id).await,
    }
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails.
pub async fn get_or_create_warranty(
    conn: &mut PgConnection,
    warranty: &WarrantyRef,
) -> Result<i64, DbError> {
    let inserted = sqlx::query_scalar::<_, i64>(
        "INSERT INTO warranties (api_id, title) VALUES ($1, $2) \
         ON CONFLICT (api_id) DO NOTHING \
         RETURNING id",
    )
    .bind(warranty.api_id)
    .bind(&warranty.title)
    .fetch_optional(&mut *conn)
    .await?;

    match inserted {
        Some(id) => Ok(id),
        None => id_by_api_id(conn, "warranties", warranty.api_id).await,
    }
}

/// Resolves a specification attribute by group title and attribute title,
/// creating the group and attribute as needed. Returns the attribute id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn get_or_create_spec_attribute(
    conn: &mut PgConnection,
    group: &str,
    attribute: &str,
) -> Result<i64, DbError> {
    let group_id = match sqlx::query_scalar::<_, i64>(
        "INSERT INTO spec_groups (title) VALUES ($1) \
         ON CONFLICT (title) DO NOTHING \
         RETURNING id",
    )
    .bind(group)
    .fetch_optional(&mut *conn)
    .await?
    {
        Some(id) => id,
        None => {
            sqlx::query_scalar::<_, i64>("SELECT id FROM spec_groups WHERE title = $1")
                .bind(group)
                .fetch_one(&mut *conn)
                .await?
        }
    };

    let inserted = sqlx::query_scalar::<_, i64>(
        "INSERT INTO spec_attributes (group_id, title) VALUES ($1, $2) \
         ON CONFLICT (group_id, title) DO NOTHING \
         RETURNING id",
    )
    .bind(group_id)
    .bind(attribute)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = inserted {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM spec_attributes WHERE group_id = $1 AND title = $2",
    )
    .bind(group_id)
    .bind(attribute)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

// `table` is always one of the literals above, never caller input.
async fn id_by_api_id(
    conn: &mut PgConnection,
    table: &'static str,
    api_id: i64,
) -> Result<i64, DbError> {
    let sql = format!("SELECT id FROM {table} WHERE api_id = $1");
    let id = sqlx::query_scalar::<_, i64>(&sql)
        .bind(api_id)
        .fetch_one(conn)
        .await?;
    Ok(id)
}
