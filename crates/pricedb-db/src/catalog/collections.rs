//! Product sub-collections: images, specifications and review attributes.
//!
//! None of these carry history. Each cycle deletes the product's current
//! rows and bulk-inserts the fresh list with a single
//! `INSERT … SELECT … FROM UNNEST(…)`, so callers must run them inside the
//! product's transaction.

use pricedb_core::{ImageRecord, ReviewAttributeRecord};
use sqlx::{PgConnection, PgPool};

use crate::DbError;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProductImageRow {
    pub image_url: String,
    pub is_main: bool,
}

/// A specification joined with its group and attribute titles.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProductSpecificationRow {
    pub group_title: String,
    pub attribute_title: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ReviewAttributeRow {
    pub title: String,
    pub value: String,
}

/// Replaces the product's images. Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails; a repeated URL is a
/// unique violation.
pub async fn replace_images(
    conn: &mut PgConnection,
    product_id: i64,
    images: &[ImageRecord],
) -> Result<u64, DbError> {
    sqlx::query("DELETE FROM product_images WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    if images.is_empty() {
        return Ok(0);
    }

    let urls: Vec<&str> = images.iter().map(|i| i.url.as_str()).collect();
    let mains: Vec<bool> = images.iter().map(|i| i.is_main).collect();

    let inserted = sqlx::query(
        "INSERT INTO product_images (product_id, image_url, is_main) \
         SELECT $1, * FROM UNNEST($2::text[], $3::bool[])",
    )
    .bind(product_id)
    .bind(&urls)
    .bind(&mains)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(inserted)
}

/// Replaces the product's specification values. `values` pairs an
/// attribute id (see `get_or_create_spec_attribute`) with its value.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails; two values for the
/// same attribute are a unique violation.
pub async fn replace_specifications(
    conn: &mut PgConnection,
    product_id: i64,
    values: &[(i64, String)],
) -> Result<u64, DbError> {
    sqlx::query("DELETE FROM product_specifications WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    if values.is_empty() {
        return Ok(0);
    }

    let attribute_ids: Vec<i64> = values.iter().map(|(id, _)| *id).collect();
    let texts: Vec<&str> = values.iter().map(|(_, v)| v.as_str()).collect();

    let inserted = sqlx::query(
        "INSERT INTO product_specifications (product_id, attribute_id, value) \
         SELECT $1, * FROM UNNEST($2::int8[], $3::text[])",
    )
    .bind(product_id)
    .bind(&attribute_ids)
    .bind(&texts)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(inserted)
}

/// Replaces the product's review attributes.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails.
pub async fn replace_review_attributes(
    conn: &mut PgConnection,
    product_id: i64,
    attributes: &[ReviewAttributeRecord],
) -> Result<u64, DbError> {
    sqlx::query("DELETE FROM product_review_attributes WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    if attributes.is_empty() {
        return Ok(0);
    }

    let titles: Vec<&str> = attributes.iter().map(|a| a.title.as_str()).collect();
    let texts: Vec<&str> = attributes.iter().map(|a| a.value.as_str()).collect();

    let inserted = sqlx::query(
        "INSERT INTO product_review_attributes (product_id, title, value) \
         SELECT $1, * FROM UNNEST($2::text[], $3::text[])",
    )
    .bind(product_id)
    .bind(&titles)
    .bind(&texts)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(inserted)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_product_images(
    pool: &PgPool,
    product_id: i64,
) -> Result<Vec<ProductImageRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductImageRow>(
        "SELECT image_url, is_main FROM product_images WHERE product_id = $1 ORDER BY id",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_product_specifications(
    pool: &PgPool,
    product_id: i64,
) -> Result<Vec<ProductSpecificationRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductSpecificationRow>(
        "SELECT g.title AS group_title, a.title AS attribute_title, s.value \
         FROM product_specifications s \
         JOIN spec_attributes a ON a.id = s.attribute_id \
         JOIN spec_groups g ON g.id = a.group_id \
         WHERE s.product_id = $1 \
         ORDER BY s.id",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_product_review_attributes(
    pool: &PgPool,
    product_id: i64,
) -> Result<Vec<ReviewAttributeRow>, DbError> {
    let rows = sqlx::query_as::<_, ReviewAttributeRow>(
        "SELECT title, value FROM product_review_attributes WHERE product_id = $1 ORDER BY id",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
