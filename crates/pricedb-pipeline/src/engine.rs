//! Reconciliation: turns one item payload into database state.
//!
//! Each record is applied inside its own transaction covering the primary
//! entity, its lookups, logs, sub-collections and variants. Any error rolls
//! the whole record back and leaves other items untouched.

use pricedb_core::{
    AssetObservation, Domain, MotorcycleObservation, ProductDetail, ScrapedRecord,
    VehicleObservation,
};
use pricedb_db::{DbError, Upserted, VariantLinks};
use pricedb_scraper::{parse_record, ParseContext, ScraperError};
use serde_json::Value;
use sqlx::{PgConnection, PgPool};

use crate::outcome::ItemOutcome;

/// What applying a record changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub created: bool,
    pub logs_appended: u32,
}

impl Applied {
    fn new(entity: Upserted, logs_appended: u32) -> Self {
        Self {
            created: entity.created,
            logs_appended,
        }
    }
}

/// Parses `payload` for `domain` and reconciles it in one transaction.
///
/// Never returns an error: missing data becomes
/// [`ItemOutcome::SkippedMissingData`] and every other failure becomes
/// [`ItemOutcome::FailedPermanent`] after the transaction is rolled back.
pub async fn reconcile(
    pool: &PgPool,
    domain: Domain,
    payload: &Value,
    ctx: &ParseContext<'_>,
) -> ItemOutcome {
    reconcile_labelled(pool, domain, None, payload, ctx).await
}

/// Like [`reconcile`] for a payload fetched by id in the detail phase.
///
/// A skip is reported under `requested_id` even when the body lacks its
/// own product id.
pub async fn reconcile_detail(
    pool: &PgPool,
    domain: Domain,
    requested_id: i64,
    payload: &Value,
    ctx: &ParseContext<'_>,
) -> ItemOutcome {
    reconcile_labelled(pool, domain, Some(requested_id), payload, ctx).await
}

async fn reconcile_labelled(
    pool: &PgPool,
    domain: Domain,
    requested_id: Option<i64>,
    payload: &Value,
    ctx: &ParseContext<'_>,
) -> ItemOutcome {
    let record = match parse_record(domain, payload, ctx) {
        Ok(record) => record,
        Err(ScraperError::MissingData { item, reason }) => {
            let item = requested_id.map_or(item, |id| id.to_string());
            tracing::warn!(%domain, %item, %reason, "skipping item with missing data");
            return ItemOutcome::SkippedMissingData {
                reason: format!("{item}: {reason}"),
            };
        }
        Err(e) => {
            tracing::error!(
                %domain,
                item = ?requested_id,
                error = %e,
                "item payload could not be parsed"
            );
            return ItemOutcome::FailedPermanent {
                reason: e.to_string(),
            };
        }
    };

    let item = record.external_id();
    match apply_in_transaction(pool, &record).await {
        Ok(applied) => {
            tracing::debug!(
                %domain,
                %item,
                created = applied.created,
                logs_appended = applied.logs_appended,
                "item reconciled"
            );
            if applied.created {
                ItemOutcome::Created {
                    logs_appended: applied.logs_appended,
                }
            } else {
                ItemOutcome::Updated {
                    logs_appended: applied.logs_appended,
                }
            }
        }
        Err(e) => {
            tracing::error!(
                %domain,
                %item,
                integrity_violation = e.is_integrity_violation(),
                error = %e,
                "reconcile failed, item rolled back"
            );
            ItemOutcome::FailedPermanent {
                reason: e.to_string(),
            }
        }
    }
}

/// Applies `record` in a fresh transaction, committing only if every
/// statement succeeds.
///
/// # Errors
///
/// Returns the first [`DbError`]; the transaction is rolled back on drop.
pub async fn apply_in_transaction(pool: &PgPool, record: &ScrapedRecord) -> Result<Applied, DbError> {
    let mut tx = pool.begin().await?;
    let applied = apply_record(&mut tx, record).await?;
    tx.commit().await?;
    Ok(applied)
}

/// Applies `record` on `conn` without managing a transaction.
///
/// # Errors
///
/// Returns the first [`DbError`] raised by any statement.
pub async fn apply_record(conn: &mut PgConnection, record: &ScrapedRecord) -> Result<Applied, DbError> {
    match record {
        ScrapedRecord::Asset(obs) => apply_asset(conn, obs).await,
        ScrapedRecord::Vehicle(obs) => apply_vehicle(conn, obs).await,
        ScrapedRecord::Motorcycle(obs) => apply_motorcycle(conn, obs).await,
        ScrapedRecord::Product(detail) => apply_product(conn, detail).await,
    }
}

async fn apply_asset(conn: &mut PgConnection, obs: &AssetObservation) -> Result<Applied, DbError> {
    let asset = pricedb_db::upsert_asset(conn, obs).await?;
    let logged = pricedb_db::insert_asset_price_log(conn, asset.id, obs).await?;
    Ok(Applied::new(asset, u32::from(logged)))
}

async fn apply_vehicle(
    conn: &mut PgConnection,
    obs: &VehicleObservation,
) -> Result<Applied, DbError> {
    let brand_id = pricedb_db::get_or_create_vehicle_brand(conn, &obs.brand).await?;
    let vehicle = pricedb_db::upsert_vehicle(conn, brand_id, obs).await?;
    let logged =
        pricedb_db::insert_vehicle_price_log(conn, vehicle.id, obs.log_date, obs.price).await?;
    Ok(Applied::new(vehicle, u32::from(logged)))
}

async fn apply_motorcycle(
    conn: &mut PgConnection,
    obs: &MotorcycleObservation,
) -> Result<Applied, DbError> {
    let brand_id = pricedb_db::get_or_create_motorcycle_brand(
        conn,
        &obs.brand_fa,
        obs.brand_en_slug.as_deref(),
    )
    .await?;
    let motorcycle = pricedb_db::upsert_motorcycle(conn, brand_id, obs).await?;
    let logged = pricedb_db::insert_motorcycle_price_log(
        conn,
        motorcycle.id,
        obs.log_date,
        &obs.source,
        obs.price,
    )
    .await?;
    Ok(Applied::new(motorcycle, u32::from(logged)))
}

async fn apply_product(conn: &mut PgConnection, detail: &ProductDetail) -> Result<Applied, DbError> {
    let brand_id = pricedb_db::upsert_catalog_brand(conn, &detail.brand).await?;
    let category_id = pricedb_db::upsert_catalog_category(conn, &detail.category).await?;
    let product = pricedb_db::upsert_product(conn, brand_id, category_id, detail).await?;

    pricedb_db::replace_images(conn, product.id, &detail.images).await?;

    let mut spec_values = Vec::with_capacity(detail.specifications.len());
    for spec in &detail.specifications {
        let attribute_id =
            pricedb_db::get_or_create_spec_attribute(conn, &spec.group, &spec.attribute).await?;
        spec_values.push((attribute_id, spec.value.clone()));
    }
    pricedb_db::replace_specifications(conn, product.id, &spec_values).await?;
    pricedb_db::replace_review_attributes(conn, product.id, &detail.review_attributes).await?;

    let mut history_rows = 0u32;
    let mut keep = Vec::with_capacity(detail.variants.len());
    for variant in &detail.variants {
        let links = VariantLinks {
            color_id: match &variant.color {
                Some(color) => Some(pricedb_db::get_or_create_color(conn, color).await?),
                None => None,
            },
            seller_id: match &variant.seller {
                Some(seller) => Some(pricedb_db::get_or_create_seller(conn, seller).await?),
                None => None,
            },
            warranty_id: match &variant.warranty {
                Some(warranty) => Some(pricedb_db::get_or_create_warranty(conn, warranty).await?),
                None => None,
            },
        };
        let row = pricedb_db::upsert_variant(conn, product.id, variant, links).await?;
        if pricedb_db::insert_price_history_if_changed(
            conn,
            row.id,
            variant.selling_price,
            variant.rrp_price,
        )
        .await?
        {
            history_rows += 1;
        }
        keep.push(variant.api_id);
    }
    pricedb_db::prune_variants(conn, product.id, &keep).await?;

    Ok(Applied::new(product, history_rows))
}
