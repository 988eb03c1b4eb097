//! Live reconciliation tests using `#[sqlx::test]`.
//!
//! Each test runs against a fresh, fully-migrated database and feeds raw
//! upstream payloads through `reconcile`, then inspects the resulting rows.

use chrono::{DateTime, TimeZone, Utc};
use pricedb_core::{CatalogKind, Domain, NameTable};
use pricedb_pipeline::{reconcile, reconcile_detail, ItemOutcome};
use pricedb_scraper::ParseContext;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_ctx(names: &NameTable, observed_at: DateTime<Utc>) -> ParseContext<'_> {
    ParseContext {
        observed_at,
        timezone: chrono_tz::Asia::Tehran,
        names,
    }
}

fn run_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

fn asset_item(symbol: &str, price: &str, ts: &str) -> Value {
    json!({
        "symbol": symbol,
        "p": price, "h": price, "l": price, "d": "0", "dp": 0,
        "ts": ts,
        "title": "بیت کوین",
        "title_en": "Bitcoin"
    })
}

fn variant(id: i64, selling_rial: i64) -> Value {
    json!({
        "id": id,
        "price": { "selling_price": selling_rial, "rrp_price": selling_rial, "order_limit": 1 },
        "color": { "id": 3, "title": "Black", "hex_code": "#000000" },
        "seller": { "id": 55, "title": "Store", "code": "ABC12", "url": "/seller/abc12/" },
        "warranty": { "id": 7, "title_fa": "گارانتی" }
    })
}

fn product(api_id: i64, images: &[&str], specs: Value, variants: Vec<Value>) -> Value {
    let list: Vec<Value> = images.iter().map(|u| json!({ "url": [u] })).collect();
    json!({
        "data": { "product": {
            "id": api_id,
            "title_fa": "گوشی",
            "title_en": "Phone",
            "status": "marketable",
            "rating": { "rate": 4.1, "count": 12 },
            "review": { "description": "ok", "attributes": [ { "title": "Weight", "values": ["190 g"] } ] },
            "brand": { "id": 18, "code": "samsung", "title_fa": "سامسونگ", "title_en": "Samsung" },
            "category": { "id": 11, "code": "mobile-phone", "title_fa": "گوشی", "title_en": "Mobile Phone" },
            "images": { "main": { "url": [images.first().copied().unwrap_or_default()] }, "list": list },
            "specifications": specs,
            "variants": variants
        }}
    })
}

fn specs(pairs: &[(&str, &str)]) -> Value {
    let attributes: Vec<Value> = pairs
        .iter()
        .map(|(title, value)| json!({ "title": title, "values": [value] }))
        .collect();
    json!([{ "title": "Display", "attributes": attributes }])
}

async fn count(pool: &sqlx::PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("count on {table} failed: {e}"))
}

const MOBILE: Domain = Domain::Catalog(CatalogKind::Mobile);

// ---------------------------------------------------------------------------
// Section 1: Assets
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn btc_irr_scenario_lands_normalized(pool: sqlx::PgPool) {
    let names = NameTable::default();
    let ctx = parse_ctx(&names, run_time());

    let outcome = reconcile(
        &pool,
        Domain::Assets,
        &asset_item("btc-irr", "1,234,567.89", "2024-03-01 10:00:00"),
        &ctx,
    )
    .await;
    assert_eq!(outcome, ItemOutcome::Created { logs_appended: 1 });

    let asset = pricedb_db::get_asset_by_symbol(&pool, "btc-irr")
        .await
        .unwrap()
        .expect("asset row should exist");
    assert_eq!(asset.category, "CRYPTO_IRR");
    assert_eq!(asset.name_en, "Bitcoin");

    let logs = pricedb_db::list_asset_price_logs(&pool, asset.id).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].price, dec!(1234567.89));
    assert_eq!(
        logs[0].observed_at,
        Utc.with_ymd_and_hms(2024, 3, 1, 6, 30, 0).unwrap()
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn reprocessing_an_item_is_idempotent(pool: sqlx::PgPool) {
    let names = NameTable::default();
    let ctx = parse_ctx(&names, run_time());
    let item = asset_item("sekee", "400,000,000", "2024-03-01 10:00:00");

    reconcile(&pool, Domain::Assets, &item, &ctx).await;
    let second = reconcile(&pool, Domain::Assets, &item, &ctx).await;

    assert_eq!(second, ItemOutcome::Updated { logs_appended: 0 });
    assert_eq!(count(&pool, "assets").await, 1);
    assert_eq!(count(&pool, "asset_price_logs").await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn static_name_table_beats_api_titles(pool: sqlx::PgPool) {
    let names = pricedb_core::names::parse_name_table(
        "assets:\n  SEKEE:\n    name_fa: سکه امامی\n    name_en: Emami Coin\n",
    )
    .unwrap();
    let ctx = parse_ctx(&names, run_time());

    reconcile(
        &pool,
        Domain::Assets,
        &asset_item("sekee", "1", "2024-03-01 10:00:00"),
        &ctx,
    )
    .await;

    let asset = pricedb_db::get_asset_by_symbol(&pool, "sekee")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(asset.name_en, "Emami Coin");
}

#[sqlx::test(migrations = "../../migrations")]
async fn unchanged_asset_price_at_new_timestamp_logs_again(pool: sqlx::PgPool) {
    let names = NameTable::default();
    let ctx = parse_ctx(&names, run_time());

    let first = reconcile(
        &pool,
        Domain::Assets,
        &asset_item("sekee", "400,000,000", "2024-03-01 10:00:00"),
        &ctx,
    )
    .await;
    let second = reconcile(
        &pool,
        Domain::Assets,
        &asset_item("sekee", "400,000,000", "2024-03-01 10:10:00"),
        &ctx,
    )
    .await;

    assert_eq!(first, ItemOutcome::Created { logs_appended: 1 });
    assert_eq!(second, ItemOutcome::Updated { logs_appended: 1 });
    assert_eq!(count(&pool, "assets").await, 1);
    assert_eq!(count(&pool, "asset_price_logs").await, 2);

    let asset = pricedb_db::get_asset_by_symbol(&pool, "sekee")
        .await
        .unwrap()
        .unwrap();
    let logs = pricedb_db::list_asset_price_logs(&pool, asset.id).await.unwrap();
    assert!(logs.iter().all(|log| log.price == dec!(400000000)));
    assert_ne!(logs[0].observed_at, logs[1].observed_at);
}

#[sqlx::test(migrations = "../../migrations")]
async fn asset_without_timestamp_is_skipped_without_writes(pool: sqlx::PgPool) {
    let names = NameTable::default();
    let ctx = parse_ctx(&names, run_time());
    let mut item = asset_item("sekee", "1", "2024-03-01 10:00:00");
    item.as_object_mut().unwrap().remove("ts");

    let outcome = reconcile(&pool, Domain::Assets, &item, &ctx).await;

    assert!(matches!(outcome, ItemOutcome::SkippedMissingData { .. }));
    assert_eq!(count(&pool, "assets").await, 0);
}

// ---------------------------------------------------------------------------
// Section 2: Cars and motorcycles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn car_quote_logs_once_per_day(pool: sqlx::PgPool) {
    let names = NameTable::default();
    let item = json!({
        "car_properties": {
            "brand": { "title": "Peugeot" },
            "model": { "title": "207" },
            "trim": { "title": "MT" },
            "year": { "title": "1403" }
        },
        "price": "1,450,000,000"
    });

    let morning = parse_ctx(&names, run_time());
    let evening = parse_ctx(&names, Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap());
    let next_day = parse_ctx(&names, Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap());

    assert_eq!(
        reconcile(&pool, Domain::Cars, &item, &morning).await,
        ItemOutcome::Created { logs_appended: 1 }
    );
    assert_eq!(
        reconcile(&pool, Domain::Cars, &item, &evening).await,
        ItemOutcome::Updated { logs_appended: 0 }
    );
    assert_eq!(
        reconcile(&pool, Domain::Cars, &item, &next_day).await,
        ItemOutcome::Updated { logs_appended: 1 }
    );
    let vehicles = pricedb_db::list_vehicles_by_brand(&pool, "Peugeot").await.unwrap();
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0].trim_level, "MT");
    assert_eq!(vehicles[0].production_year, 1403);
    assert_eq!(vehicles[0].specifications, "", "missing option defaults to empty");
    assert_eq!(count(&pool, "vehicle_brands").await, 1);
    assert_eq!(count(&pool, "vehicle_price_logs").await, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn motorcycle_sources_log_separately(pool: sqlx::PgPool) {
    let names = NameTable::default();
    let ctx = parse_ctx(&names, run_time());
    let quote = |provider: &str| {
        json!({
            "brand_fa": "هوندا", "brand": "honda",
            "model_fa": "سی جی ۱۲۵", "model": "cg125",
            "class": "", "price": 145_000_000,
            "price_provider": provider
        })
    };

    reconcile(&pool, Domain::Motorcycles, &quote("bama"), &ctx).await;
    let second = reconcile(&pool, Domain::Motorcycles, &quote("divar"), &ctx).await;

    assert_eq!(second, ItemOutcome::Updated { logs_appended: 1 });
    let motorcycles = pricedb_db::list_motorcycles_by_brand(&pool, "هوندا").await.unwrap();
    assert_eq!(motorcycles.len(), 1);
    assert_eq!(motorcycles[0].model_en.as_deref(), Some("cg125"));
    assert_eq!(motorcycles[0].trim_fa, None, "empty class is no trim");
    assert_eq!(motorcycles[0].production_year, None);
    assert_eq!(count(&pool, "motorcycle_price_logs").await, 2);
}

// ---------------------------------------------------------------------------
// Section 3: Catalog products
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn product_reconcile_writes_full_graph(pool: sqlx::PgPool) {
    let names = NameTable::default();
    let ctx = parse_ctx(&names, run_time());
    let payload = product(
        500,
        &["https://cdn.test/1.jpg", "https://cdn.test/2.jpg"],
        specs(&[("Size", "6.1"), ("Tech", "AMOLED")]),
        vec![variant(1, 125_000_000), variant(2, 99_000_000)],
    );

    let outcome = reconcile(&pool, MOBILE, &payload, &ctx).await;
    assert_eq!(outcome, ItemOutcome::Created { logs_appended: 2 });

    let row = pricedb_db::get_product_by_api_id(&pool, 500)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.kind, "mobile");
    assert_eq!(row.rating_rate, dec!(4.1));

    let variants = pricedb_db::list_variants(&pool, row.id).await.unwrap();
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0].selling_price, 12_500_000);
    assert!(variants[0].color_id.is_some());

    let images = pricedb_db::list_product_images(&pool, row.id).await.unwrap();
    assert!(images[0].is_main);
    assert_eq!(count(&pool, "colors").await, 1, "shared color created once");
    assert_eq!(count(&pool, "product_specifications").await, 2);
    assert_eq!(count(&pool, "product_review_attributes").await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn unchanged_price_adds_no_history(pool: sqlx::PgPool) {
    let names = NameTable::default();
    let payload = product(501, &[], json!([]), vec![variant(1, 10_000)]);

    let first = parse_ctx(&names, run_time());
    let later = parse_ctx(&names, Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap());

    reconcile(&pool, MOBILE, &payload, &first).await;
    let outcome = reconcile(&pool, MOBILE, &payload, &later).await;

    assert_eq!(outcome, ItemOutcome::Updated { logs_appended: 0 });
    assert_eq!(count(&pool, "price_history").await, 1);

    let changed = product(501, &[], json!([]), vec![variant(1, 12_000)]);
    let outcome = reconcile(&pool, MOBILE, &changed, &later).await;
    assert_eq!(outcome, ItemOutcome::Updated { logs_appended: 1 });
    assert_eq!(count(&pool, "price_history").await, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn diff_replace_and_variant_sync(pool: sqlx::PgPool) {
    let names = NameTable::default();
    let ctx = parse_ctx(&names, run_time());

    let before = product(
        502,
        &["A", "B", "C"],
        specs(&[("A", "1"), ("B", "2"), ("C", "3")]),
        vec![variant(1, 1_000), variant(2, 2_000), variant(3, 3_000)],
    );
    reconcile(&pool, MOBILE, &before, &ctx).await;
    let product_id = pricedb_db::get_product_by_api_id(&pool, 502)
        .await
        .unwrap()
        .unwrap()
        .id;
    let old_variants = pricedb_db::list_variants(&pool, product_id).await.unwrap();

    let after = product(
        502,
        &["B2", "C2", "D"],
        specs(&[("B", "2b"), ("C", "3b"), ("D", "4")]),
        vec![variant(2, 2_500), variant(3, 3_000), variant(4, 4_000)],
    );
    let outcome = reconcile(&pool, MOBILE, &after, &ctx).await;
    // Variant 2 changed price and variant 4 is new.
    assert_eq!(outcome, ItemOutcome::Updated { logs_appended: 2 });

    let urls: Vec<String> = pricedb_db::list_product_images(&pool, product_id)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.image_url)
        .collect();
    assert_eq!(urls, vec!["B2", "C2", "D"]);

    let spec_values: Vec<(String, String)> =
        pricedb_db::list_product_specifications(&pool, product_id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| (s.attribute_title, s.value))
            .collect();
    assert_eq!(
        spec_values,
        vec![
            ("B".to_string(), "2b".to_string()),
            ("C".to_string(), "3b".to_string()),
            ("D".to_string(), "4".to_string()),
        ]
    );

    let new_variants = pricedb_db::list_variants(&pool, product_id).await.unwrap();
    let api_ids: Vec<i64> = new_variants.iter().map(|v| v.api_id).collect();
    assert_eq!(api_ids, vec![2, 3, 4]);
    assert_eq!(new_variants[0].id, old_variants[1].id, "variant 2 kept its row");
    assert_eq!(new_variants[1].id, old_variants[2].id, "variant 3 kept its row");
    assert_eq!(new_variants[0].selling_price, 250);

    let history = pricedb_db::list_price_history(&pool, new_variants[0].id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2, "history follows the preserved variant row");
    // Variant 1 was deleted along with its history.
    assert_eq!(count(&pool, "price_history").await, 2 + 1 + 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn missing_brand_id_writes_nothing(pool: sqlx::PgPool) {
    let names = NameTable::default();
    let ctx = parse_ctx(&names, run_time());
    let mut payload = product(503, &["A"], json!([]), vec![variant(1, 1_000)]);
    payload["data"]["product"]["brand"]
        .as_object_mut()
        .unwrap()
        .remove("id");

    let outcome = reconcile(&pool, MOBILE, &payload, &ctx).await;

    assert!(matches!(
        outcome,
        ItemOutcome::SkippedMissingData { ref reason } if reason.contains("brand.id")
    ));
    for table in [
        "products",
        "catalog_brands",
        "catalog_categories",
        "product_variants",
        "product_images",
        "price_history",
    ] {
        assert_eq!(count(&pool, table).await, 0, "{table} should be empty");
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn integrity_violation_rolls_back_the_whole_record(pool: sqlx::PgPool) {
    let names = NameTable::default();
    let ctx = parse_ctx(&names, run_time());
    // The same attribute twice in one group violates the per-product
    // specification key after the product, images and lookups were written.
    let payload = product(
        504,
        &["A"],
        specs(&[("Size", "6.1"), ("Size", "6.7")]),
        vec![variant(1, 1_000)],
    );

    let outcome = reconcile(&pool, MOBILE, &payload, &ctx).await;

    assert!(matches!(outcome, ItemOutcome::FailedPermanent { .. }));
    for table in [
        "products",
        "catalog_brands",
        "product_images",
        "spec_attributes",
        "product_variants",
    ] {
        assert_eq!(count(&pool, table).await, 0, "{table} should be rolled back");
    }

    // A well-formed item afterwards is unaffected.
    let good = product(505, &["A"], specs(&[("Size", "6.1")]), vec![variant(1, 1_000)]);
    assert_eq!(
        reconcile(&pool, MOBILE, &good, &ctx).await,
        ItemOutcome::Created { logs_appended: 1 }
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn detail_without_product_id_is_skipped_under_requested_id(pool: sqlx::PgPool) {
    let names = NameTable::default();
    let ctx = parse_ctx(&names, run_time());
    let mut payload = product(506, &["A"], json!([]), vec![variant(1, 1_000)]);
    payload["data"]["product"]
        .as_object_mut()
        .unwrap()
        .remove("id");

    let outcome = reconcile_detail(&pool, MOBILE, 506, &payload, &ctx).await;
    let ItemOutcome::SkippedMissingData { reason } = outcome else {
        panic!("expected a skip, got {outcome:?}");
    };
    assert!(reason.starts_with("506:"), "reason should name the item: {reason}");

    let outcome = reconcile_detail(&pool, MOBILE, 507, &json!({ "data": {} }), &ctx).await;
    let ItemOutcome::SkippedMissingData { reason } = outcome else {
        panic!("expected a skip, got {outcome:?}");
    };
    assert!(reason.starts_with("507:"), "reason should name the item: {reason}");
    assert_eq!(count(&pool, "products").await, 0);
}
