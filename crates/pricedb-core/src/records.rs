//! Normalized records produced by the per-domain parsers and consumed by the
//! reconciliation engine.
//!
//! Every record is source-agnostic: field names, units and time zones have
//! already been resolved. Catalog prices are stored in toman, so a value
//! of `1_250_000` here was `12_500_000` rial upstream.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::category::AssetCategory;
use crate::domain::{CatalogKind, Domain};

/// One observation of a tradable financial asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetObservation {
    /// Scrape-source symbol, the natural key.
    pub symbol: String,
    pub name_fa: String,
    pub name_en: String,
    pub category: AssetCategory,
    pub price: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub change_amount: Decimal,
    pub change_percent: Decimal,
    /// Source-local timestamp converted to UTC.
    pub observed_at: DateTime<Utc>,
}

/// One daily price quote for a car trim.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleObservation {
    pub brand: String,
    pub name: String,
    pub trim: String,
    pub production_year: i32,
    /// Free-form option string; empty when the source gives none.
    pub specifications: String,
    pub price: Decimal,
    pub log_date: NaiveDate,
}

/// One daily price quote for a motorcycle model, from a named provider.
#[derive(Debug, Clone, PartialEq)]
pub struct MotorcycleObservation {
    pub brand_fa: String,
    pub brand_en_slug: Option<String>,
    pub model_fa: String,
    pub model_en_slug: Option<String>,
    pub trim_fa: Option<String>,
    pub production_year: Option<i32>,
    pub origin: Option<String>,
    pub price: Decimal,
    pub source: String,
    pub log_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandRef {
    pub api_id: i64,
    pub code: String,
    pub title_fa: String,
    pub title_en: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    pub api_id: i64,
    pub code: String,
    pub title_fa: String,
    pub title_en: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRef {
    pub api_id: i64,
    pub title: String,
    pub hex_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerRef {
    pub api_id: i64,
    pub title: String,
    pub code: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarrantyRef {
    pub api_id: i64,
    pub title: String,
}

/// A sellable configuration of a catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    /// External id, scoped to the parent product.
    pub api_id: i64,
    pub selling_price: i64,
    pub rrp_price: i64,
    pub order_limit: i32,
    pub is_incredible: bool,
    pub color: Option<ColorRef>,
    pub seller: Option<SellerRef>,
    pub warranty: Option<WarrantyRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub url: String,
    pub is_main: bool,
}

/// A single specification value, addressed by group and attribute title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRecord {
    pub group: String,
    pub attribute: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewAttributeRecord {
    pub title: String,
    pub value: String,
}

/// Full detail payload for one catalog product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    pub kind: CatalogKind,
    pub api_id: i64,
    pub title_fa: String,
    pub title_en: String,
    pub status: String,
    pub rating_rate: Decimal,
    pub rating_count: i32,
    pub review_description: String,
    pub brand: BrandRef,
    pub category: CategoryRef,
    pub images: Vec<ImageRecord>,
    pub specifications: Vec<SpecRecord>,
    pub review_attributes: Vec<ReviewAttributeRecord>,
    pub variants: Vec<VariantRecord>,
}

/// A parsed, validated record ready for reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapedRecord {
    Asset(AssetObservation),
    Vehicle(VehicleObservation),
    Motorcycle(MotorcycleObservation),
    Product(Box<ProductDetail>),
}

impl ScrapedRecord {
    #[must_use]
    pub fn domain(&self) -> Domain {
        match self {
            ScrapedRecord::Asset(_) => Domain::Assets,
            ScrapedRecord::Vehicle(_) => Domain::Cars,
            ScrapedRecord::Motorcycle(_) => Domain::Motorcycles,
            ScrapedRecord::Product(p) => Domain::Catalog(p.kind),
        }
    }

    /// Human-readable identifier used in log fields.
    #[must_use]
    pub fn external_id(&self) -> String {
        match self {
            ScrapedRecord::Asset(a) => a.symbol.clone(),
            ScrapedRecord::Vehicle(v) => format!(
                "{} {} {} {}",
                v.brand, v.name, v.trim, v.production_year
            ),
            ScrapedRecord::Motorcycle(m) => format!("{} {}", m.brand_fa, m.model_fa),
            ScrapedRecord::Product(p) => p.api_id.to_string(),
        }
    }
}
