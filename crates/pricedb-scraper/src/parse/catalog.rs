use pricedb_core::{
    BrandRef, CatalogKind, CategoryRef, ColorRef, ImageRecord, ProductDetail,
    ReviewAttributeRecord, SellerRef, SpecRecord, VariantRecord, WarrantyRef,
};
use rust_decimal::Decimal;
use serde_json::Value;

use super::ListItem;
use crate::error::ScraperError;
use crate::json_path::{array_at, bool_at, decimal_at, i64_at, id_at, lookup, text_at, text_or};
use crate::normalize::{join_values, rial_to_toman};

/// Products are discovered by id on `data.products[]`; entries without a
/// usable id are dropped.
pub(super) fn list_items(page: &Value) -> Vec<ListItem> {
    array_at(page, "data.products")
        .iter()
        .filter_map(|product| id_at(product, "id"))
        .map(ListItem::Detail)
        .collect()
}

/// Parses a product detail response (`data.product`).
///
/// Prices arrive in rial and are converted to toman.
///
/// # Errors
///
/// [`ScraperError::MissingData`] when the product, its `id`, `brand.id` or
/// `category.id` is missing.
pub fn parse_product(kind: CatalogKind, body: &Value) -> Result<ProductDetail, ScraperError> {
    let product = lookup(body, "data.product")
        .ok_or_else(|| ScraperError::missing("<product>", "data.product"))?;
    let api_id = id_at(product, "id").ok_or_else(|| ScraperError::missing("<product>", "id"))?;
    let item = api_id.to_string();

    let brand_id =
        id_at(product, "brand.id").ok_or_else(|| ScraperError::missing(&item, "brand.id"))?;
    let category_id = id_at(product, "category.id")
        .ok_or_else(|| ScraperError::missing(&item, "category.id"))?;

    let brand = BrandRef {
        api_id: brand_id,
        code: text_or(product, "brand.code", ""),
        title_fa: text_or(product, "brand.title_fa", ""),
        title_en: text_or(product, "brand.title_en", ""),
        logo_url: text_at(product, "brand.logo.url.0"),
    };
    let category = CategoryRef {
        api_id: category_id,
        code: text_or(product, "category.code", ""),
        title_fa: text_or(product, "category.title_fa", ""),
        title_en: text_or(product, "category.title_en", ""),
    };

    Ok(ProductDetail {
        kind,
        api_id,
        title_fa: text_or(product, "title_fa", ""),
        title_en: text_or(product, "title_en", ""),
        status: text_or(product, "status", "unavailable"),
        rating_rate: decimal_at(product, "rating.rate").unwrap_or(Decimal::ZERO),
        rating_count: i64_at(product, "rating.count")
            .and_then(|c| i32::try_from(c).ok())
            .unwrap_or(0),
        review_description: text_or(product, "review.description", ""),
        brand,
        category,
        images: images(product),
        specifications: specifications(product),
        review_attributes: review_attributes(product),
        variants: variants(product),
    })
}

/// Gallery images; the one matching `images.main.url[0]` is flagged main.
/// Repeated URLs collapse to their first occurrence.
fn images(product: &Value) -> Vec<ImageRecord> {
    let main = text_at(product, "images.main.url.0");
    let mut out: Vec<ImageRecord> = Vec::new();
    for url in array_at(product, "images.list")
        .iter()
        .filter_map(|img| text_at(img, "url.0"))
    {
        if out.iter().any(|existing| existing.url == url) {
            continue;
        }
        out.push(ImageRecord {
            is_main: main.as_deref() == Some(url.as_str()),
            url,
        });
    }
    out
}

fn specifications(product: &Value) -> Vec<SpecRecord> {
    let mut out = Vec::new();
    for group in array_at(product, "specifications") {
        let Some(group_title) = text_at(group, "title") else {
            continue;
        };
        for attribute in array_at(group, "attributes") {
            let Some(attribute_title) = text_at(attribute, "title") else {
                continue;
            };
            let value = join_values(array_at(attribute, "values"));
            if value.is_empty() {
                continue;
            }
            out.push(SpecRecord {
                group: group_title.clone(),
                attribute: attribute_title,
                value,
            });
        }
    }
    out
}

fn review_attributes(product: &Value) -> Vec<ReviewAttributeRecord> {
    array_at(product, "review.attributes")
        .iter()
        .filter_map(|attr| {
            let title = text_at(attr, "title")?;
            let value = join_values(array_at(attr, "values"));
            (!value.is_empty()).then_some(ReviewAttributeRecord { title, value })
        })
        .collect()
}

fn variants(product: &Value) -> Vec<VariantRecord> {
    let toman = |v: &Value, path: &str| {
        decimal_at(v, path)
            .and_then(rial_to_toman)
            .unwrap_or(0)
    };

    array_at(product, "variants")
        .iter()
        .filter_map(|v| {
            let api_id = id_at(v, "id")?;
            Some(VariantRecord {
                api_id,
                selling_price: toman(v, "price.selling_price"),
                rrp_price: toman(v, "price.rrp_price"),
                order_limit: i64_at(v, "price.order_limit")
                    .and_then(|n| i32::try_from(n).ok())
                    .unwrap_or(0),
                is_incredible: bool_at(v, "price.is_incredible").unwrap_or(false),
                color: id_at(v, "color.id").map(|id| ColorRef {
                    api_id: id,
                    title: text_or(v, "color.title", ""),
                    hex_code: text_or(v, "color.hex_code", ""),
                }),
                seller: id_at(v, "seller.id").map(|id| SellerRef {
                    api_id: id,
                    title: text_or(v, "seller.title", ""),
                    code: text_or(v, "seller.code", ""),
                    url: text_or(v, "seller.url", ""),
                }),
                warranty: id_at(v, "warranty.id").map(|id| WarrantyRef {
                    api_id: id,
                    title: text_or(v, "warranty.title_fa", ""),
                }),
            })
        })
        .collect()
}
