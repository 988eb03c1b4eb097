use pricedb_core::MotorcycleObservation;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use super::{ListItem, ParseContext};
use crate::error::ScraperError;
use crate::json_path::{array_at, decimal_at, text_at, text_or};

/// Items are grouped per brand: `data[].items[]`.
pub(super) fn list_items(page: &Value) -> Vec<ListItem> {
    array_at(page, "data")
        .iter()
        .flat_map(|group| array_at(group, "items"))
        .cloned()
        .map(ListItem::Inline)
        .collect()
}

/// # Errors
///
/// [`ScraperError::MissingData`] when the Persian brand, Persian model or a
/// positive price is missing.
pub fn parse_motorcycle(
    item: &Value,
    ctx: &ParseContext<'_>,
) -> Result<MotorcycleObservation, ScraperError> {
    let label = || text_or(item, "model_fa", "<motorcycle>");

    let brand_fa =
        text_at(item, "brand_fa").ok_or_else(|| ScraperError::missing(label(), "brand_fa"))?;
    let model_fa =
        text_at(item, "model_fa").ok_or_else(|| ScraperError::missing(label(), "model_fa"))?;
    let price = decimal_at(item, "price")
        .filter(|p| *p > Decimal::ZERO)
        .ok_or_else(|| ScraperError::missing(label(), "price"))?;

    Ok(MotorcycleObservation {
        brand_fa,
        brand_en_slug: text_at(item, "brand"),
        model_fa,
        model_en_slug: text_at(item, "model"),
        trim_fa: text_at(item, "class"),
        production_year: decimal_at(item, "model_year").and_then(|y| y.to_i32()),
        origin: text_at(item, "manufacture_type.display_name"),
        price,
        source: text_or(item, "price_provider", "Unknown"),
        log_date: ctx.log_date(),
    })
}

#[cfg(test)]
mod tests {
    use pricedb_core::NameTable;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn ctx(names: &NameTable) -> ParseContext<'_> {
        ParseContext {
            observed_at: "2024-05-10T08:00:00Z".parse().unwrap(),
            timezone: chrono_tz::Asia::Tehran,
            names,
        }
    }

    fn listing() -> Value {
        json!({
            "data": [
                { "brand": "honda", "items": [
                    {
                        "brand_fa": "هوندا", "brand": "honda",
                        "model_fa": "سی جی ۱۲۵", "model": "cg125",
                        "class": "", "model_year": 1403,
                        "manufacture_type": { "display_name": "وارداتی" },
                        "price": "145,000,000", "price_provider": "bama"
                    },
                    { "brand_fa": "هوندا", "model_fa": "ویو", "price": null }
                ]},
                { "brand": "empty", "items": [] }
            ]
        })
    }

    #[test]
    fn flattens_brand_groups() {
        assert_eq!(list_items(&listing()).len(), 2);
        assert!(list_items(&json!({"data": []})).is_empty());
    }

    #[test]
    fn parses_full_item() {
        let names = NameTable::default();
        let items = list_items(&listing());
        let ListItem::Inline(first) = &items[0] else {
            panic!("expected inline item");
        };
        let obs = parse_motorcycle(first, &ctx(&names)).unwrap();
        assert_eq!(obs.brand_en_slug.as_deref(), Some("honda"));
        assert_eq!(obs.model_en_slug.as_deref(), Some("cg125"));
        assert_eq!(obs.trim_fa, None);
        assert_eq!(obs.production_year, Some(1403));
        assert_eq!(obs.origin.as_deref(), Some("وارداتی"));
        assert_eq!(obs.price, dec!(145000000));
        assert_eq!(obs.source, "bama");
    }

    #[test]
    fn provider_defaults_to_unknown() {
        let names = NameTable::default();
        let item = json!({ "brand_fa": "کویر", "model_fa": "۲۰۰", "price": 90_000_000 });
        let obs = parse_motorcycle(&item, &ctx(&names)).unwrap();
        assert_eq!(obs.source, "Unknown");
        assert_eq!(obs.production_year, None);
    }

    #[test]
    fn missing_price_is_missing_data() {
        let names = NameTable::default();
        let items = list_items(&listing());
        let ListItem::Inline(second) = &items[1] else {
            panic!("expected inline item");
        };
        let err = parse_motorcycle(second, &ctx(&names)).unwrap_err();
        assert!(matches!(err, ScraperError::MissingData { ref item, .. } if item == "ویو"));
    }
}
