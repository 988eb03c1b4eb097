use std::collections::HashMap;

use pricedb_core::AssetObservation;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::{ListItem, ParseContext};
use crate::classify::classify_asset;
use crate::error::ScraperError;
use crate::json_path::{array_at, decimal_at, lookup, text_at};
use crate::normalize::{parse_source_timestamp, resolve_display_names};

/// Sections of the summary document that carry symbol titles.
const TITLE_SECTIONS: [&str; 3] = ["last", "tolerance_high", "tolerance_low"];

/// One item per entry of the `current` map, each enriched with `symbol`
/// and whatever `title` / `title_en` the title sections report for it.
pub(super) fn list_items(page: &Value) -> Vec<ListItem> {
    let mut titles: HashMap<String, (Option<String>, Option<String>)> = HashMap::new();
    for section in TITLE_SECTIONS {
        for entry in array_at(page, section) {
            if let Some(symbol) = text_at(entry, "name") {
                titles
                    .entry(symbol)
                    .or_insert_with(|| (text_at(entry, "title"), text_at(entry, "title_en")));
            }
        }
    }

    let Some(Value::Object(current)) = lookup(page, "current") else {
        return Vec::new();
    };

    current
        .iter()
        .map(|(symbol, details)| {
            let mut item = match details {
                Value::Object(fields) => fields.clone(),
                _ => Map::new(),
            };
            item.insert("symbol".to_owned(), Value::String(symbol.clone()));
            if let Some((title, title_en)) = titles.get(symbol) {
                if let Some(title) = title {
                    item.insert("title".to_owned(), Value::String(title.clone()));
                }
                if let Some(title_en) = title_en {
                    item.insert("title_en".to_owned(), Value::String(title_en.clone()));
                }
            }
            ListItem::Inline(Value::Object(item))
        })
        .collect()
}

/// Parses one enriched asset item.
///
/// # Errors
///
/// [`ScraperError::MissingData`] when the symbol, price, high, low, change or
/// timestamp is absent or unparseable.
pub fn parse_asset(item: &Value, ctx: &ParseContext<'_>) -> Result<AssetObservation, ScraperError> {
    let symbol = text_at(item, "symbol")
        .ok_or_else(|| ScraperError::missing("<asset>", "symbol"))?;
    let required = |key: &str| {
        decimal_at(item, key).ok_or_else(|| ScraperError::missing(symbol.clone(), key))
    };

    let price = required("p")?;
    let high = required("h")?;
    let low = required("l")?;
    let change_amount = required("d")?;
    let change_percent = decimal_at(item, "dp").unwrap_or(Decimal::ZERO);

    let raw_ts = text_at(item, "ts").ok_or_else(|| ScraperError::missing(symbol.clone(), "ts"))?;
    let observed_at = parse_source_timestamp(&raw_ts, ctx.timezone).ok_or_else(|| {
        ScraperError::missing(symbol.clone(), format!("unparseable timestamp {raw_ts:?}"))
    })?;

    let (name_fa, name_en) = resolve_display_names(
        &symbol,
        ctx.names.asset(&symbol),
        text_at(item, "title").as_deref(),
        text_at(item, "title_en").as_deref(),
    );
    let category = classify_asset(&symbol, &name_en);

    Ok(AssetObservation {
        symbol,
        name_fa,
        name_en,
        category,
        price,
        high,
        low,
        change_amount,
        change_percent,
        observed_at,
    })
}
