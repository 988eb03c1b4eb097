use pricedb_core::VehicleObservation;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use super::{ListItem, ParseContext};
use crate::error::ScraperError;
use crate::json_path::{array_at, decimal_at, text_at, text_or};

/// Quotes are grouped: `results[].dailycars[]`.
pub(super) fn list_items(page: &Value) -> Vec<ListItem> {
    array_at(page, "results")
        .iter()
        .flat_map(|group| array_at(group, "dailycars"))
        .cloned()
        .map(ListItem::Inline)
        .collect()
}

/// Parses one daily car quote. The log date is the run date in the source
/// time zone.
///
/// # Errors
///
/// [`ScraperError::MissingData`] when brand, model, trim, year or a positive
/// price is missing.
pub fn parse_vehicle(
    item: &Value,
    ctx: &ParseContext<'_>,
) -> Result<VehicleObservation, ScraperError> {
    let prop = |name: &str| text_at(item, &format!("car_properties.{name}.title"));
    let label = || {
        [prop("brand"), prop("model"), prop("trim")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    };
    let missing = |field: &str| ScraperError::missing(label(), field);

    let brand = prop("brand").ok_or_else(|| missing("car_properties.brand.title"))?;
    let name = prop("model").ok_or_else(|| missing("car_properties.model.title"))?;
    let trim = prop("trim").ok_or_else(|| missing("car_properties.trim.title"))?;
    let production_year = decimal_at(item, "car_properties.year.title")
        .and_then(|y| y.to_i32())
        .ok_or_else(|| missing("car_properties.year.title"))?;
    let price = decimal_at(item, "price")
        .filter(|p| *p > Decimal::ZERO)
        .ok_or_else(|| missing("price"))?;

    Ok(VehicleObservation {
        brand,
        name,
        trim,
        production_year,
        specifications: text_or(item, "car_properties.option.title", ""),
        price,
        log_date: ctx.log_date(),
    })
}
