//! Per-domain payload descriptors.
//!
//! Each domain contributes three things: how its list endpoint paginates,
//! how to split a list page into work items, and how to turn one item's
//! payload into a [`ScrapedRecord`]. Everything else in the pipeline is
//! shared.

mod assets;
mod cars;
mod catalog;
mod motorcycles;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use pricedb_core::{Domain, NameTable, ScrapedRecord, SourceConfig};
use serde_json::Value;

use crate::error::ScraperError;
use crate::pagination::Pagination;

pub use assets::parse_asset;
pub use cars::parse_vehicle;
pub use catalog::parse_product;
pub use motorcycles::parse_motorcycle;

/// One unit of work discovered on a list page.
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
    /// The list page already carries the full payload.
    Inline(Value),
    /// Only an id is known; the payload comes from a detail request.
    Detail(i64),
}

impl ListItem {
    /// Identifier used in log fields.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            ListItem::Detail(id) => id.to_string(),
            ListItem::Inline(payload) => ["symbol", "model_fa", "id"]
                .iter()
                .find_map(|key| crate::json_path::text_at(payload, key))
                .or_else(|| crate::json_path::text_at(payload, "car_properties.model.title"))
                .unwrap_or_else(|| "<unlabelled>".to_owned()),
        }
    }
}

/// Inputs shared by every parser in one run.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    /// When the run observed the data. Daily sources log against this date.
    pub observed_at: DateTime<Utc>,
    /// Zone for source-local timestamps and calendar dates.
    pub timezone: Tz,
    pub names: &'a NameTable,
}

impl ParseContext<'_> {
    /// Calendar date of the observation in the source time zone.
    #[must_use]
    pub fn log_date(&self) -> NaiveDate {
        self.observed_at.with_timezone(&self.timezone).date_naive()
    }
}

/// Where and how a domain's list endpoint is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSource {
    pub pagination: Pagination,
    pub url: String,
}

/// List source for `domain`, or `None` when it has no configured URL.
#[must_use]
pub fn list_source(domain: Domain, sources: &SourceConfig, page_size: u32) -> Option<ListSource> {
    let (pagination, url) = match domain {
        Domain::Assets => (Pagination::Single, sources.assets_url.clone()?),
        Domain::Cars => (Pagination::NextLink, sources.cars_url.clone()?),
        Domain::Motorcycles => (
            Pagination::PageIndex { page_size },
            sources.motorcycles_url.clone()?,
        ),
        Domain::Catalog(kind) => (
            Pagination::PageTemplate,
            sources.catalog.get(&kind)?.list_url.clone(),
        ),
    };
    Some(ListSource { pagination, url })
}

/// Detail URL for an item discovered by id, for domains that have one.
#[must_use]
pub fn detail_url(domain: Domain, sources: &SourceConfig, id: i64) -> Option<String> {
    match domain {
        Domain::Catalog(kind) => sources
            .catalog
            .get(&kind)
            .map(|endpoints| endpoints.detail_page_url(id)),
        Domain::Assets | Domain::Cars | Domain::Motorcycles => None,
    }
}

/// Splits one list page into work items.
#[must_use]
pub fn list_items(domain: Domain, page: &Value) -> Vec<ListItem> {
    match domain {
        Domain::Assets => assets::list_items(page),
        Domain::Cars => cars::list_items(page),
        Domain::Motorcycles => motorcycles::list_items(page),
        Domain::Catalog(_) => catalog::list_items(page),
    }
}

/// Parses one item payload into a normalized record.
///
/// # Errors
///
/// Returns [`ScraperError::MissingData`] when an identifying or mandatory
/// field is absent or unparseable.
pub fn parse_record(
    domain: Domain,
    payload: &Value,
    ctx: &ParseContext<'_>,
) -> Result<ScrapedRecord, ScraperError> {
    match domain {
        Domain::Assets => parse_asset(payload, ctx).map(ScrapedRecord::Asset),
        Domain::Cars => parse_vehicle(payload, ctx).map(ScrapedRecord::Vehicle),
        Domain::Motorcycles => parse_motorcycle(payload, ctx).map(ScrapedRecord::Motorcycle),
        Domain::Catalog(kind) => {
            parse_product(kind, payload).map(|p| ScrapedRecord::Product(Box::new(p)))
        }
    }
}
