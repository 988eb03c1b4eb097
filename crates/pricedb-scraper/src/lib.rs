pub mod classify;
pub mod client;
pub mod error;
pub mod json_path;
pub mod normalize;
pub mod pagination;
pub mod parse;
pub mod retry;

pub use classify::classify_asset;
pub use client::SourceClient;
pub use error::ScraperError;
pub use pagination::{PagePlan, PageRequest, Pagination};
pub use parse::{
    detail_url, list_items, list_source, parse_record, ListItem, ListSource, ParseContext,
};
pub use retry::RetryPolicy;
