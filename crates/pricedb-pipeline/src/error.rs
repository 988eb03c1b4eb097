use pricedb_core::Domain;
use pricedb_db::DbError;
use pricedb_scraper::ScraperError;
use thiserror::Error;

/// Run-level failures. Item failures never surface here; they are counted
/// in the run summary.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no source URL configured for domain '{0}'")]
    SourceNotConfigured(Domain),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Scraper(#[from] ScraperError),
}
