//! The scrape-and-reconcile pipeline.
//!
//! [`run_scrape_cycle`] drives one run for one domain; [`reconcile`] is the
//! single entry point that turns an item payload into database state.

pub mod engine;
pub mod error;
pub mod outcome;
pub mod queue;
pub mod runner;

pub use engine::{apply_in_transaction, apply_record, reconcile, reconcile_detail, Applied};
pub use error::PipelineError;
pub use outcome::{ItemOutcome, RunSummary};
pub use queue::{WorkQueue, WorkerPool};
pub use runner::{
    process_item, run_scrape_cycle, CycleReport, PipelineContext, ScrapeRequest, Trigger,
};
