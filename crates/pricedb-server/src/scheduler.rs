//! Background job scheduler.
//!
//! Registers one recurring scrape job per configured domain. A tick that
//! fires while the previous run of the same domain is still going is
//! skipped.

use std::sync::Arc;

use pricedb_core::{AppConfig, Domain};
use pricedb_pipeline::{run_scrape_cycle, PipelineContext, ScrapeRequest, Trigger};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Domains without a source location are skipped with a warning. The
/// returned handle must be kept alive for the lifetime of the process.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, a
/// cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    ctx: Arc<PipelineContext>,
    config: &AppConfig,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    for domain in Domain::ALL {
        if !config.sources.is_configured(domain) {
            tracing::warn!(%domain, "scheduler: source not configured, no job registered");
            continue;
        }
        let Some(schedule) = config.schedules.get(&domain) else {
            tracing::warn!(%domain, "scheduler: no schedule for domain");
            continue;
        };
        register_scrape_job(&scheduler, Arc::clone(&ctx), domain, schedule, config.default_max_pages)
            .await?;
        tracing::info!(%domain, %schedule, "scheduler: job registered");
    }

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_scrape_job(
    scheduler: &JobScheduler,
    ctx: Arc<PipelineContext>,
    domain: Domain,
    schedule: &str,
    max_pages: u32,
) -> Result<(), JobSchedulerError> {
    let in_flight = Arc::new(Mutex::new(()));

    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let ctx = Arc::clone(&ctx);
        let in_flight = Arc::clone(&in_flight);

        Box::pin(async move {
            let Ok(_guard) = in_flight.try_lock() else {
                tracing::warn!(%domain, "scheduler: previous run still in progress, skipping tick");
                return;
            };
            run_scheduled(ctx, domain, max_pages).await;
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn run_scheduled(ctx: Arc<PipelineContext>, domain: Domain, max_pages: u32) {
    let request = ScrapeRequest {
        domain,
        start_page: 1,
        max_pages,
        trigger: Trigger::Scheduler,
    };
    match run_scrape_cycle(ctx, request).await {
        Ok(report) => tracing::info!(
            %domain,
            run_id = report.run_id,
            processed = report.summary.items_processed(),
            "scheduler: scrape run complete"
        ),
        Err(e) => tracing::error!(%domain, error = %e, "scheduler: scrape run failed"),
    }
}
