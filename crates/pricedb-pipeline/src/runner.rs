//! One scrape cycle for one domain: bookkeeping, a sequential list phase,
//! and a worker pool that fetches details and reconciles items.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use pricedb_core::{AppConfig, Domain, NameTable, SourceConfig};
use pricedb_scraper::{
    detail_url, list_items, list_source, ListItem, ListSource, PagePlan, ParseContext,
    RetryPolicy, SourceClient,
};
use serde_json::Value;
use sqlx::PgPool;

use crate::engine;
use crate::error::PipelineError;
use crate::outcome::{ItemOutcome, RunSummary};
use crate::queue::{WorkQueue, WorkerPool};

/// Who asked for a run; stored on the run row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Scheduler,
    Cli,
}

impl Trigger {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Scheduler => "scheduler",
            Trigger::Cli => "cli",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub domain: Domain,
    /// First page for page-addressable sources; ignored by single-document
    /// and next-link sources.
    pub start_page: u32,
    /// Page budget for the list phase.
    pub max_pages: u32,
    pub trigger: Trigger,
}

/// Shared, read-only state for every run. Cheap to share behind an `Arc`.
pub struct PipelineContext {
    pub pool: PgPool,
    pub client: SourceClient,
    pub sources: SourceConfig,
    pub names: Arc<NameTable>,
    pub timezone: Tz,
    pub worker_concurrency: usize,
    pub inter_request_delay: Duration,
    pub page_size: u32,
}

impl PipelineContext {
    /// # Errors
    ///
    /// Returns [`PipelineError::Scraper`] if the HTTP client cannot be built.
    pub fn from_app_config(
        config: &AppConfig,
        pool: PgPool,
        names: Arc<NameTable>,
    ) -> Result<Self, PipelineError> {
        let retry = RetryPolicy::new(
            config.scraper_max_retries,
            Duration::from_secs(config.scraper_retry_delay_secs),
        );
        let client = SourceClient::new(config.scraper_request_timeout_secs, retry)?;

        Ok(Self {
            pool,
            client,
            sources: config.sources.clone(),
            names,
            timezone: config.source_timezone,
            worker_concurrency: config.worker_concurrency,
            inter_request_delay: Duration::from_millis(config.scraper_inter_request_delay_ms),
            page_size: config.motorcycles_page_size,
        })
    }
}

/// A finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub run_id: i64,
    pub summary: RunSummary,
}

/// Runs one scrape cycle for `request.domain`.
///
/// The run is recorded in `scrape_runs`. Item failures are counted, never
/// propagated: a run with failed items still completes. A list page that
/// cannot be fetched stops paging, and items already queued are still
/// processed.
///
/// # Errors
///
/// - [`PipelineError::SourceNotConfigured`] before any run row is written.
/// - [`PipelineError::Db`] when run bookkeeping fails; the run is marked
///   `failed` on a best-effort basis.
pub async fn run_scrape_cycle(
    ctx: Arc<PipelineContext>,
    request: ScrapeRequest,
) -> Result<CycleReport, PipelineError> {
    let domain = request.domain;
    let source = list_source(domain, &ctx.sources, ctx.page_size)
        .ok_or(PipelineError::SourceNotConfigured(domain))?;

    let run =
        pricedb_db::create_scrape_run(&ctx.pool, domain.as_str(), request.trigger.as_str()).await?;
    if let Err(e) = pricedb_db::start_scrape_run(&ctx.pool, run.id).await {
        fail_run_best_effort(&ctx.pool, run.id, domain, e.to_string()).await;
        return Err(e.into());
    }

    tracing::info!(
        %domain,
        run_id = run.id,
        trigger = request.trigger.as_str(),
        detail_phase = domain.has_detail_phase(),
        start_page = request.start_page,
        max_pages = request.max_pages,
        "scrape run started"
    );

    let observed_at = Utc::now();
    let worker_ctx = Arc::clone(&ctx);
    let (queue, workers) = WorkerPool::spawn(ctx.worker_concurrency, move |item: ListItem| {
        let ctx = Arc::clone(&worker_ctx);
        async move { process_item(&ctx, domain, item, observed_at).await }
    });

    let mut summary = RunSummary::default();
    list_phase(&ctx, domain, &source, &request, &queue, &mut summary).await;
    drop(queue);
    summary.merge_items(&workers.join().await);

    if let Err(e) = pricedb_db::complete_scrape_run(&ctx.pool, run.id, &summary.to_counts()).await
    {
        fail_run_best_effort(&ctx.pool, run.id, domain, e.to_string()).await;
        return Err(e.into());
    }

    tracing::info!(
        %domain,
        run_id = run.id,
        pages = summary.pages_fetched,
        enqueued = summary.items_enqueued,
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        failed = summary.failed,
        logs_appended = summary.logs_appended,
        "scrape run completed"
    );

    Ok(CycleReport {
        run_id: run.id,
        summary,
    })
}

/// Walks the list pages in order and enqueues every discovered item. Never
/// processes an item itself.
async fn list_phase(
    ctx: &PipelineContext,
    domain: Domain,
    source: &ListSource,
    request: &ScrapeRequest,
    queue: &WorkQueue<ListItem>,
    summary: &mut RunSummary,
) {
    let mut plan = PagePlan::new(
        source.pagination.clone(),
        &source.url,
        request.start_page,
        request.max_pages,
    );

    while let Some(page) = plan.next_request() {
        if summary.pages_fetched > 0 && !ctx.inter_request_delay.is_zero() {
            tokio::time::sleep(ctx.inter_request_delay).await;
        }

        let body = match ctx.client.get_json(&page.url, &page.query).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    %domain,
                    page = page.page,
                    error = %e,
                    "list page failed, stopping pagination"
                );
                summary.list_error = Some(e.to_string());
                break;
            }
        };
        summary.pages_fetched += 1;

        let items = list_items(domain, &body);
        let count = items.len();
        tracing::debug!(%domain, page = page.page, items = count, "list page fetched");

        for item in items {
            tracing::trace!(%domain, item = %item.label(), "item enqueued");
            if !queue.push(item).await {
                tracing::error!(%domain, "work queue closed before the list phase finished");
                return;
            }
            summary.items_enqueued += 1;
        }
        plan.record_page(&page, &body, count);
    }
}

/// Fetches the payload for one item (when the domain has a detail phase)
/// and reconciles it. Always yields an outcome.
pub async fn process_item(
    ctx: &PipelineContext,
    domain: Domain,
    item: ListItem,
    observed_at: DateTime<Utc>,
) -> ItemOutcome {
    let parse_ctx = ParseContext {
        observed_at,
        timezone: ctx.timezone,
        names: &ctx.names,
    };

    match item {
        ListItem::Inline(payload) => {
            engine::reconcile(&ctx.pool, domain, &payload, &parse_ctx).await
        }
        ListItem::Detail(id) => match fetch_detail(ctx, domain, id).await {
            Ok(payload) => {
                engine::reconcile_detail(&ctx.pool, domain, id, &payload, &parse_ctx).await
            }
            Err(e) => {
                tracing::error!(%domain, item = id, error = %e, "detail fetch failed");
                ItemOutcome::FailedPermanent {
                    reason: e.to_string(),
                }
            }
        },
    }
}

async fn fetch_detail(ctx: &PipelineContext, domain: Domain, id: i64) -> Result<Value, PipelineError> {
    let url =
        detail_url(domain, &ctx.sources, id).ok_or(PipelineError::SourceNotConfigured(domain))?;
    Ok(ctx.client.get_json(&url, &[]).await?)
}

async fn fail_run_best_effort(pool: &PgPool, run_id: i64, domain: Domain, message: String) {
    if let Err(mark_err) = pricedb_db::fail_scrape_run(pool, run_id, &message).await {
        tracing::error!(
            %domain,
            run_id,
            error = %mark_err,
            "failed to mark scrape run as failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_names_match_run_check_constraint() {
        assert_eq!(Trigger::Scheduler.as_str(), "scheduler");
        assert_eq!(Trigger::Cli.as_str(), "cli");
    }
}
