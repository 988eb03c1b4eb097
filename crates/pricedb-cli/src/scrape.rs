//! Manual scrape runs.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use pricedb_core::{AppConfig, Domain, NameTable};
use pricedb_pipeline::{run_scrape_cycle, CycleReport, PipelineContext, ScrapeRequest, Trigger};

pub(crate) async fn run_scrape(
    config: &AppConfig,
    pool: sqlx::PgPool,
    names: Arc<NameTable>,
    domain: Domain,
    start_page: u32,
    max_pages: u32,
) -> anyhow::Result<()> {
    let ctx = Arc::new(PipelineContext::from_app_config(config, pool, names)?);
    let report = run_scrape_cycle(
        ctx,
        ScrapeRequest {
            domain,
            start_page,
            max_pages,
            trigger: Trigger::Cli,
        },
    )
    .await?;

    print_report(domain, &report);
    Ok(())
}

/// Scrapes every configured domain, at most `parallel` at a time. Fails
/// only when every domain failed.
pub(crate) async fn run_scrape_all(
    config: &AppConfig,
    pool: sqlx::PgPool,
    names: Arc<NameTable>,
    max_pages: u32,
    parallel: usize,
) -> anyhow::Result<()> {
    let domains = config.sources.configured_domains();
    if domains.is_empty() {
        anyhow::bail!("no source URLs configured; set PRICEDB_*_URL variables");
    }

    let ctx = Arc::new(PipelineContext::from_app_config(config, pool, names)?);
    let results: Vec<(Domain, anyhow::Result<CycleReport>)> = stream::iter(domains.iter().copied())
        .map(|domain| {
            let ctx = Arc::clone(&ctx);
            async move {
                let request = ScrapeRequest {
                    domain,
                    start_page: 1,
                    max_pages,
                    trigger: Trigger::Cli,
                };
                (domain, run_scrape_cycle(ctx, request).await.map_err(anyhow::Error::from))
            }
        })
        .buffer_unordered(parallel.max(1))
        .collect()
        .await;

    let mut failed = 0usize;
    for (domain, result) in &results {
        match result {
            Ok(report) => print_report(*domain, report),
            Err(e) => {
                tracing::error!(%domain, error = %e, "scrape run failed");
                failed += 1;
            }
        }
    }

    if failed == results.len() {
        anyhow::bail!("all {failed} domain runs failed");
    }
    if failed > 0 {
        tracing::warn!(failed, total = results.len(), "some domain runs failed");
    }
    Ok(())
}

fn print_report(domain: Domain, report: &CycleReport) {
    let s = &report.summary;
    println!(
        "{domain}: run {} pages={} enqueued={} created={} updated={} skipped={} failed={} logs={}",
        report.run_id,
        s.pages_fetched,
        s.items_enqueued,
        s.created,
        s.updated,
        s.skipped,
        s.failed,
        s.logs_appended,
    );
    if let Some(err) = &s.list_error {
        println!("{domain}: list phase stopped early: {err}");
    }
}
