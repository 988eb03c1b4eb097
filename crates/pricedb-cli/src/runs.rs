use pricedb_core::Domain;

pub(crate) async fn list_runs(
    pool: &sqlx::PgPool,
    domain: Option<Domain>,
    limit: i64,
) -> anyhow::Result<()> {
    let runs =
        pricedb_db::list_scrape_runs(pool, domain.map(Domain::as_str), limit.clamp(1, 500)).await?;

    if runs.is_empty() {
        println!("no scrape runs recorded");
        return Ok(());
    }

    println!(
        "{:>6}  {:<10} {:<9} {:<9} {:>5} {:>7} {:>7} {:>7} {:>6}  started",
        "id", "domain", "trigger", "status", "pages", "created", "updated", "skipped", "failed"
    );
    for run in runs {
        let started = run
            .started_at
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
        println!(
            "{:>6}  {:<10} {:<9} {:<9} {:>5} {:>7} {:>7} {:>7} {:>6}  {started}",
            run.id,
            run.domain,
            run.trigger_source,
            run.status,
            run.pages_fetched,
            run.items_created,
            run.items_updated,
            run.items_skipped,
            run.items_failed,
        );
        if let Some(message) = run.error_message {
            println!("        error: {message}");
        }
    }
    Ok(())
}
