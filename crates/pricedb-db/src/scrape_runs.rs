//! Database operations for `scrape_runs`.
//!
//! A run moves `queued → running → completed`, or to `failed` when it could
//! not execute at all. Item-level failures are counted on a completed run.
//! Every transition is guarded on the current status.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const RUN_COLUMNS: &str = "id, public_id, domain, trigger_source, status, started_at, \
     completed_at, pages_fetched, items_enqueued, items_created, items_updated, \
     items_skipped, items_failed, logs_appended, error_message, created_at";

/// A row from the `scrape_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScrapeRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub domain: String,
    /// `scheduler` or `cli`.
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub pages_fetched: i32,
    pub items_enqueued: i32,
    pub items_created: i32,
    pub items_updated: i32,
    pub items_skipped: i32,
    pub items_failed: i32,
    pub logs_appended: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Counters recorded when a run completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeRunCounts {
    pub pages_fetched: i32,
    pub items_enqueued: i32,
    pub items_created: i32,
    pub items_updated: i32,
    pub items_skipped: i32,
    pub items_failed: i32,
    pub logs_appended: i32,
}

/// Creates a new run in `queued` status with a fresh public UUID.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including when
/// `trigger_source` is not `scheduler` or `cli`.
pub async fn create_scrape_run(
    pool: &PgPool,
    domain: &str,
    trigger_source: &str,
) -> Result<ScrapeRunRow, DbError> {
    let sql = format!(
        "INSERT INTO scrape_runs (public_id, domain, trigger_source, status) \
         VALUES ($1, $2, $3, 'queued') \
         RETURNING {RUN_COLUMNS}"
    );
    let row = sqlx::query_as::<_, ScrapeRunRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(domain)
        .bind(trigger_source)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Marks a queued run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidScrapeRunTransition`] if the run is not
/// `queued`, or [`DbError::Sqlx`] if the update fails.
pub async fn start_scrape_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scrape_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidScrapeRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a running run as `completed` and records its counters.
///
/// # Errors
///
/// Returns [`DbError::InvalidScrapeRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_scrape_run(
    pool: &PgPool,
    id: i64,
    counts: &ScrapeRunCounts,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scrape_runs \
         SET status = 'completed', completed_at = NOW(), \
             pages_fetched = $1, items_enqueued = $2, items_created = $3, \
             items_updated = $4, items_skipped = $5, items_failed = $6, \
             logs_appended = $7 \
         WHERE id = $8 AND status = 'running'",
    )
    .bind(counts.pages_fetched)
    .bind(counts.items_enqueued)
    .bind(counts.items_created)
    .bind(counts.items_updated)
    .bind(counts.items_skipped)
    .bind(counts.items_failed)
    .bind(counts.logs_appended)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidScrapeRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a queued or running run as `failed` with `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidScrapeRunTransition`] if the run has already
/// finished, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_scrape_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scrape_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status IN ('queued', 'running')",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidScrapeRunTransition {
            id,
            expected_status: "queued or running",
        });
    }

    Ok(())
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_scrape_run(pool: &PgPool, id: i64) -> Result<ScrapeRunRow, DbError> {
    let sql = format!("SELECT {RUN_COLUMNS} FROM scrape_runs WHERE id = $1");
    sqlx::query_as::<_, ScrapeRunRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` runs, newest first, optionally for one
/// domain only.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scrape_runs(
    pool: &PgPool,
    domain: Option<&str>,
    limit: i64,
) -> Result<Vec<ScrapeRunRow>, DbError> {
    let sql = format!(
        "SELECT {RUN_COLUMNS} FROM scrape_runs \
         WHERE ($1::text IS NULL OR domain = $1) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2"
    );
    let rows = sqlx::query_as::<_, ScrapeRunRow>(&sql)
        .bind(domain)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
