use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use pricedb_core::Domain;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ScrapeRunsQuery {
    pub limit: Option<i64>,
    pub domain: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ScrapeRunItem {
    scrape_run_id: Uuid,
    domain: String,
    trigger_source: String,
    status: String,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    pages_fetched: i32,
    items_enqueued: i32,
    items_created: i32,
    items_updated: i32,
    items_skipped: i32,
    items_failed: i32,
    logs_appended: i32,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<pricedb_db::ScrapeRunRow> for ScrapeRunItem {
    fn from(row: pricedb_db::ScrapeRunRow) -> Self {
        Self {
            scrape_run_id: row.public_id,
            domain: row.domain,
            trigger_source: row.trigger_source,
            status: row.status,
            started_at: row.started_at,
            completed_at: row.completed_at,
            pages_fetched: row.pages_fetched,
            items_enqueued: row.items_enqueued,
            items_created: row.items_created,
            items_updated: row.items_updated,
            items_skipped: row.items_skipped,
            items_failed: row.items_failed,
            logs_appended: row.logs_appended,
            error_message: row.error_message,
            created_at: row.created_at,
        }
    }
}

pub(super) async fn list_scrape_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ScrapeRunsQuery>,
) -> Result<Json<ApiResponse<Vec<ScrapeRunItem>>>, ApiError> {
    let domain = match query.domain.as_deref() {
        Some(raw) => Some(raw.parse::<Domain>().map_err(|e| {
            ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
        })?),
        None => None,
    };

    let rows = pricedb_db::list_scrape_runs(
        &state.pool,
        domain.map(Domain::as_str),
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(ScrapeRunItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::ScrapeRunItem;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn scrape_run_item_is_serializable() {
        let item = ScrapeRunItem {
            scrape_run_id: Uuid::new_v4(),
            domain: "mobile".to_string(),
            trigger_source: "scheduler".to_string(),
            status: "completed".to_string(),
            started_at: Some(Utc::now()),
            completed_at: Some(Utc::now()),
            pages_fetched: 3,
            items_enqueued: 60,
            items_created: 4,
            items_updated: 55,
            items_skipped: 1,
            items_failed: 0,
            logs_appended: 12,
            error_message: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&item).expect("serialize scrape run");
        assert!(json.contains("\"domain\":\"mobile\""));
        assert!(json.contains("\"logs_appended\":12"));
    }
}
