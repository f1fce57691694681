//! Insight handlers: result pages, single records, filter options, statistics

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use tracing::debug;

use crate::{ApiResponse, AppError, AppState, PagedResponse};
use vantage_core::models::{FilterOptions, Insight, InsightStats, QueryParams};

/// GET /api/insights - Filtered, sorted, paginated insight records
///
/// Accepts the categorical filters (`end_year`, `topic`, `sector`, `region`,
/// `pestle`, `source`, `country`), `search`, `page`, `limit`, `sortBy` and
/// `sortOrder`. A filter value of `all` or empty is ignored.
pub async fn list_insights(
    State(state): State<Arc<AppState>>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<PagedResponse<Insight>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::bad_request(&e.body_text()))?;
    let query = params.into_query()?;

    let result = state.store.query(&query)?;
    let pagination = result.pagination(&query);

    debug!(
        total = result.total,
        page = query.page,
        returned = result.items.len(),
        "Listed insights"
    );

    Ok(Json(PagedResponse {
        success: true,
        data: result.items,
        pagination,
    }))
}

/// GET /api/insights/:id - One insight record
pub async fn get_insight(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Insight>>, AppError> {
    let insight = state.store.require(&id)?;
    Ok(ApiResponse::ok(insight))
}

/// GET /api/insights/filters - Values every filter control can take
pub async fn get_filter_options(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<FilterOptions>>, AppError> {
    let options = state.store.filter_options()?;
    Ok(ApiResponse::ok(options))
}

/// GET /api/insights/stats - Averages, extremes and group breakdowns
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<InsightStats>>, AppError> {
    let stats = state.store.summarize()?;
    Ok(ApiResponse::ok(stats))
}
