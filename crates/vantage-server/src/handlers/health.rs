//! Health check, API index and unknown-route handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{ApiResponse, AppError, AppState};

/// Health check payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub environment: String,
    pub data_source: &'static str,
    pub data_records: usize,
}

/// API index shown at `/` when no frontend is served
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIndex {
    pub message: &'static str,
    pub environment: String,
    pub data_records: usize,
    pub endpoints: Vec<&'static str>,
}

/// GET /api/health - Liveness and record-count check
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthStatus>>, AppError> {
    let data_records = state.store.count()?;

    Ok(ApiResponse::ok(HealthStatus {
        status: "OK",
        message: "Vantage API is running",
        timestamp: chrono::Utc::now().to_rfc3339(),
        environment: state.config.environment.clone(),
        data_source: state.store.kind().as_str(),
        data_records,
    }))
}

/// GET / - API index
pub async fn index(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ApiIndex>>, AppError> {
    let data_records = state.store.count()?;

    Ok(ApiResponse::ok(ApiIndex {
        message: "Vantage insights API",
        environment: state.config.environment.clone(),
        data_records,
        endpoints: vec![
            "/api/health",
            "/api/insights",
            "/api/insights/filters",
            "/api/insights/stats",
            "/api/insights/:id",
        ],
    }))
}

/// Fallback for unknown routes
pub async fn route_not_found() -> AppError {
    AppError::not_found("Route not found")
}
