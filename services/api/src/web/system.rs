//! services/api/src/web/system.rs
//!
//! Liveness and marketplace-wide statistics.

use crate::error::ApiResult;
use crate::web::dto::{HealthResponse, StatsResponse};
use crate::web::state::AppState;
use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let storage = if state.config.database_url.is_some() {
        "postgres"
    } else {
        "memory"
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        storage: storage.to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/stats",
    responses((status = 200, description = "Marketplace totals", body = StatsResponse))
)]
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatsResponse>> {
    let stats = state.payments.stats().await?;
    Ok(Json(stats.into()))
}
