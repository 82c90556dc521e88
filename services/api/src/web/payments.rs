//! services/api/src/web/payments.rs
//!
//! Handlers for `/api/payments`.

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::web::dto::{
    positive_amount, CreatorPaymentsResponse, DistributionResponse, ImpactBonusRequest,
    ImpactBonusResponse,
};
use crate::web::extract::{ApiJson, ApiPath};
use crate::web::state::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Credit every creator with the net earnings of their transactions.
///
/// Not idempotent: each call credits all transactions again.
#[utoipa::path(
    post,
    path = "/api/payments/distribute",
    responses(
        (status = 200, description = "One entry per creator with sales", body = [DistributionResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[instrument(name = "handler::distribute_payments", skip(state))]
pub async fn distribute_payments_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<DistributionResponse>>> {
    let distributions = state.payments.distribute_payments().await?;
    Ok(Json(
        distributions
            .into_iter()
            .map(DistributionResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/payments/creator/{id}",
    params(("id" = Uuid, Path, description = "Creator id")),
    responses(
        (status = 200, description = "Earnings and transactions of the creator", body = CreatorPaymentsResponse),
        (status = 404, description = "Creator not found", body = ErrorBody)
    )
)]
pub async fn creator_payments_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(creator_id): ApiPath<Uuid>,
) -> ApiResult<Json<CreatorPaymentsResponse>> {
    let summary = state.payments.creator_payments(creator_id).await?;
    Ok(Json(summary.into()))
}

/// Split a revenue pool between creators by impact score.
#[utoipa::path(
    post,
    path = "/api/payments/impact-bonus",
    request_body = ImpactBonusRequest,
    responses(
        (status = 200, description = "Bonus per creator; empty when every score is zero", body = [ImpactBonusResponse]),
        (status = 400, description = "Missing or non-positive revenuePool", body = ErrorBody)
    )
)]
#[instrument(name = "handler::impact_bonus", skip(state, req))]
pub async fn impact_bonus_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ImpactBonusRequest>,
) -> ApiResult<Json<Vec<ImpactBonusResponse>>> {
    let revenue_pool = req
        .revenue_pool
        .ok_or_else(|| ApiError::Validation("revenuePool is required".to_string()))
        .and_then(|pool| positive_amount(pool, "revenuePool"))?;

    let bonuses = state
        .payments
        .calculate_impact_based_bonus(revenue_pool)
        .await?;
    info!(%revenue_pool, recipients = bonuses.len(), "Impact bonuses calculated");
    Ok(Json(bonuses.into_iter().map(ImpactBonusResponse::from).collect()))
}
