//! services/api/src/web/creators.rs
//!
//! Handlers for `/api/creators`.

use crate::error::{ApiResult, ErrorBody};
use crate::web::dto::{
    required_text, CreateCreatorRequest, CreatorResponse, ImpactResponse, ProductResponse,
    UpdateCreatorRequest,
};
use crate::web::extract::{ApiJson, ApiPath};
use crate::web::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use marketplace_core::domain::NewCreator;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Register a new creator.
#[utoipa::path(
    post,
    path = "/api/creators",
    request_body = CreateCreatorRequest,
    responses(
        (status = 201, description = "Creator created", body = CreatorResponse),
        (status = 400, description = "Missing name or email", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[instrument(name = "handler::create_creator", skip(state, req))]
pub async fn create_creator_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateCreatorRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = NewCreator {
        name: required_text(req.name, "name")?,
        email: required_text(req.email, "email")?,
        bio: req.bio.unwrap_or_default(),
    };
    let creator = state.store.create_creator(input).await?;
    info!(creator_id = %creator.id, "Creator created");
    Ok((StatusCode::CREATED, Json(CreatorResponse::from(creator))))
}

/// List every creator.
#[utoipa::path(
    get,
    path = "/api/creators",
    responses((status = 200, description = "All creators", body = [CreatorResponse]))
)]
pub async fn list_creators_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<CreatorResponse>>> {
    let creators = state.store.list_creators().await?;
    Ok(Json(creators.into_iter().map(CreatorResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/creators/{id}",
    params(("id" = Uuid, Path, description = "Creator id")),
    responses(
        (status = 200, description = "The creator", body = CreatorResponse),
        (status = 404, description = "Creator not found", body = ErrorBody)
    )
)]
pub async fn get_creator_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(creator_id): ApiPath<Uuid>,
) -> ApiResult<Json<CreatorResponse>> {
    let creator = state.store.get_creator(creator_id).await?;
    Ok(Json(creator.into()))
}

#[utoipa::path(
    put,
    path = "/api/creators/{id}",
    params(("id" = Uuid, Path, description = "Creator id")),
    request_body = UpdateCreatorRequest,
    responses(
        (status = 200, description = "Updated creator", body = CreatorResponse),
        (status = 400, description = "Blank name or email", body = ErrorBody),
        (status = 404, description = "Creator not found", body = ErrorBody)
    )
)]
#[instrument(name = "handler::update_creator", skip(state, req))]
pub async fn update_creator_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(creator_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateCreatorRequest>,
) -> ApiResult<Json<CreatorResponse>> {
    let creator = state
        .store
        .update_creator(creator_id, req.into_update()?)
        .await?;
    Ok(Json(creator.into()))
}

/// Delete a creator. Their products and transactions are kept.
#[utoipa::path(
    delete,
    path = "/api/creators/{id}",
    params(("id" = Uuid, Path, description = "Creator id")),
    responses(
        (status = 204, description = "Creator deleted"),
        (status = 404, description = "Creator not found", body = ErrorBody)
    )
)]
#[instrument(name = "handler::delete_creator", skip(state))]
pub async fn delete_creator_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(creator_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.delete_creator(creator_id).await?;
    info!("Creator deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/creators/{id}/products",
    params(("id" = Uuid, Path, description = "Creator id")),
    responses(
        (status = 200, description = "Products owned by the creator", body = [ProductResponse]),
        (status = 404, description = "Creator not found", body = ErrorBody)
    )
)]
pub async fn creator_products_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(creator_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    state.store.get_creator(creator_id).await?;
    let products = state.store.list_products_by_creator(creator_id).await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// Recalculate and return the creator's impact score.
#[utoipa::path(
    get,
    path = "/api/creators/{id}/impact",
    params(("id" = Uuid, Path, description = "Creator id")),
    responses(
        (status = 200, description = "Fresh impact score and its inputs", body = ImpactResponse),
        (status = 404, description = "Creator not found", body = ErrorBody)
    )
)]
pub async fn creator_impact_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(creator_id): ApiPath<Uuid>,
) -> ApiResult<Json<ImpactResponse>> {
    let breakdown = state.creators.calculate_impact_score(creator_id).await?;
    Ok(Json(ImpactResponse::new(creator_id, breakdown)))
}
