//! services/api/src/web/products.rs
//!
//! Handlers for `/api/products`.

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::web::dto::{
    non_negative_amount, required_text, CreateProductRequest, CreateReviewRequest,
    ProductListQuery, ProductResponse, UpdateProductRequest,
};
use crate::web::extract::{ApiJson, ApiPath, ApiQuery};
use crate::web::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use marketplace_core::domain::{NewProduct, NewReview};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// List a new product. The creator id is recorded as given; it is linked into
/// the creator's product list when that creator exists.
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing title, price or creatorId", body = ErrorBody)
    )
)]
#[instrument(name = "handler::create_product", skip(state, req))]
pub async fn create_product_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateProductRequest>,
) -> ApiResult<impl IntoResponse> {
    let title = required_text(req.title, "title")?;
    let price = req
        .price
        .ok_or_else(|| ApiError::Validation("price is required".to_string()))
        .and_then(|p| non_negative_amount(p, "price"))?;
    let creator_id = req
        .creator_id
        .ok_or_else(|| ApiError::Validation("creatorId is required".to_string()))?;

    let product = state
        .store
        .create_product(NewProduct {
            title,
            description: req.description.unwrap_or_default(),
            price,
            creator_id,
        })
        .await?;
    info!(product_id = %product.id, %creator_id, "Product created");
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductListQuery),
    responses((status = 200, description = "Products", body = [ProductResponse]))
)]
pub async fn list_products_handler(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let products = match query.creator_id {
        Some(creator_id) => state.store.list_products_by_creator(creator_id).await?,
        None => state.store.list_products().await?,
    };
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// Fetch a product. Every successful fetch counts as one view.
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorBody)
    )
)]
pub async fn get_product_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(product_id): ApiPath<Uuid>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state.store.view_product(product_id).await?;
    Ok(Json(product.into()))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ProductResponse),
        (status = 400, description = "Blank title or negative price", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    )
)]
#[instrument(name = "handler::update_product", skip(state, req))]
pub async fn update_product_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(product_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateProductRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state
        .store
        .update_product(product_id, req.into_update()?)
        .await?;
    Ok(Json(product.into()))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorBody)
    )
)]
#[instrument(name = "handler::delete_product", skip(state))]
pub async fn delete_product_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(product_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.delete_product(product_id).await?;
    info!("Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Add a 1-5 star review and recompute the product's rating.
#[utoipa::path(
    post,
    path = "/api/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review added; returns the updated product", body = ProductResponse),
        (status = 400, description = "Missing or out-of-range rating", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    )
)]
#[instrument(name = "handler::add_review", skip(state, req))]
pub async fn add_review_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(product_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateReviewRequest>,
) -> ApiResult<impl IntoResponse> {
    let rating = req.validated_rating()?;
    let review = NewReview {
        rating,
        comment: req.comment.unwrap_or_default(),
        user_id: req.user_id.unwrap_or_else(|| "anonymous".to_string()),
    };
    let product = state.store.add_review(product_id, review).await?;
    info!(rating, new_average = product.rating, "Review added");
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}
