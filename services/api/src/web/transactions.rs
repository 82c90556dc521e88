//! services/api/src/web/transactions.rs
//!
//! Handlers for `/api/transactions`.

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::web::dto::{positive_amount, required_text, CreateTransactionRequest, TransactionResponse};
use crate::web::extract::{ApiJson, ApiPath};
use crate::web::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use marketplace_core::domain::NewTransaction;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Record a purchase of a product.
///
/// The creator is taken from the product and the amount defaults to the
/// product's price. The product's sales counter moves in the same step.
#[utoipa::path(
    post,
    path = "/api/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = TransactionResponse),
        (status = 400, description = "Missing productId/buyerId or non-positive amount", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    )
)]
#[instrument(name = "handler::create_transaction", skip(state, req))]
pub async fn create_transaction_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateTransactionRequest>,
) -> ApiResult<impl IntoResponse> {
    let product_id = req
        .product_id
        .ok_or_else(|| ApiError::Validation("productId is required".to_string()))?;
    let buyer_id = required_text(req.buyer_id, "buyerId")?;

    let product = state.store.get_product(product_id).await?;
    let amount = positive_amount(req.amount.unwrap_or(product.price), "amount")?;

    let transaction = state
        .store
        .record_purchase(NewTransaction {
            product_id,
            buyer_id,
            amount,
            creator_id: product.creator_id,
        })
        .await?;
    info!(
        transaction_id = %transaction.id,
        amount = %transaction.amount,
        platform_fee = %transaction.platform_fee,
        "Transaction recorded"
    );
    Ok((StatusCode::CREATED, Json(TransactionResponse::from(transaction))))
}

#[utoipa::path(
    get,
    path = "/api/transactions",
    responses((status = 200, description = "All transactions", body = [TransactionResponse]))
)]
pub async fn list_transactions_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<TransactionResponse>>> {
    let transactions = state.store.list_transactions().await?;
    Ok(Json(transactions.into_iter().map(TransactionResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    params(("id" = Uuid, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "The transaction", body = TransactionResponse),
        (status = 404, description = "Transaction not found", body = ErrorBody)
    )
)]
pub async fn get_transaction_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(transaction_id): ApiPath<Uuid>,
) -> ApiResult<Json<TransactionResponse>> {
    let transaction = state.store.get_transaction(transaction_id).await?;
    Ok(Json(transaction.into()))
}

#[utoipa::path(
    get,
    path = "/api/transactions/buyer/{buyer_id}",
    params(("buyer_id" = String, Path, description = "Buyer id")),
    responses((status = 200, description = "Purchases by the buyer", body = [TransactionResponse]))
)]
pub async fn buyer_transactions_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(buyer_id): ApiPath<String>,
) -> ApiResult<Json<Vec<TransactionResponse>>> {
    let transactions = state.store.list_transactions_by_buyer(&buyer_id).await?;
    Ok(Json(transactions.into_iter().map(TransactionResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/transactions/creator/{creator_id}",
    params(("creator_id" = Uuid, Path, description = "Creator id")),
    responses((status = 200, description = "Sales of the creator's products", body = [TransactionResponse]))
)]
pub async fn creator_transactions_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(creator_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<TransactionResponse>>> {
    let transactions = state.store.list_transactions_by_creator(creator_id).await?;
    Ok(Json(transactions.into_iter().map(TransactionResponse::from).collect()))
}
