//! services/api/src/web/rest.rs
//!
//! Assembles the REST API router and holds the master definition for the
//! OpenAPI specification.

use crate::config::Config;
use crate::error::{ApiError, ErrorBody};
use crate::web::{creators, dto, payments, products, state::AppState, system, transactions};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        system::health_handler,
        system::stats_handler,
        creators::create_creator_handler,
        creators::list_creators_handler,
        creators::get_creator_handler,
        creators::update_creator_handler,
        creators::delete_creator_handler,
        creators::creator_products_handler,
        creators::creator_impact_handler,
        products::create_product_handler,
        products::list_products_handler,
        products::get_product_handler,
        products::update_product_handler,
        products::delete_product_handler,
        products::add_review_handler,
        transactions::create_transaction_handler,
        transactions::list_transactions_handler,
        transactions::get_transaction_handler,
        transactions::buyer_transactions_handler,
        transactions::creator_transactions_handler,
        payments::distribute_payments_handler,
        payments::creator_payments_handler,
        payments::impact_bonus_handler,
    ),
    components(
        schemas(
            ErrorBody,
            dto::CreateCreatorRequest,
            dto::UpdateCreatorRequest,
            dto::CreatorResponse,
            dto::ImpactResponse,
            dto::CreateProductRequest,
            dto::UpdateProductRequest,
            dto::CreateReviewRequest,
            dto::ReviewResponse,
            dto::ProductResponse,
            dto::CreateTransactionRequest,
            dto::TransactionResponse,
            dto::DistributionResponse,
            dto::ImpactBonusRequest,
            dto::ImpactBonusResponse,
            dto::CreatorPaymentsResponse,
            dto::HealthResponse,
            dto::StatsResponse,
        )
    ),
    tags(
        (name = "Creator Marketplace API", description = "Creators, products, transactions and revenue distribution.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router
//=========================================================================================

/// Every `/api` route, wired to the shared state and wrapped in a request trace span.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(system::health_handler))
        .route("/api/stats", get(system::stats_handler))
        // --- Creators ---
        .route(
            "/api/creators",
            post(creators::create_creator_handler).get(creators::list_creators_handler),
        )
        .route(
            "/api/creators/{id}",
            get(creators::get_creator_handler)
                .put(creators::update_creator_handler)
                .delete(creators::delete_creator_handler),
        )
        .route(
            "/api/creators/{id}/products",
            get(creators::creator_products_handler),
        )
        .route("/api/creators/{id}/impact", get(creators::creator_impact_handler))
        // --- Products ---
        .route(
            "/api/products",
            post(products::create_product_handler).get(products::list_products_handler),
        )
        .route(
            "/api/products/{id}",
            get(products::get_product_handler)
                .put(products::update_product_handler)
                .delete(products::delete_product_handler),
        )
        .route("/api/products/{id}/reviews", post(products::add_review_handler))
        // --- Transactions ---
        .route(
            "/api/transactions",
            post(transactions::create_transaction_handler)
                .get(transactions::list_transactions_handler),
        )
        .route(
            "/api/transactions/{id}",
            get(transactions::get_transaction_handler),
        )
        .route(
            "/api/transactions/buyer/{buyer_id}",
            get(transactions::buyer_transactions_handler),
        )
        .route(
            "/api/transactions/creator/{creator_id}",
            get(transactions::creator_transactions_handler),
        )
        // --- Payments ---
        .route(
            "/api/payments/distribute",
            post(payments::distribute_payments_handler),
        )
        .route(
            "/api/payments/creator/{id}",
            get(payments::creator_payments_handler),
        )
        .route("/api/payments/impact-bonus", post(payments::impact_bonus_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for the dashboard front end.
pub fn cors_layer(config: &Config) -> Result<CorsLayer, ApiError> {
    let origin = config
        .cors_allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| {
            ApiError::Internal(format!(
                "Invalid CORS origin '{}': {}",
                config.cors_allowed_origin, e
            ))
        })?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]))
}
