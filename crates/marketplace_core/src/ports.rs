//! crates/marketplace_core/src/ports.rs
//!
//! Defines the storage contract for the marketplace core.
//! The trait forms the boundary of the hexagonal architecture, so the core
//! stays independent of whether records live in memory or in a database.

use crate::domain::{
    Creator, CreatorUpdate, NewCreator, NewProduct, NewReview, NewTransaction, Product,
    ProductUpdate, Transaction,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the backing store.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Port
//=========================================================================================

#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    // --- Creators ---
    async fn create_creator(&self, input: NewCreator) -> PortResult<Creator>;

    async fn get_creator(&self, creator_id: Uuid) -> PortResult<Creator>;

    async fn list_creators(&self) -> PortResult<Vec<Creator>>;

    async fn update_creator(&self, creator_id: Uuid, update: CreatorUpdate) -> PortResult<Creator>;

    /// Removes the creator only. Their products and transactions stay.
    async fn delete_creator(&self, creator_id: Uuid) -> PortResult<()>;

    async fn add_creator_earnings(&self, creator_id: Uuid, amount: Decimal) -> PortResult<Creator>;

    async fn set_impact_score(&self, creator_id: Uuid, score: f64) -> PortResult<Creator>;

    // --- Products ---
    /// Stores the product and, when the owning creator exists, links it into
    /// the creator's product list in the same step.
    async fn create_product(&self, input: NewProduct) -> PortResult<Product>;

    async fn get_product(&self, product_id: Uuid) -> PortResult<Product>;

    /// Reads a product and counts the read as a view.
    async fn view_product(&self, product_id: Uuid) -> PortResult<Product>;

    async fn list_products(&self) -> PortResult<Vec<Product>>;

    async fn list_products_by_creator(&self, creator_id: Uuid) -> PortResult<Vec<Product>>;

    async fn update_product(&self, product_id: Uuid, update: ProductUpdate) -> PortResult<Product>;

    /// Removes the product and unlinks it from its creator's product list.
    /// Transactions that reference it stay.
    async fn delete_product(&self, product_id: Uuid) -> PortResult<()>;

    async fn add_review(&self, product_id: Uuid, review: NewReview) -> PortResult<Product>;

    // --- Transactions ---
    /// Records the purchase and bumps the product's sales count atomically.
    async fn record_purchase(&self, input: NewTransaction) -> PortResult<Transaction>;

    async fn get_transaction(&self, transaction_id: Uuid) -> PortResult<Transaction>;

    async fn list_transactions(&self) -> PortResult<Vec<Transaction>>;

    async fn list_transactions_by_buyer(&self, buyer_id: &str) -> PortResult<Vec<Transaction>>;

    async fn list_transactions_by_creator(&self, creator_id: Uuid) -> PortResult<Vec<Transaction>>;
}
