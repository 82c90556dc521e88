//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::services::{CreatorService, PaymentService};
use marketplace_core::ports::MarketplaceStore;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MarketplaceStore>,
    pub config: Arc<Config>,
    pub creators: CreatorService,
    pub payments: PaymentService,
}

impl AppState {
    pub fn new(store: Arc<dyn MarketplaceStore>, config: Arc<Config>) -> Self {
        Self {
            creators: CreatorService::new(store.clone()),
            payments: PaymentService::new(store.clone()),
            store,
            config,
        }
    }
}
