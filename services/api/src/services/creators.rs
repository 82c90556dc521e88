//! services/api/src/services/creators.rs

use marketplace_core::impact::{calculate_impact, ImpactBreakdown};
use marketplace_core::ports::{MarketplaceStore, PortResult};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Creator-level operations that span more than one store call.
#[derive(Clone)]
pub struct CreatorService {
    store: Arc<dyn MarketplaceStore>,
}

impl CreatorService {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self { store }
    }

    /// Recomputes a creator's impact score from the whole catalogue and
    /// transaction history, stores it on the creator and returns the inputs
    /// alongside the result.
    #[instrument(skip(self))]
    pub async fn calculate_impact_score(&self, creator_id: Uuid) -> PortResult<ImpactBreakdown> {
        // Fails with NotFound before any work is done for unknown creators.
        self.store.get_creator(creator_id).await?;

        let products = self.store.list_products().await?;
        let transactions = self.store.list_transactions().await?;
        let breakdown = calculate_impact(creator_id, &products, &transactions);

        self.store
            .set_impact_score(creator_id, breakdown.impact_score)
            .await?;
        info!(impact_score = breakdown.impact_score, "Impact score updated");
        Ok(breakdown)
    }
}
