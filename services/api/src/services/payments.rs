//! services/api/src/services/payments.rs
//!
//! Revenue distribution and bonus allocation over the stored creators and
//! transactions.

use chrono::Utc;
use marketplace_core::payouts::{
    impact_bonuses, plan_distributions, CreatorPaymentSummary, Distribution, ImpactBonus,
    MarketplaceStats,
};
use marketplace_core::ports::{MarketplaceStore, PortResult};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn MarketplaceStore>,
}

impl PaymentService {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self { store }
    }

    /// Credits every creator with the net earnings of all their transactions.
    ///
    /// Transactions are not marked as paid, so a second run credits the same
    /// earnings again.
    #[instrument(skip(self))]
    pub async fn distribute_payments(&self) -> PortResult<Vec<Distribution>> {
        let creators = self.store.list_creators().await?;
        let transactions = self.store.list_transactions().await?;

        let plan = plan_distributions(&creators, &transactions, Utc::now());
        for entry in &plan {
            self.store
                .add_creator_earnings(entry.creator_id, entry.amount)
                .await?;
        }

        let total: Decimal = plan.iter().map(|d| d.amount).sum();
        info!(creators = plan.len(), %total, "Payments distributed");
        Ok(plan)
    }

    /// Splits `revenue_pool` by impact score. Nothing is credited.
    #[instrument(skip(self))]
    pub async fn calculate_impact_based_bonus(&self, revenue_pool: Decimal) -> PortResult<Vec<ImpactBonus>> {
        let creators = self.store.list_creators().await?;
        Ok(impact_bonuses(&creators, revenue_pool))
    }

    #[instrument(skip(self))]
    pub async fn creator_payments(&self, creator_id: Uuid) -> PortResult<CreatorPaymentSummary> {
        let creator = self.store.get_creator(creator_id).await?;
        let transactions = self.store.list_transactions_by_creator(creator_id).await?;
        Ok(CreatorPaymentSummary::new(&creator, transactions))
    }

    pub async fn stats(&self) -> PortResult<MarketplaceStats> {
        let creators = self.store.list_creators().await?;
        let products = self.store.list_products().await?;
        let transactions = self.store.list_transactions().await?;
        Ok(MarketplaceStats::compute(&creators, &products, &transactions))
    }
}
