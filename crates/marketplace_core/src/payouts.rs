//! crates/marketplace_core/src/payouts.rs
//!
//! Revenue arithmetic: per-creator distributions of transaction earnings,
//! proportional impact bonuses, and marketplace-wide totals.

use crate::domain::{Creator, Product, Transaction};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

/// One creator's share of a distribution run.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub creator_id: Uuid,
    pub creator_name: String,
    pub amount: Decimal,
    pub transaction_count: usize,
    pub impact_score: f64,
    pub distributed_at: DateTime<Utc>,
}

/// One creator's slice of a bonus pool.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactBonus {
    pub creator_id: Uuid,
    pub creator_name: String,
    pub impact_score: f64,
    /// Fraction of the pool, in `[0, 1]`.
    pub share: f64,
    pub bonus: Decimal,
}

/// Sums each creator's net earnings over `transactions`.
///
/// Creators without transactions get no entry. Nothing here remembers which
/// transactions were already paid out, so planning twice yields the same amounts.
pub fn plan_distributions(
    creators: &[Creator],
    transactions: &[Transaction],
    at: DateTime<Utc>,
) -> Vec<Distribution> {
    creators
        .iter()
        .filter_map(|creator| {
            let (amount, transaction_count) = transactions
                .iter()
                .filter(|t| t.creator_id == creator.id)
                .fold((Decimal::ZERO, 0usize), |(sum, n), t| (sum + t.net_amount(), n + 1));

            (transaction_count > 0).then(|| Distribution {
                creator_id: creator.id,
                creator_name: creator.name.clone(),
                amount,
                transaction_count,
                impact_score: creator.impact_score,
                distributed_at: at,
            })
        })
        .collect()
}

/// Splits `revenue_pool` across creators in proportion to their impact scores.
///
/// Returns an empty list when the total impact is zero.
pub fn impact_bonuses(creators: &[Creator], revenue_pool: Decimal) -> Vec<ImpactBonus> {
    let total_impact: f64 = creators.iter().map(|c| c.impact_score).sum();
    let total = match Decimal::from_f64(total_impact) {
        Some(total) if !total.is_zero() => total,
        _ => return Vec::new(),
    };

    creators
        .iter()
        .map(|creator| {
            let score = Decimal::from_f64(creator.impact_score).unwrap_or_default();
            ImpactBonus {
                creator_id: creator.id,
                creator_name: creator.name.clone(),
                impact_score: creator.impact_score,
                share: creator.impact_score / total_impact,
                bonus: proportional_share(revenue_pool, score, total),
            }
        })
        .collect()
}

/// `pool * part / whole`, multiplying first so integral splits stay exact.
/// Falls back to dividing first when the product would overflow.
fn proportional_share(pool: Decimal, part: Decimal, whole: Decimal) -> Decimal {
    pool.checked_mul(part)
        .map(|scaled| scaled / whole)
        .unwrap_or_else(|| pool * (part / whole))
}

/// Everything the payments view shows for a single creator.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatorPaymentSummary {
    pub creator_id: Uuid,
    pub creator_name: String,
    pub total_earnings: Decimal,
    pub impact_score: f64,
    pub gross_sales: Decimal,
    /// What the next distribution run would credit to this creator.
    pub pending_earnings: Decimal,
    pub transaction_count: usize,
    pub transactions: Vec<Transaction>,
}

impl CreatorPaymentSummary {
    pub fn new(creator: &Creator, transactions: Vec<Transaction>) -> Self {
        let transactions: Vec<Transaction> = transactions
            .into_iter()
            .filter(|t| t.creator_id == creator.id)
            .collect();
        Self {
            creator_id: creator.id,
            creator_name: creator.name.clone(),
            total_earnings: creator.total_earnings,
            impact_score: creator.impact_score,
            gross_sales: transactions.iter().map(|t| t.amount).sum(),
            pending_earnings: transactions.iter().map(Transaction::net_amount).sum(),
            transaction_count: transactions.len(),
            transactions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarketplaceStats {
    pub total_creators: usize,
    pub total_products: usize,
    pub total_transactions: usize,
    pub total_revenue: Decimal,
    pub total_platform_fees: Decimal,
    pub total_creator_earnings: Decimal,
}

impl MarketplaceStats {
    pub fn compute(creators: &[Creator], products: &[Product], transactions: &[Transaction]) -> Self {
        Self {
            total_creators: creators.len(),
            total_products: products.len(),
            total_transactions: transactions.len(),
            total_revenue: transactions.iter().map(|t| t.amount).sum(),
            total_platform_fees: transactions.iter().map(|t| t.platform_fee).sum(),
            total_creator_earnings: transactions.iter().map(|t| t.creator_earning).sum(),
        }
    }
}
