//! crates/marketplace_core/src/impact.rs
//!
//! The creator impact score: an unnormalized weighted sum of sales volume,
//! audience reach and review quality. Scores are only meaningful relative to
//! each other, e.g. when splitting a bonus pool.

use crate::domain::{Product, Transaction};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

pub const SALES_WEIGHT: f64 = 0.5;
pub const VIEWS_WEIGHT: f64 = 0.3;
pub const RATING_WEIGHT: f64 = 0.2;
/// Lifts a 0-5 average rating into the same order of magnitude as sales and views.
pub const RATING_SCALE: f64 = 100.0;

/// The inputs and result of one impact score calculation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImpactBreakdown {
    /// Sum of the gross `amount` of the creator's transactions.
    pub total_sales_amount: Decimal,
    pub total_views: u64,
    /// Mean product rating across the creator's products, 0 without products.
    pub average_rating: f64,
    pub impact_score: f64,
}

/// Computes the impact score of `creator_id` from the full product and
/// transaction lists. Records belonging to other creators are ignored.
pub fn calculate_impact(
    creator_id: Uuid,
    products: &[Product],
    transactions: &[Transaction],
) -> ImpactBreakdown {
    let total_sales_amount: Decimal = transactions
        .iter()
        .filter(|t| t.creator_id == creator_id)
        .map(|t| t.amount)
        .sum();

    let owned: Vec<&Product> = products
        .iter()
        .filter(|p| p.creator_id == creator_id)
        .collect();

    let total_views: u64 = owned.iter().map(|p| p.views).sum();
    let average_rating = if owned.is_empty() {
        0.0
    } else {
        owned.iter().map(|p| p.rating).sum::<f64>() / owned.len() as f64
    };

    // The score is a ranking signal, not money.
    let impact_score = SALES_WEIGHT * total_sales_amount.to_f64().unwrap_or_default()
        + VIEWS_WEIGHT * total_views as f64
        + RATING_WEIGHT * (RATING_SCALE * average_rating);

    ImpactBreakdown {
        total_sales_amount,
        total_views,
        average_rating,
        impact_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewProduct, NewTransaction};
    use rust_decimal_macros::dec;

    fn product(creator_id: Uuid, views: u64, rating: f64) -> Product {
        let mut p = Product::new(NewProduct {
            title: "Course".to_string(),
            description: String::new(),
            price: dec!(10),
            creator_id,
        });
        p.views = views;
        p.rating = rating;
        p
    }

    fn sale(creator_id: Uuid, amount: Decimal) -> Transaction {
        Transaction::new(NewTransaction {
            product_id: Uuid::new_v4(),
            buyer_id: "buyer".to_string(),
            amount,
            creator_id,
        })
    }

    #[test]
    fn weights_sales_views_and_rating() {
        let creator = Uuid::new_v4();
        let products = vec![product(creator, 4, 5.0), product(creator, 6, 3.0)];
        let transactions = vec![sale(creator, dec!(60)), sale(creator, dec!(40))];

        let breakdown = calculate_impact(creator, &products, &transactions);

        assert_eq!(breakdown.total_sales_amount, dec!(100));
        assert_eq!(breakdown.total_views, 10);
        assert_eq!(breakdown.average_rating, 4.0);
        // 0.5 * 100 + 0.3 * 10 + 0.2 * 400
        assert_eq!(breakdown.impact_score, 133.0);
    }

    #[test]
    fn ignores_other_creators_records() {
        let creator = Uuid::new_v4();
        let other = Uuid::new_v4();
        let products = vec![product(other, 1000, 5.0)];
        let transactions = vec![sale(other, dec!(500)), sale(creator, dec!(10))];

        let breakdown = calculate_impact(creator, &products, &transactions);

        assert_eq!(breakdown.total_views, 0);
        assert_eq!(breakdown.average_rating, 0.0);
        assert_eq!(breakdown.impact_score, 5.0);
    }

    #[test]
    fn empty_history_scores_zero() {
        let breakdown = calculate_impact(Uuid::new_v4(), &[], &[]);
        assert_eq!(breakdown, ImpactBreakdown::default());
    }

    #[test]
    fn sales_use_gross_amount_not_net() {
        let creator = Uuid::new_v4();
        let breakdown = calculate_impact(creator, &[], &[sale(creator, dec!(100))]);
        assert_eq!(breakdown.total_sales_amount, dec!(100));
        assert_eq!(breakdown.impact_score, 50.0);
    }
}
