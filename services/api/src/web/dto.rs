//! services/api/src/web/dto.rs
//!
//! Request and response payloads of the REST API. Domain types stay free of
//! serialization concerns; these structs carry the camelCase wire shape.

use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use marketplace_core::domain::{
    Creator, CreatorUpdate, Product, ProductUpdate, Review, Transaction, MAX_REVIEW_RATING,
    MIN_REVIEW_RATING,
};
use marketplace_core::impact::ImpactBreakdown;
use marketplace_core::payouts::{CreatorPaymentSummary, Distribution, ImpactBonus, MarketplaceStats};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Validation Helpers
//=========================================================================================

/// Returns the trimmed value, or a validation error naming `field` when it is
/// missing or blank.
pub fn required_text(value: Option<String>, field: &str) -> ApiResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("{} is required", field))),
    }
}

fn optional_text(value: Option<String>, field: &str) -> ApiResult<Option<String>> {
    value.map(|v| required_text(Some(v), field)).transpose()
}

pub fn non_negative_amount(value: Decimal, field: &str) -> ApiResult<Decimal> {
    if value >= Decimal::ZERO {
        Ok(value)
    } else {
        Err(ApiError::Validation(format!("{} must not be negative", field)))
    }
}

pub fn positive_amount(value: Decimal, field: &str) -> ApiResult<Decimal> {
    if value > Decimal::ZERO {
        Ok(value)
    } else {
        Err(ApiError::Validation(format!("{} must be greater than zero", field)))
    }
}

//=========================================================================================
// Creators
//=========================================================================================

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateCreatorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCreatorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

impl UpdateCreatorRequest {
    pub fn into_update(self) -> ApiResult<CreatorUpdate> {
        Ok(CreatorUpdate {
            name: optional_text(self.name, "name")?,
            email: optional_text(self.email, "email")?,
            bio: self.bio,
        })
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub joined_at: DateTime<Utc>,
    pub impact_score: f64,
    pub total_earnings: Decimal,
    pub products: Vec<Uuid>,
}

impl From<Creator> for CreatorResponse {
    fn from(c: Creator) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            bio: c.bio,
            joined_at: c.joined_at,
            impact_score: c.impact_score,
            total_earnings: c.total_earnings,
            products: c.products,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImpactResponse {
    pub creator_id: Uuid,
    pub impact_score: f64,
    pub total_sales_amount: Decimal,
    pub total_views: u64,
    pub average_rating: f64,
}

impl ImpactResponse {
    pub fn new(creator_id: Uuid, b: ImpactBreakdown) -> Self {
        Self {
            creator_id,
            impact_score: b.impact_score,
            total_sales_amount: b.total_sales_amount,
            total_views: b.total_views,
            average_rating: b.average_rating,
        }
    }
}

//=========================================================================================
// Products
//=========================================================================================

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub creator_id: Option<Uuid>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

impl UpdateProductRequest {
    pub fn into_update(self) -> ApiResult<ProductUpdate> {
        Ok(ProductUpdate {
            title: optional_text(self.title, "title")?,
            description: self.description,
            price: self
                .price
                .map(|p| non_negative_amount(p, "price"))
                .transpose()?,
        })
    }
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Only list products owned by this creator.
    pub creator_id: Option<Uuid>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub rating: Option<i64>,
    pub comment: Option<String>,
    pub user_id: Option<String>,
}

impl CreateReviewRequest {
    pub fn validated_rating(&self) -> ApiResult<u8> {
        let rating = self
            .rating
            .ok_or_else(|| ApiError::Validation("rating is required".to_string()))?;
        u8::try_from(rating)
            .ok()
            .filter(|r| (MIN_REVIEW_RATING..=MAX_REVIEW_RATING).contains(r))
            .ok_or_else(|| {
                ApiError::Validation(format!(
                    "rating must be between {} and {}",
                    MIN_REVIEW_RATING, MAX_REVIEW_RATING
                ))
            })
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: Uuid,
    pub rating: u8,
    pub comment: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            rating: r.rating,
            comment: r.comment,
            user_id: r.user_id,
            created_at: r.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub views: u64,
    pub sales: u64,
    pub rating: f64,
    pub reviews: Vec<ReviewResponse>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            price: p.price,
            creator_id: p.creator_id,
            created_at: p.created_at,
            views: p.views,
            sales: p.sales,
            rating: p.rating,
            reviews: p.reviews.into_iter().map(ReviewResponse::from).collect(),
        }
    }
}

//=========================================================================================
// Transactions
//=========================================================================================

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub product_id: Option<Uuid>,
    pub buyer_id: Option<String>,
    /// Defaults to the product's current price.
    pub amount: Option<Decimal>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub buyer_id: String,
    pub amount: Decimal,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub platform_fee: Decimal,
    pub creator_earning: Decimal,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            product_id: t.product_id,
            buyer_id: t.buyer_id,
            amount: t.amount,
            creator_id: t.creator_id,
            created_at: t.created_at,
            status: t.status.as_str().to_string(),
            platform_fee: t.platform_fee,
            creator_earning: t.creator_earning,
        }
    }
}

//=========================================================================================
// Payments
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributionResponse {
    pub creator_id: Uuid,
    pub creator_name: String,
    pub amount: Decimal,
    pub transaction_count: usize,
    pub impact_score: f64,
    pub distributed_at: DateTime<Utc>,
}

impl From<Distribution> for DistributionResponse {
    fn from(d: Distribution) -> Self {
        Self {
            creator_id: d.creator_id,
            creator_name: d.creator_name,
            amount: d.amount,
            transaction_count: d.transaction_count,
            impact_score: d.impact_score,
            distributed_at: d.distributed_at,
        }
    }
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImpactBonusRequest {
    pub revenue_pool: Option<Decimal>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImpactBonusResponse {
    pub creator_id: Uuid,
    pub creator_name: String,
    pub impact_score: f64,
    pub share: f64,
    pub bonus: Decimal,
}

impl From<ImpactBonus> for ImpactBonusResponse {
    fn from(b: ImpactBonus) -> Self {
        Self {
            creator_id: b.creator_id,
            creator_name: b.creator_name,
            impact_score: b.impact_score,
            share: b.share,
            bonus: b.bonus,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorPaymentsResponse {
    pub creator_id: Uuid,
    pub creator_name: String,
    pub total_earnings: Decimal,
    pub impact_score: f64,
    pub gross_sales: Decimal,
    pub pending_earnings: Decimal,
    pub transaction_count: usize,
    pub transactions: Vec<TransactionResponse>,
}

impl From<CreatorPaymentSummary> for CreatorPaymentsResponse {
    fn from(s: CreatorPaymentSummary) -> Self {
        Self {
            creator_id: s.creator_id,
            creator_name: s.creator_name,
            total_earnings: s.total_earnings,
            impact_score: s.impact_score,
            gross_sales: s.gross_sales,
            pending_earnings: s.pending_earnings,
            transaction_count: s.transaction_count,
            transactions: s
                .transactions
                .into_iter()
                .map(TransactionResponse::from)
                .collect(),
        }
    }
}

//=========================================================================================
// System
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub storage: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_creators: usize,
    pub total_products: usize,
    pub total_transactions: usize,
    pub total_revenue: Decimal,
    pub total_platform_fees: Decimal,
    pub total_creator_earnings: Decimal,
}

impl From<MarketplaceStats> for StatsResponse {
    fn from(s: MarketplaceStats) -> Self {
        Self {
            total_creators: s.total_creators,
            total_products: s.total_products,
            total_transactions: s.total_transactions,
            total_revenue: s.total_revenue,
            total_platform_fees: s.total_platform_fees,
            total_creator_earnings: s.total_creator_earnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text(Some("  Ada ".into()), "name").unwrap(), "Ada");
        assert!(required_text(Some("   ".into()), "name").is_err());
        assert!(required_text(None, "name").is_err());
    }

    #[test]
    fn review_rating_must_be_in_range() {
        let review = |rating| CreateReviewRequest {
            rating,
            ..Default::default()
        };
        assert_eq!(review(Some(5)).validated_rating().unwrap(), 5);
        assert!(review(Some(0)).validated_rating().is_err());
        assert!(review(Some(6)).validated_rating().is_err());
        assert!(review(Some(-3)).validated_rating().is_err());
        assert!(review(None).validated_rating().is_err());
    }

    #[test]
    fn amounts_are_range_checked() {
        assert!(positive_amount(Decimal::ZERO, "amount").is_err());
        assert!(positive_amount(dec!(-0.01), "amount").is_err());
        assert_eq!(positive_amount(dec!(0.01), "amount").unwrap(), dec!(0.01));
        assert_eq!(non_negative_amount(Decimal::ZERO, "price").unwrap(), Decimal::ZERO);
        assert!(non_negative_amount(dec!(-1), "price").is_err());
    }

    #[test]
    fn money_travels_as_json_numbers() {
        let req: CreateTransactionRequest =
            serde_json::from_str(r#"{"productId": null, "buyerId": "b", "amount": 1.51}"#).unwrap();
        assert_eq!(req.amount, Some(dec!(1.51)));

        let body = serde_json::to_value(ImpactBonusResponse {
            creator_id: Uuid::nil(),
            creator_name: "a".to_string(),
            impact_score: 1.0,
            share: 1.0,
            bonus: dec!(150),
        })
        .unwrap();
        assert_eq!(body["bonus"], 150.0);
    }

    #[test]
    fn blank_update_fields_are_rejected() {
        let update = UpdateCreatorRequest {
            name: Some(" ".into()),
            ..Default::default()
        };
        assert!(update.into_update().is_err());

        let update = UpdateCreatorRequest {
            bio: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(update.into_update().unwrap().bio.as_deref(), Some(""));
    }
}
