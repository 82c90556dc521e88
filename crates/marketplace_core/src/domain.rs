//! crates/marketplace_core/src/domain.rs
//!
//! Defines the pure, core data structures of the marketplace.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// The platform's fixed cut of every transaction amount.
pub const PLATFORM_FEE_RATE: Decimal = dec!(0.05);

/// Lowest and highest star rating a review may carry.
pub const MIN_REVIEW_RATING: u8 = 1;
pub const MAX_REVIEW_RATING: u8 = 5;

//=========================================================================================
// Creator
//=========================================================================================

/// A creator selling products on the marketplace.
#[derive(Debug, Clone, PartialEq)]
pub struct Creator {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub joined_at: DateTime<Utc>,
    pub impact_score: f64,
    pub total_earnings: Decimal,
    /// Ids of the products this creator has listed, without duplicates.
    pub products: Vec<Uuid>,
}

impl Creator {
    pub fn new(name: impl Into<String>, email: impl Into<String>, bio: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            bio: bio.into(),
            joined_at: Utc::now(),
            impact_score: 0.0,
            total_earnings: Decimal::ZERO,
            products: Vec::new(),
        }
    }

    pub fn update_impact_score(&mut self, score: f64) {
        self.impact_score = score;
    }

    /// Credits `amount` on top of whatever was earned before.
    pub fn add_earnings(&mut self, amount: Decimal) {
        self.total_earnings += amount;
    }

    /// Links a product to this creator. Adding an id twice is a no-op.
    pub fn add_product(&mut self, product_id: Uuid) {
        if !self.products.contains(&product_id) {
            self.products.push(product_id);
        }
    }

    /// Unlinks a deleted product.
    pub fn remove_product(&mut self, product_id: Uuid) {
        self.products.retain(|id| *id != product_id);
    }

    pub fn apply_update(&mut self, update: CreatorUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(bio) = update.bio {
            self.bio = bio;
        }
    }
}

/// The validated input for creating a creator.
#[derive(Debug, Clone)]
pub struct NewCreator {
    pub name: String,
    pub email: String,
    pub bio: String,
}

/// A partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CreatorUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

//=========================================================================================
// Product and Review
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: Uuid,
    pub rating: u8,
    pub comment: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(input: NewReview) -> Self {
        Self {
            id: Uuid::new_v4(),
            rating: input.rating,
            comment: input.comment,
            user_id: input.user_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub rating: u8,
    pub comment: String,
    pub user_id: String,
}

/// A product listed by a creator.
///
/// `creator_id` is a plain reference: nothing guarantees the creator still exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub views: u64,
    pub sales: u64,
    /// Arithmetic mean of all review ratings, 0 when unreviewed.
    pub rating: f64,
    pub reviews: Vec<Review>,
}

impl Product {
    pub fn new(input: NewProduct) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            price: input.price,
            creator_id: input.creator_id,
            created_at: Utc::now(),
            views: 0,
            sales: 0,
            rating: 0.0,
            reviews: Vec::new(),
        }
    }

    pub fn increment_views(&mut self) {
        self.views += 1;
    }

    pub fn increment_sales(&mut self) {
        self.sales += 1;
    }

    pub fn add_review(&mut self, review: Review) {
        self.reviews.push(review);
        self.update_rating();
    }

    /// Recomputes `rating` from the full review list.
    pub fn update_rating(&mut self) {
        self.rating = average_rating(&self.reviews);
    }

    pub fn apply_update(&mut self, update: ProductUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
    }
}

/// Mean of the review ratings, 0 for an empty slice.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    f64::from(sum) / reviews.len() as f64
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub creator_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

//=========================================================================================
// Transaction
//=========================================================================================

/// Transactions are recorded once payment has cleared, so only one state exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Completed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
        }
    }
}

/// An immutable record of a purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub product_id: Uuid,
    pub buyer_id: String,
    pub amount: Decimal,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: TransactionStatus,
    pub platform_fee: Decimal,
    pub creator_earning: Decimal,
}

/// Splits `amount` into `(platform_fee, creator_earning)`.
///
/// Decimal arithmetic keeps the split exact: the two parts always add back
/// up to `amount`.
pub fn split_amount(amount: Decimal) -> (Decimal, Decimal) {
    let platform_fee = amount * PLATFORM_FEE_RATE;
    (platform_fee, amount - platform_fee)
}

impl Transaction {
    pub fn new(input: NewTransaction) -> Self {
        let (platform_fee, creator_earning) = split_amount(input.amount);
        Self {
            id: Uuid::new_v4(),
            product_id: input.product_id,
            buyer_id: input.buyer_id,
            amount: input.amount,
            creator_id: input.creator_id,
            created_at: Utc::now(),
            status: TransactionStatus::Completed,
            platform_fee,
            creator_earning,
        }
    }

    /// What the creator is owed for this transaction.
    pub fn net_amount(&self) -> Decimal {
        self.creator_earning
    }
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub product_id: Uuid,
    pub buyer_id: String,
    pub amount: Decimal,
    pub creator_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: u8) -> Review {
        Review::new(NewReview {
            rating,
            comment: String::new(),
            user_id: "user-1".to_string(),
        })
    }

    fn sample_product() -> Product {
        Product::new(NewProduct {
            title: "Preset pack".to_string(),
            description: "Twelve presets".to_string(),
            price: dec!(20),
            creator_id: Uuid::new_v4(),
        })
    }

    #[test]
    fn earnings_accumulate() {
        let mut creator = Creator::new("Ada", "ada@example.com", "");
        creator.add_earnings(dec!(50));
        creator.add_earnings(dec!(30.25));
        assert_eq!(creator.total_earnings, dec!(80.25));
    }

    #[test]
    fn adding_the_same_product_twice_keeps_one_entry() {
        let mut creator = Creator::new("Ada", "ada@example.com", "");
        let product_id = Uuid::new_v4();
        creator.add_product(product_id);
        creator.add_product(product_id);
        assert_eq!(creator.products, vec![product_id]);

        creator.remove_product(product_id);
        assert!(creator.products.is_empty());
    }

    #[test]
    fn rating_is_the_mean_of_reviews() {
        let mut product = sample_product();
        assert_eq!(product.rating, 0.0);
        for rating in [5, 4, 3] {
            product.add_review(review(rating));
        }
        assert_eq!(product.rating, 4.0);
        assert_eq!(product.reviews.len(), 3);
    }

    #[test]
    fn partial_updates_leave_other_fields_alone() {
        let mut product = sample_product();
        product.apply_update(ProductUpdate {
            price: Some(dec!(25)),
            ..Default::default()
        });
        assert_eq!(product.price, dec!(25));
        assert_eq!(product.title, "Preset pack");

        let mut creator = Creator::new("Ada", "ada@example.com", "bio");
        creator.apply_update(CreatorUpdate {
            name: Some("Ada L.".to_string()),
            ..Default::default()
        });
        assert_eq!(creator.name, "Ada L.");
        assert_eq!(creator.email, "ada@example.com");
        assert_eq!(creator.bio, "bio");
    }

    #[test]
    fn fee_and_earning_add_back_to_every_cent_amount() {
        // Every amount from 0.01 to 19999.99 in cent steps.
        for cents in 1..2_000_000i64 {
            let amount = Decimal::new(cents, 2);
            let (fee, earning) = split_amount(amount);
            assert_eq!(fee + earning, amount, "split of {amount}");
            assert!(fee < amount, "fee of {amount}");
        }
    }

    #[test]
    fn transaction_splits_fee_and_earning() {
        for (amount, fee, earning) in [
            (dec!(1.51), dec!(0.0755), dec!(1.4345)),
            (dec!(19.99), dec!(0.9995), dec!(18.9905)),
            (dec!(0.01), dec!(0.0005), dec!(0.0095)),
        ] {
            let tx = Transaction::new(NewTransaction {
                product_id: Uuid::new_v4(),
                buyer_id: "buyer-1".to_string(),
                amount,
                creator_id: Uuid::new_v4(),
            });
            assert_eq!(tx.platform_fee, fee);
            assert_eq!(tx.creator_earning, earning);
            assert_eq!(tx.platform_fee + tx.creator_earning, tx.amount);
            assert_eq!(tx.status, TransactionStatus::Completed);
        }
    }

    #[test]
    fn net_amount_of_hundred_is_ninety_five() {
        let tx = Transaction::new(NewTransaction {
            product_id: Uuid::new_v4(),
            buyer_id: "buyer-1".to_string(),
            amount: dec!(100),
            creator_id: Uuid::new_v4(),
        });
        assert_eq!(tx.net_amount(), dec!(95));
        assert_eq!(tx.platform_fee, dec!(5));
    }
}
