//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `MarketplaceStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marketplace_core::domain::{
    Creator, CreatorUpdate, NewCreator, NewProduct, NewReview, NewTransaction, Product,
    ProductUpdate, Review, Transaction, TransactionStatus,
};
use marketplace_core::ports::{MarketplaceStore, PortError, PortResult};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `MarketplaceStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Loads the reviews of every product in `product_ids`, grouped by product.
    async fn reviews_for(&self, product_ids: &[Uuid]) -> PortResult<HashMap<Uuid, Vec<Review>>> {
        let records: Vec<ReviewRecord> = sqlx::query_as(
            "SELECT id, product_id, rating, comment, user_id, created_at FROM reviews \
             WHERE product_id = ANY($1) ORDER BY created_at ASC, id ASC",
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut grouped: HashMap<Uuid, Vec<Review>> = HashMap::new();
        for record in records {
            grouped
                .entry(record.product_id)
                .or_default()
                .push(record.to_domain());
        }
        Ok(grouped)
    }

    async fn with_reviews(&self, records: Vec<ProductRecord>) -> PortResult<Vec<Product>> {
        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let mut reviews = self.reviews_for(&ids).await?;
        Ok(records
            .into_iter()
            .map(|r| {
                let product_reviews = reviews.remove(&r.id).unwrap_or_default();
                r.to_domain(product_reviews)
            })
            .collect())
    }

    async fn single_product(&self, record: ProductRecord) -> PortResult<Product> {
        let mut products = self.with_reviews(vec![record]).await?;
        products
            .pop()
            .ok_or_else(|| PortError::Unexpected("product vanished while loading".to_string()))
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found(entity: &'static str, id: impl std::fmt::Display) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(format!("{} {}", entity, id)),
        _ => PortError::Unexpected(e.to_string()),
    }
}

const CREATOR_COLUMNS: &str =
    "id, name, email, bio, joined_at, impact_score, total_earnings, product_ids";
const PRODUCT_COLUMNS: &str =
    "id, title, description, price, creator_id, created_at, views, sales, rating";
const TRANSACTION_COLUMNS: &str =
    "id, product_id, buyer_id, amount, creator_id, created_at, status, platform_fee, creator_earning";

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CreatorRecord {
    id: Uuid,
    name: String,
    email: String,
    bio: String,
    joined_at: DateTime<Utc>,
    impact_score: f64,
    total_earnings: Decimal,
    product_ids: Vec<Uuid>,
}
impl CreatorRecord {
    fn to_domain(self) -> Creator {
        Creator {
            id: self.id,
            name: self.name,
            email: self.email,
            bio: self.bio,
            joined_at: self.joined_at,
            impact_score: self.impact_score,
            total_earnings: self.total_earnings,
            products: self.product_ids,
        }
    }
}

#[derive(FromRow)]
struct ProductRecord {
    id: Uuid,
    title: String,
    description: String,
    price: Decimal,
    creator_id: Uuid,
    created_at: DateTime<Utc>,
    views: i64,
    sales: i64,
    rating: f64,
}
impl ProductRecord {
    fn to_domain(self, reviews: Vec<Review>) -> Product {
        Product {
            id: self.id,
            title: self.title,
            description: self.description,
            price: self.price,
            creator_id: self.creator_id,
            created_at: self.created_at,
            views: self.views.max(0) as u64,
            sales: self.sales.max(0) as u64,
            rating: self.rating,
            reviews,
        }
    }
}

#[derive(FromRow)]
struct ReviewRecord {
    id: Uuid,
    product_id: Uuid,
    rating: i16,
    comment: String,
    user_id: String,
    created_at: DateTime<Utc>,
}
impl ReviewRecord {
    fn to_domain(self) -> Review {
        Review {
            id: self.id,
            rating: self.rating.clamp(0, u8::MAX as i16) as u8,
            comment: self.comment,
            user_id: self.user_id,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct TransactionRecord {
    id: Uuid,
    product_id: Uuid,
    buyer_id: String,
    amount: Decimal,
    creator_id: Uuid,
    created_at: DateTime<Utc>,
    status: String,
    platform_fee: Decimal,
    creator_earning: Decimal,
}
impl TransactionRecord {
    fn to_domain(self) -> PortResult<Transaction> {
        let status = match self.status.as_str() {
            "completed" => TransactionStatus::Completed,
            other => {
                return Err(PortError::Unexpected(format!(
                    "Transaction {} has unknown status '{}'",
                    self.id, other
                )))
            }
        };
        Ok(Transaction {
            id: self.id,
            product_id: self.product_id,
            buyer_id: self.buyer_id,
            amount: self.amount,
            creator_id: self.creator_id,
            created_at: self.created_at,
            status,
            platform_fee: self.platform_fee,
            creator_earning: self.creator_earning,
        })
    }
}

fn transactions_to_domain(records: Vec<TransactionRecord>) -> PortResult<Vec<Transaction>> {
    records.into_iter().map(TransactionRecord::to_domain).collect()
}

//=========================================================================================
// `MarketplaceStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl MarketplaceStore for DbAdapter {
    async fn create_creator(&self, input: NewCreator) -> PortResult<Creator> {
        let creator = Creator::new(input.name, input.email, input.bio);
        sqlx::query(
            "INSERT INTO creators (id, name, email, bio, joined_at, impact_score, total_earnings, product_ids) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(creator.id)
        .bind(&creator.name)
        .bind(&creator.email)
        .bind(&creator.bio)
        .bind(creator.joined_at)
        .bind(creator.impact_score)
        .bind(creator.total_earnings)
        .bind(&creator.products)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(creator)
    }

    async fn get_creator(&self, creator_id: Uuid) -> PortResult<Creator> {
        let record: CreatorRecord =
            sqlx::query_as(&format!("SELECT {CREATOR_COLUMNS} FROM creators WHERE id = $1"))
                .bind(creator_id)
                .fetch_one(&self.pool)
                .await
                .map_err(not_found("Creator", creator_id))?;
        Ok(record.to_domain())
    }

    async fn list_creators(&self) -> PortResult<Vec<Creator>> {
        let records: Vec<CreatorRecord> = sqlx::query_as(&format!(
            "SELECT {CREATOR_COLUMNS} FROM creators ORDER BY joined_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(CreatorRecord::to_domain).collect())
    }

    async fn update_creator(&self, creator_id: Uuid, update: CreatorUpdate) -> PortResult<Creator> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let record: CreatorRecord = sqlx::query_as(&format!(
            "SELECT {CREATOR_COLUMNS} FROM creators WHERE id = $1 FOR UPDATE"
        ))
        .bind(creator_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(not_found("Creator", creator_id))?;

        let mut creator = record.to_domain();
        creator.apply_update(update);

        sqlx::query("UPDATE creators SET name = $2, email = $3, bio = $4 WHERE id = $1")
            .bind(creator.id)
            .bind(&creator.name)
            .bind(&creator.email)
            .bind(&creator.bio)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;
        Ok(creator)
    }

    async fn delete_creator(&self, creator_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM creators WHERE id = $1")
            .bind(creator_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Creator {}", creator_id)));
        }
        Ok(())
    }

    async fn add_creator_earnings(&self, creator_id: Uuid, amount: Decimal) -> PortResult<Creator> {
        let record: CreatorRecord = sqlx::query_as(&format!(
            "UPDATE creators SET total_earnings = total_earnings + $2 WHERE id = $1 \
             RETURNING {CREATOR_COLUMNS}"
        ))
        .bind(creator_id)
        .bind(amount)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Creator", creator_id))?;
        Ok(record.to_domain())
    }

    async fn set_impact_score(&self, creator_id: Uuid, score: f64) -> PortResult<Creator> {
        let record: CreatorRecord = sqlx::query_as(&format!(
            "UPDATE creators SET impact_score = $2 WHERE id = $1 RETURNING {CREATOR_COLUMNS}"
        ))
        .bind(creator_id)
        .bind(score)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Creator", creator_id))?;
        Ok(record.to_domain())
    }

    async fn create_product(&self, input: NewProduct) -> PortResult<Product> {
        let product = Product::new(input);
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        sqlx::query(
            "INSERT INTO products (id, title, description, price, creator_id, created_at, views, sales, rating) \
             VALUES ($1, $2, $3, $4, $5, $6, 0, 0, 0)",
        )
        .bind(product.id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.creator_id)
        .bind(product.created_at)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        sqlx::query(
            "UPDATE creators SET product_ids = array_append(product_ids, $2) \
             WHERE id = $1 AND NOT ($2 = ANY(product_ids))",
        )
        .bind(product.creator_id)
        .bind(product.id)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;
        Ok(product)
    }

    async fn get_product(&self, product_id: Uuid) -> PortResult<Product> {
        let record: ProductRecord =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
                .bind(product_id)
                .fetch_one(&self.pool)
                .await
                .map_err(not_found("Product", product_id))?;
        self.single_product(record).await
    }

    async fn view_product(&self, product_id: Uuid) -> PortResult<Product> {
        let record: ProductRecord = sqlx::query_as(&format!(
            "UPDATE products SET views = views + 1 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Product", product_id))?;
        self.single_product(record).await
    }

    async fn list_products(&self) -> PortResult<Vec<Product>> {
        let records: Vec<ProductRecord> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        self.with_reviews(records).await
    }

    async fn list_products_by_creator(&self, creator_id: Uuid) -> PortResult<Vec<Product>> {
        let records: Vec<ProductRecord> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE creator_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        self.with_reviews(records).await
    }

    async fn update_product(&self, product_id: Uuid, update: ProductUpdate) -> PortResult<Product> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let record: ProductRecord = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE"
        ))
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(not_found("Product", product_id))?;

        let mut product = record.to_domain(Vec::new());
        product.apply_update(update);

        sqlx::query("UPDATE products SET title = $2, description = $3, price = $4 WHERE id = $1")
            .bind(product.id)
            .bind(&product.title)
            .bind(&product.description)
            .bind(product.price)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;

        product.reviews = self
            .reviews_for(&[product.id])
            .await?
            .remove(&product.id)
            .unwrap_or_default();
        Ok(product)
    }

    async fn delete_product(&self, product_id: Uuid) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let (creator_id,): (Uuid,) =
            sqlx::query_as("DELETE FROM products WHERE id = $1 RETURNING creator_id")
                .bind(product_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(not_found("Product", product_id))?;

        sqlx::query("UPDATE creators SET product_ids = array_remove(product_ids, $2) WHERE id = $1")
            .bind(creator_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn add_review(&self, product_id: Uuid, review: NewReview) -> PortResult<Product> {
        let review = Review::new(review);
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM products WHERE id = $1 FOR UPDATE")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(unexpected)?;
        if exists.is_none() {
            return Err(PortError::NotFound(format!("Product {}", product_id)));
        }

        sqlx::query(
            "INSERT INTO reviews (id, product_id, rating, comment, user_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(review.id)
        .bind(product_id)
        .bind(i16::from(review.rating))
        .bind(&review.comment)
        .bind(&review.user_id)
        .bind(review.created_at)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        let record: ProductRecord = sqlx::query_as(&format!(
            "UPDATE products SET rating = \
               (SELECT COALESCE(AVG(rating), 0)::DOUBLE PRECISION FROM reviews WHERE product_id = $1) \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;

        self.single_product(record).await
    }

    async fn record_purchase(&self, input: NewTransaction) -> PortResult<Transaction> {
        let transaction = Transaction::new(input);
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let bumped = sqlx::query("UPDATE products SET sales = sales + 1 WHERE id = $1")
            .bind(transaction.product_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        if bumped.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Product {}", transaction.product_id)));
        }

        sqlx::query(
            "INSERT INTO transactions (id, product_id, buyer_id, amount, creator_id, created_at, status, platform_fee, creator_earning) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(transaction.id)
        .bind(transaction.product_id)
        .bind(&transaction.buyer_id)
        .bind(transaction.amount)
        .bind(transaction.creator_id)
        .bind(transaction.created_at)
        .bind(transaction.status.as_str())
        .bind(transaction.platform_fee)
        .bind(transaction.creator_earning)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(transaction)
    }

    async fn get_transaction(&self, transaction_id: Uuid) -> PortResult<Transaction> {
        let record: TransactionRecord = sqlx::query_as(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(transaction_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Transaction", transaction_id))?;
        record.to_domain()
    }

    async fn list_transactions(&self) -> PortResult<Vec<Transaction>> {
        let records: Vec<TransactionRecord> = sqlx::query_as(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        transactions_to_domain(records)
    }

    async fn list_transactions_by_buyer(&self, buyer_id: &str) -> PortResult<Vec<Transaction>> {
        let records: Vec<TransactionRecord> = sqlx::query_as(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE buyer_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        transactions_to_domain(records)
    }

    async fn list_transactions_by_creator(&self, creator_id: Uuid) -> PortResult<Vec<Transaction>> {
        let records: Vec<TransactionRecord> = sqlx::query_as(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE creator_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        transactions_to_domain(records)
    }
}
