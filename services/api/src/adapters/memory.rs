//! services/api/src/adapters/memory.rs
//!
//! A process-local implementation of the `MarketplaceStore` port. All state
//! lives behind one `RwLock`, so every write (including the two-part purchase)
//! is applied atomically. Nothing survives a restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marketplace_core::domain::{
    Creator, CreatorUpdate, NewCreator, NewProduct, NewReview, NewTransaction, Product,
    ProductUpdate, Review, Transaction,
};
use marketplace_core::ports::{MarketplaceStore, PortError, PortResult};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    creators: HashMap<Uuid, Creator>,
    products: HashMap<Uuid, Product>,
    transactions: HashMap<Uuid, Transaction>,
}

impl Tables {
    fn creator_mut(&mut self, creator_id: Uuid) -> PortResult<&mut Creator> {
        self.creators
            .get_mut(&creator_id)
            .ok_or_else(|| PortError::NotFound(format!("Creator {}", creator_id)))
    }

    fn product_mut(&mut self, product_id: Uuid) -> PortResult<&mut Product> {
        self.products
            .get_mut(&product_id)
            .ok_or_else(|| PortError::NotFound(format!("Product {}", product_id)))
    }
}

/// An in-memory adapter that implements the `MarketplaceStore` port.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Clones the rows of `table` that pass `keep`, oldest first. Rows created
/// in the same instant are ordered by id.
fn collect_sorted<T: Clone>(
    table: &HashMap<Uuid, T>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
    keep: impl Fn(&T) -> bool,
) -> Vec<T> {
    let mut rows: Vec<(&Uuid, &T)> = table.iter().filter(|(_, row)| keep(row)).collect();
    rows.sort_by_key(|(id, row)| (created_at(row), **id));
    rows.into_iter().map(|(_, row)| row.clone()).collect()
}

#[async_trait]
impl MarketplaceStore for InMemoryStore {
    async fn create_creator(&self, input: NewCreator) -> PortResult<Creator> {
        let creator = Creator::new(input.name, input.email, input.bio);
        self.tables
            .write()
            .await
            .creators
            .insert(creator.id, creator.clone());
        Ok(creator)
    }

    async fn get_creator(&self, creator_id: Uuid) -> PortResult<Creator> {
        self.tables
            .read()
            .await
            .creators
            .get(&creator_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Creator {}", creator_id)))
    }

    async fn list_creators(&self) -> PortResult<Vec<Creator>> {
        let tables = self.tables.read().await;
        Ok(collect_sorted(
            &tables.creators,
            |c| c.joined_at,
            |_| true,
        ))
    }

    async fn update_creator(&self, creator_id: Uuid, update: CreatorUpdate) -> PortResult<Creator> {
        let mut tables = self.tables.write().await;
        let creator = tables.creator_mut(creator_id)?;
        creator.apply_update(update);
        Ok(creator.clone())
    }

    async fn delete_creator(&self, creator_id: Uuid) -> PortResult<()> {
        self.tables
            .write()
            .await
            .creators
            .remove(&creator_id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("Creator {}", creator_id)))
    }

    async fn add_creator_earnings(&self, creator_id: Uuid, amount: Decimal) -> PortResult<Creator> {
        let mut tables = self.tables.write().await;
        let creator = tables.creator_mut(creator_id)?;
        creator.add_earnings(amount);
        Ok(creator.clone())
    }

    async fn set_impact_score(&self, creator_id: Uuid, score: f64) -> PortResult<Creator> {
        let mut tables = self.tables.write().await;
        let creator = tables.creator_mut(creator_id)?;
        creator.update_impact_score(score);
        Ok(creator.clone())
    }

    async fn create_product(&self, input: NewProduct) -> PortResult<Product> {
        let product = Product::new(input);
        let mut tables = self.tables.write().await;
        if let Some(creator) = tables.creators.get_mut(&product.creator_id) {
            creator.add_product(product.id);
        }
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, product_id: Uuid) -> PortResult<Product> {
        self.tables
            .read()
            .await
            .products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Product {}", product_id)))
    }

    async fn view_product(&self, product_id: Uuid) -> PortResult<Product> {
        let mut tables = self.tables.write().await;
        let product = tables.product_mut(product_id)?;
        product.increment_views();
        Ok(product.clone())
    }

    async fn list_products(&self) -> PortResult<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(collect_sorted(
            &tables.products,
            |p| p.created_at,
            |_| true,
        ))
    }

    async fn list_products_by_creator(&self, creator_id: Uuid) -> PortResult<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(collect_sorted(
            &tables.products,
            |p| p.created_at,
            |p| p.creator_id == creator_id,
        ))
    }

    async fn update_product(&self, product_id: Uuid, update: ProductUpdate) -> PortResult<Product> {
        let mut tables = self.tables.write().await;
        let product = tables.product_mut(product_id)?;
        product.apply_update(update);
        Ok(product.clone())
    }

    async fn delete_product(&self, product_id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let product = tables
            .products
            .remove(&product_id)
            .ok_or_else(|| PortError::NotFound(format!("Product {}", product_id)))?;
        if let Some(creator) = tables.creators.get_mut(&product.creator_id) {
            creator.remove_product(product_id);
        }
        Ok(())
    }

    async fn add_review(&self, product_id: Uuid, review: NewReview) -> PortResult<Product> {
        let mut tables = self.tables.write().await;
        let product = tables.product_mut(product_id)?;
        product.add_review(Review::new(review));
        Ok(product.clone())
    }

    async fn record_purchase(&self, input: NewTransaction) -> PortResult<Transaction> {
        let mut tables = self.tables.write().await;
        let product_id = input.product_id;
        tables.product_mut(product_id)?.increment_sales();
        let transaction = Transaction::new(input);
        tables
            .transactions
            .insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn get_transaction(&self, transaction_id: Uuid) -> PortResult<Transaction> {
        self.tables
            .read()
            .await
            .transactions
            .get(&transaction_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Transaction {}", transaction_id)))
    }

    async fn list_transactions(&self) -> PortResult<Vec<Transaction>> {
        let tables = self.tables.read().await;
        Ok(collect_sorted(
            &tables.transactions,
            |t| t.created_at,
            |_| true,
        ))
    }

    async fn list_transactions_by_buyer(&self, buyer_id: &str) -> PortResult<Vec<Transaction>> {
        let tables = self.tables.read().await;
        Ok(collect_sorted(
            &tables.transactions,
            |t| t.created_at,
            |t| t.buyer_id == buyer_id,
        ))
    }

    async fn list_transactions_by_creator(&self, creator_id: Uuid) -> PortResult<Vec<Transaction>> {
        let tables = self.tables.read().await;
        Ok(collect_sorted(
            &tables.transactions,
            |t| t.created_at,
            |t| t.creator_id == creator_id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_sort_by_time_then_id_and_filter_before_cloning() {
        let at = Utc::now();
        let earlier = at - chrono::Duration::seconds(1);
        let ids = [Uuid::from_u128(3), Uuid::from_u128(1), Uuid::from_u128(2)];
        let mut table: HashMap<Uuid, (Uuid, DateTime<Utc>, bool)> = HashMap::new();
        table.insert(ids[0], (ids[0], at, true));
        table.insert(ids[1], (ids[1], at, true));
        table.insert(ids[2], (ids[2], earlier, true));
        let hidden = Uuid::from_u128(0);
        table.insert(hidden, (hidden, earlier, false));

        let rows = collect_sorted(&table, |row| row.1, |row| row.2);
        let order: Vec<Uuid> = rows.iter().map(|row| row.0).collect();
        assert_eq!(order, vec![ids[2], ids[1], ids[0]]);
    }
}
