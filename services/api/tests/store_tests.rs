// tests/store_tests.rs
mod common;

use api_lib::services::{CreatorService, PaymentService};
use common::*;
use marketplace_core::domain::{
    CreatorUpdate, NewCreator, NewProduct, NewReview, NewTransaction, ProductUpdate,
};
use marketplace_core::ports::{MarketplaceStore, PortError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn new_creator(name: &str) -> NewCreator {
    NewCreator {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        bio: String::new(),
    }
}

fn new_product(creator_id: Uuid, price: Decimal) -> NewProduct {
    NewProduct {
        title: "Lightroom presets".to_string(),
        description: "A pack of presets".to_string(),
        price,
        creator_id,
    }
}

fn purchase(product_id: Uuid, creator_id: Uuid, amount: Decimal) -> NewTransaction {
    NewTransaction {
        product_id,
        buyer_id: "buyer-1".to_string(),
        amount,
        creator_id,
    }
}

fn review(rating: u8) -> NewReview {
    NewReview {
        rating,
        comment: "nice".to_string(),
        user_id: "user-1".to_string(),
    }
}

#[tokio::test]
async fn creating_a_product_links_it_to_its_creator() {
    let store = memory_store();
    let creator = store.create_creator(new_creator("Ada")).await.unwrap();
    let product = store.create_product(new_product(creator.id, dec!(10))).await.unwrap();

    let creator = store.get_creator(creator.id).await.unwrap();
    assert_eq!(creator.products, vec![product.id]);

    let owned = store.list_products_by_creator(creator.id).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, product.id);
}

#[tokio::test]
async fn product_for_unknown_creator_is_still_stored() {
    let store = memory_store();
    let orphan_creator = Uuid::new_v4();
    let product = store.create_product(new_product(orphan_creator, dec!(5))).await.unwrap();
    assert_eq!(store.get_product(product.id).await.unwrap().creator_id, orphan_creator);
}

#[tokio::test]
async fn viewing_counts_but_plain_get_does_not() {
    let store = memory_store();
    let product = store.create_product(new_product(Uuid::new_v4(), dec!(5))).await.unwrap();

    store.view_product(product.id).await.unwrap();
    let viewed = store.view_product(product.id).await.unwrap();
    assert_eq!(viewed.views, 2);
    assert_eq!(store.get_product(product.id).await.unwrap().views, 2);
}

#[tokio::test]
async fn reviews_update_the_average_rating() {
    let store = memory_store();
    let product = store.create_product(new_product(Uuid::new_v4(), dec!(5))).await.unwrap();
    for rating in [5, 4, 3] {
        store.add_review(product.id, review(rating)).await.unwrap();
    }
    let product = store.get_product(product.id).await.unwrap();
    assert_eq!(product.rating, 4.0);
    assert_eq!(product.reviews.len(), 3);
}

#[tokio::test]
async fn purchase_records_transaction_and_sale_together() {
    let store = memory_store();
    let creator = store.create_creator(new_creator("Ada")).await.unwrap();
    let product = store.create_product(new_product(creator.id, dec!(100))).await.unwrap();

    let tx = store
        .record_purchase(purchase(product.id, creator.id, dec!(100)))
        .await
        .unwrap();
    assert_eq!(tx.platform_fee, dec!(5));
    assert_eq!(tx.creator_earning, dec!(95));
    assert_eq!(store.get_product(product.id).await.unwrap().sales, 1);
    assert_eq!(store.get_transaction(tx.id).await.unwrap(), tx);
    assert_eq!(store.list_transactions_by_buyer("buyer-1").await.unwrap().len(), 1);
    assert!(store.list_transactions_by_buyer("someone-else").await.unwrap().is_empty());
}

#[tokio::test]
async fn purchase_of_missing_product_leaves_no_transaction() {
    let store = memory_store();
    let result = store
        .record_purchase(purchase(Uuid::new_v4(), Uuid::new_v4(), dec!(10)))
        .await;
    assert!(matches!(result, Err(PortError::NotFound(_))));
    assert!(store.list_transactions().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_creator_keeps_products_and_transactions() {
    let store = memory_store();
    let creator = store.create_creator(new_creator("Ada")).await.unwrap();
    let product = store.create_product(new_product(creator.id, dec!(20))).await.unwrap();
    store
        .record_purchase(purchase(product.id, creator.id, dec!(20)))
        .await
        .unwrap();

    store.delete_creator(creator.id).await.unwrap();

    assert!(matches!(
        store.get_creator(creator.id).await,
        Err(PortError::NotFound(_))
    ));
    assert!(store.get_product(product.id).await.is_ok());
    assert_eq!(store.list_transactions_by_creator(creator.id).await.unwrap().len(), 1);
    assert!(matches!(
        store.delete_creator(creator.id).await,
        Err(PortError::NotFound(_))
    ));
}

#[tokio::test]
async fn deleting_a_product_unlinks_it_from_its_creator() {
    let store = memory_store();
    let creator = store.create_creator(new_creator("Ada")).await.unwrap();
    let kept = store.create_product(new_product(creator.id, dec!(5))).await.unwrap();
    let dropped = store.create_product(new_product(creator.id, dec!(7))).await.unwrap();
    store
        .record_purchase(purchase(dropped.id, creator.id, dec!(7)))
        .await
        .unwrap();

    store.delete_product(dropped.id).await.unwrap();

    assert_eq!(store.get_creator(creator.id).await.unwrap().products, vec![kept.id]);
    assert_eq!(store.list_transactions_by_creator(creator.id).await.unwrap().len(), 1);
    assert!(matches!(
        store.delete_product(dropped.id).await,
        Err(PortError::NotFound(_))
    ));
}

#[tokio::test]
async fn deleting_an_orphan_product_succeeds() {
    let store = memory_store();
    let product = store.create_product(new_product(Uuid::new_v4(), dec!(5))).await.unwrap();
    store.delete_product(product.id).await.unwrap();
    assert!(store.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn stored_purchases_split_exactly() {
    let store = memory_store();
    let creator = store.create_creator(new_creator("Ada")).await.unwrap();
    let product = store.create_product(new_product(creator.id, dec!(1))).await.unwrap();
    for amount in [dec!(1.51), dec!(1.55), dec!(1.59), dec!(3.02), dec!(3.10)] {
        let tx = store
            .record_purchase(purchase(product.id, creator.id, amount))
            .await
            .unwrap();
        assert_eq!(tx.platform_fee + tx.creator_earning, amount);
    }
    let stats = PaymentService::new(store.clone()).stats().await.unwrap();
    assert_eq!(stats.total_platform_fees + stats.total_creator_earnings, stats.total_revenue);
    assert_eq!(stats.total_revenue, dec!(10.77));
}

#[tokio::test]
async fn updates_apply_only_given_fields() {
    let store = memory_store();
    let creator = store.create_creator(new_creator("Ada")).await.unwrap();
    let updated = store
        .update_creator(
            creator.id,
            CreatorUpdate {
                bio: Some("Photographer".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.bio, "Photographer");
    assert_eq!(updated.name, "Ada");

    let product = store.create_product(new_product(creator.id, dec!(20))).await.unwrap();
    let updated = store
        .update_product(
            product.id,
            ProductUpdate {
                price: Some(dec!(30)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.price, dec!(30));
    assert_eq!(updated.title, product.title);
}

#[tokio::test]
async fn impact_score_is_computed_and_stored() {
    setup_tracing();
    let store = memory_store();
    let creator = store.create_creator(new_creator("Ada")).await.unwrap();
    let product = store.create_product(new_product(creator.id, dec!(100))).await.unwrap();
    for _ in 0..10 {
        store.view_product(product.id).await.unwrap();
    }
    store.add_review(product.id, review(4)).await.unwrap();
    store
        .record_purchase(purchase(product.id, creator.id, dec!(100)))
        .await
        .unwrap();

    let service = CreatorService::new(store.clone());
    let breakdown = service.calculate_impact_score(creator.id).await.unwrap();

    // 0.5 * 100 + 0.3 * 10 + 0.2 * (100 * 4)
    assert_eq!(breakdown.impact_score, 133.0);
    assert_eq!(store.get_creator(creator.id).await.unwrap().impact_score, 133.0);
}

#[tokio::test]
async fn impact_score_for_unknown_creator_is_not_found() {
    let service = CreatorService::new(memory_store());
    assert!(matches!(
        service.calculate_impact_score(Uuid::new_v4()).await,
        Err(PortError::NotFound(_))
    ));
}

#[tokio::test]
async fn distribution_credits_net_earnings_every_run() {
    setup_tracing();
    let store = memory_store();
    let creator = store.create_creator(new_creator("Ada")).await.unwrap();
    let idle = store.create_creator(new_creator("Idle")).await.unwrap();
    let product = store.create_product(new_product(creator.id, dec!(100))).await.unwrap();
    store
        .record_purchase(purchase(product.id, creator.id, dec!(100)))
        .await
        .unwrap();

    let payments = PaymentService::new(store.clone());
    let first = payments.distribute_payments().await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].creator_id, creator.id);
    assert_eq!(first[0].amount, dec!(95));
    assert_eq!(first[0].transaction_count, 1);

    // Transactions are never marked as paid, so a second run pays again.
    payments.distribute_payments().await.unwrap();
    assert_eq!(store.get_creator(creator.id).await.unwrap().total_earnings, dec!(190));
    assert_eq!(store.get_creator(idle.id).await.unwrap().total_earnings, Decimal::ZERO);
}

#[tokio::test]
async fn bonus_pool_is_split_by_impact() {
    let store = memory_store();
    let a = store.create_creator(new_creator("A")).await.unwrap();
    let b = store.create_creator(new_creator("B")).await.unwrap();
    let payments = PaymentService::new(store.clone());

    assert!(payments.calculate_impact_based_bonus(dec!(150)).await.unwrap().is_empty());

    store.set_impact_score(a.id, 100.0).await.unwrap();
    store.set_impact_score(b.id, 50.0).await.unwrap();
    let bonuses = payments.calculate_impact_based_bonus(dec!(150)).await.unwrap();

    let bonus_of = |id: Uuid| bonuses.iter().find(|x| x.creator_id == id).unwrap().bonus;
    assert_eq!(bonus_of(a.id), dec!(100));
    assert_eq!(bonus_of(b.id), dec!(50));
    // Bonuses are reported, not credited.
    assert_eq!(store.get_creator(a.id).await.unwrap().total_earnings, Decimal::ZERO);
}

#[tokio::test]
async fn payment_summary_and_stats() {
    let store = memory_store();
    let creator = store.create_creator(new_creator("Ada")).await.unwrap();
    let product = store.create_product(new_product(creator.id, dec!(100))).await.unwrap();
    store
        .record_purchase(purchase(product.id, creator.id, dec!(100)))
        .await
        .unwrap();
    store
        .record_purchase(purchase(product.id, creator.id, dec!(20)))
        .await
        .unwrap();

    let payments = PaymentService::new(store.clone());
    let summary = payments.creator_payments(creator.id).await.unwrap();
    assert_eq!(summary.transaction_count, 2);
    assert_eq!(summary.gross_sales, dec!(120));
    assert_eq!(summary.pending_earnings, dec!(114));
    assert_eq!(summary.total_earnings, Decimal::ZERO);

    let stats = payments.stats().await.unwrap();
    assert_eq!(stats.total_creators, 1);
    assert_eq!(stats.total_products, 1);
    assert_eq!(stats.total_transactions, 2);
    assert_eq!(stats.total_revenue, dec!(120));
    assert_eq!(stats.total_platform_fees, dec!(6));
}
