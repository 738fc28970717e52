mod common;

use assert_matches::assert_matches;
use common::{create_stocked_item, price, TestContext};
use stockledger_api::{
    entities::ledger_entry::StockChangeKind,
    errors::ServiceError,
};

#[tokio::test]
async fn oversell_attempts_stop_exactly_at_zero() {
    let ctx = TestContext::new().await;
    let item = create_stocked_item(&ctx, "Widget", price(2, 50), 3).await;

    let mut applied = 0;
    let mut rejected = 0;
    for _ in 0..5 {
        match ctx
            .services
            .ledger
            .apply_adjustment(
                item.id,
                -1,
                &StockChangeKind::Sale.to_string(),
                None,
                None,
            )
            .await
        {
            Ok(_) => applied += 1,
            Err(err) => {
                assert_matches!(err, ServiceError::InsufficientStock { .. });
                rejected += 1;
            }
        }
    }

    assert_eq!(applied, 3);
    assert_eq!(rejected, 2);

    let current = ctx
        .services
        .catalog
        .get_item(item.id)
        .await
        .expect("item should exist");
    assert_eq!(current.quantity, 0);
}

#[tokio::test]
async fn each_applied_adjustment_bumps_the_version_once() {
    let ctx = TestContext::new().await;
    let item = create_stocked_item(&ctx, "Widget", price(2, 50), 1).await;
    let start = ctx
        .services
        .catalog
        .get_item(item.id)
        .await
        .expect("item should exist")
        .version;

    for _ in 0..3 {
        ctx.services
            .ledger
            .apply_adjustment(
                item.id,
                2,
                &StockChangeKind::Restock.to_string(),
                None,
                None,
            )
            .await
            .expect("adjustment failed");
    }

    let current = ctx
        .services
        .catalog
        .get_item(item.id)
        .await
        .expect("item should exist");
    assert_eq!(current.version, start + 3);
}

// Exercises real interleaving only against a multi-writer store such as
// Postgres; the in-memory test pool serializes writers on one connection.
#[tokio::test]
#[ignore]
async fn concurrent_sales_never_take_stock_below_zero() {
    let ctx = TestContext::new().await;
    let item = create_stocked_item(&ctx, "Widget", price(2, 50), 5).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let ledger = ctx.services.ledger.clone();
        let item_id = item.id;
        handles.push(tokio::spawn(async move {
            ledger
                .apply_adjustment(item_id, -1, &StockChangeKind::Sale.to_string(), None, None)
                .await
        }));
    }

    let mut applied = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => applied += 1,
            Err(ServiceError::InsufficientStock { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(applied, 5);
    assert_eq!(rejected, 3);

    let current = ctx
        .services
        .catalog
        .get_item(item.id)
        .await
        .expect("item should exist");
    assert_eq!(current.quantity, 0);
}
