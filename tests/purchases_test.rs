mod common;

use assert_matches::assert_matches;
use common::{create_actor, create_item, create_stocked_item, price, TestContext};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use stockledger_api::{
    entities::{
        item::{self, Entity as Item},
        ledger_entry::{self, Entity as LedgerEntry},
    },
    errors::ServiceError,
    services::{purchases::PurchaseDraft, suppliers::SupplierDraft},
};

fn restock(item_id: i64, unit_price: Decimal, quantity: i32) -> PurchaseDraft {
    PurchaseDraft {
        item_id: Some(item_id),
        item_name: None,
        description: None,
        unit_price,
        quantity,
        category: None,
        reference: None,
        supplier_id: None,
        actor: None,
    }
}

async fn latest_entry_for(ctx: &TestContext, item_id: i64) -> ledger_entry::Model {
    LedgerEntry::find()
        .filter(ledger_entry::Column::ItemId.eq(item_id))
        .order_by_desc(ledger_entry::Column::Id)
        .one(ctx.db.as_ref())
        .await
        .expect("failed to query ledger entries")
        .expect("entry should exist")
}

#[tokio::test]
async fn restocking_an_existing_item_goes_through_the_ledger() {
    let ctx = TestContext::new().await;
    let item = create_stocked_item(&ctx, "Widget", price(2, 50), 4).await;

    let purchase = ctx
        .services
        .purchases
        .record_purchase(restock(item.id, price(1, 25), 8))
        .await
        .expect("purchase failed");

    assert_eq!(purchase.item_id, item.id);
    assert_eq!(purchase.quantity, 8);
    assert_eq!(purchase.total_amount, price(10, 0));
    assert_eq!(purchase.status, "COMPLETED");

    let current = ctx
        .services
        .catalog
        .get_item(item.id)
        .await
        .expect("item should exist");
    assert_eq!(current.quantity, 12);

    let entry = latest_entry_for(&ctx, item.id).await;
    assert_eq!(entry.quantity, 8);
    assert_eq!(entry.description, "PURCHASE FROM: Restock");
}

#[tokio::test]
async fn a_known_supplier_is_named_in_the_ledger_entry() {
    let ctx = TestContext::new().await;
    let item = create_item(&ctx, "Widget", price(2, 50)).await;
    let supplier = ctx
        .services
        .suppliers
        .submit_supplier(SupplierDraft {
            name: "Acme Corp".to_string(),
            contact_person: None,
            email: None,
            phone: None,
            address: None,
        })
        .await
        .expect("supplier creation failed");

    let purchase = ctx
        .services
        .purchases
        .record_purchase(PurchaseDraft {
            supplier_id: Some(supplier.id),
            ..restock(item.id, price(2, 0), 3)
        })
        .await
        .expect("purchase failed");

    assert_eq!(purchase.supplier_id, Some(supplier.id));
    let entry = latest_entry_for(&ctx, item.id).await;
    assert_eq!(entry.description, "PURCHASE FROM: Acme Corp");
}

#[tokio::test]
async fn an_unresolvable_supplier_falls_back_to_unknown() {
    let ctx = TestContext::new().await;
    let item = create_item(&ctx, "Widget", price(2, 50)).await;

    let purchase = ctx
        .services
        .purchases
        .record_purchase(PurchaseDraft {
            supplier_id: Some(12_345),
            ..restock(item.id, price(2, 0), 3)
        })
        .await
        .expect("purchase should survive a dangling supplier id");

    // The dangling id is not persisted; only the fallback display name is.
    assert_eq!(purchase.supplier_id, None);
    let entry = latest_entry_for(&ctx, item.id).await;
    assert_eq!(entry.description, "PURCHASE FROM: Unknown Supplier");
}

#[tokio::test]
async fn a_new_item_name_creates_the_item_within_the_purchase() {
    let ctx = TestContext::new().await;
    let actor = create_actor(&ctx, "buyer").await;

    let purchase = ctx
        .services
        .purchases
        .record_purchase(PurchaseDraft {
            item_id: None,
            item_name: Some("Fresh Part".to_string()),
            description: Some("Spare part".to_string()),
            unit_price: price(3, 0),
            quantity: 5,
            category: Some("parts".to_string()),
            reference: Some("PO-2024-001".to_string()),
            supplier_id: None,
            actor: Some(actor.id),
        })
        .await
        .expect("purchase failed");

    let created = Item::find()
        .filter(item::Column::Name.eq("Fresh Part"))
        .one(ctx.db.as_ref())
        .await
        .expect("failed to query items")
        .expect("item should have been created");

    assert_eq!(purchase.item_id, created.id);
    assert!(created.active);
    assert_eq!(created.price, price(3, 0));
    assert_eq!(created.quantity, 5);
    assert_eq!(created.category.as_deref(), Some("parts"));

    let entry = latest_entry_for(&ctx, created.id).await;
    assert_eq!(entry.quantity, 5);
    assert_eq!(entry.reference.as_deref(), Some("PO-2024-001"));
    assert_eq!(entry.created_by, Some(actor.id));
}

#[tokio::test]
async fn purchasing_by_the_name_of_a_retired_item_reactivates_it() {
    let ctx = TestContext::new().await;
    let item = create_stocked_item(&ctx, "Dormant", price(4, 0), 2).await;
    ctx.services
        .catalog
        .retire(item.id)
        .await
        .expect("retire failed");

    let purchase = ctx
        .services
        .purchases
        .record_purchase(PurchaseDraft {
            item_id: None,
            item_name: Some("Dormant".to_string()),
            ..restock(0, price(4, 50), 3)
        })
        .await
        .expect("purchase failed");

    assert_eq!(purchase.item_id, item.id);
    let revived = ctx
        .services
        .catalog
        .get_item(item.id)
        .await
        .expect("item should exist");
    assert!(revived.active);
    assert_eq!(revived.quantity, 5);
}

#[tokio::test]
async fn a_declared_category_back_syncs_onto_the_item() {
    let ctx = TestContext::new().await;
    let item = create_item(&ctx, "Widget", price(2, 50)).await;
    assert_eq!(item.category, None);

    ctx.services
        .purchases
        .record_purchase(PurchaseDraft {
            category: Some("tools".to_string()),
            ..restock(item.id, price(2, 0), 1)
        })
        .await
        .expect("purchase failed");

    let current = ctx
        .services
        .catalog
        .get_item(item.id)
        .await
        .expect("item should exist");
    assert_eq!(current.category.as_deref(), Some("tools"));
}

#[tokio::test]
async fn a_non_positive_quantity_is_rejected() {
    let ctx = TestContext::new().await;
    let item = create_item(&ctx, "Widget", price(2, 50)).await;

    let err = ctx
        .services
        .purchases
        .record_purchase(restock(item.id, price(2, 0), 0))
        .await
        .expect_err("zero quantity should fail");

    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn a_purchase_without_item_id_or_name_is_rejected() {
    let ctx = TestContext::new().await;

    let err = ctx
        .services
        .purchases
        .record_purchase(PurchaseDraft {
            item_id: None,
            ..restock(0, price(2, 0), 1)
        })
        .await
        .expect_err("purchase needs an item id or name");

    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn a_purchase_for_an_unknown_item_fails() {
    let ctx = TestContext::new().await;

    let err = ctx
        .services
        .purchases
        .record_purchase(restock(86, price(2, 0), 1))
        .await
        .expect_err("missing item should fail");

    assert_matches!(err, ServiceError::ItemNotFound(86));
}

#[tokio::test]
async fn purchases_list_newest_first() {
    let ctx = TestContext::new().await;
    let item = create_item(&ctx, "Widget", price(2, 50)).await;

    let first = ctx
        .services
        .purchases
        .record_purchase(restock(item.id, price(2, 0), 1))
        .await
        .expect("purchase failed");
    let second = ctx
        .services
        .purchases
        .record_purchase(restock(item.id, price(2, 0), 2))
        .await
        .expect("purchase failed");

    let purchases = ctx
        .services
        .purchases
        .list_purchases()
        .await
        .expect("listing failed");
    assert_eq!(purchases.len(), 2);
    assert_eq!(purchases[0].id, second.id);
    assert_eq!(purchases[1].id, first.id);
}
