mod common;

use assert_matches::assert_matches;
use common::{create_item, create_stocked_item, price, TestContext};
use stockledger_api::{errors::ServiceError, services::catalog::ItemDraft};

#[tokio::test]
async fn submitting_a_new_name_creates_an_active_item() {
    let ctx = TestContext::new().await;

    let item = create_item(&ctx, "Widget", price(2, 50)).await;

    assert_eq!(item.name, "Widget");
    assert_eq!(item.price, price(2, 50));
    assert!(item.active);
    assert_eq!(item.quantity, 0);
    assert_eq!(item.version, 0);
}

#[tokio::test]
async fn resubmitting_a_name_updates_the_existing_row() {
    let ctx = TestContext::new().await;

    let original = create_item(&ctx, "Widget", price(2, 50)).await;

    let merged = ctx
        .services
        .catalog
        .submit_item(ItemDraft {
            name: "Widget".to_string(),
            description: Some("now with packaging".to_string()),
            price: price(3, 0),
            promo_price: None,
            category: Some("Hardware".to_string()),
            image_url: None,
        })
        .await
        .expect("resubmission should merge");

    assert_eq!(merged.id, original.id);
    assert_eq!(merged.price, price(3, 0));
    assert_eq!(merged.description.as_deref(), Some("now with packaging"));

    // Exactly one row, and it is active.
    let all = ctx.services.catalog.list_all().await.expect("list failed");
    assert_eq!(all.len(), 1);
    assert!(all[0].active);
}

#[tokio::test]
async fn resubmitting_a_retired_name_reactivates_it_in_place() {
    let ctx = TestContext::new().await;

    let original = create_stocked_item(&ctx, "Desk Lamp", price(12, 0), 5).await;

    ctx.services
        .catalog
        .retire(original.id)
        .await
        .expect("retire failed");

    let retired = ctx
        .services
        .catalog
        .get_item(original.id)
        .await
        .expect("retired item should still resolve by id");
    assert!(!retired.active);

    let revived = ctx
        .services
        .catalog
        .submit_item(ItemDraft {
            name: "Desk Lamp".to_string(),
            description: None,
            price: price(14, 0),
            promo_price: None,
            category: None,
            image_url: None,
        })
        .await
        .expect("resubmission should reactivate");

    assert_eq!(revived.id, original.id);
    assert!(revived.active);
    assert_eq!(revived.price, price(14, 0));
    // Stock survives the retire/reactivate round trip untouched.
    assert_eq!(revived.quantity, 5);
}

#[tokio::test]
async fn retiring_keeps_the_item_out_of_the_active_list_only() {
    let ctx = TestContext::new().await;

    let keep = create_item(&ctx, "Keeper", price(1, 0)).await;
    let gone = create_item(&ctx, "Goner", price(1, 0)).await;

    ctx.services
        .catalog
        .retire(gone.id)
        .await
        .expect("retire failed");

    let active = ctx
        .services
        .catalog
        .list_active()
        .await
        .expect("list failed");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, keep.id);

    let all = ctx.services.catalog.list_all().await.expect("list failed");
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn retiring_an_unknown_item_fails() {
    let ctx = TestContext::new().await;

    let err = ctx
        .services
        .catalog
        .retire(9_999)
        .await
        .expect_err("retire of a missing item should fail");

    assert_matches!(err, ServiceError::ItemNotFound(9_999));
}

#[tokio::test]
async fn updating_replaces_descriptive_fields_but_never_stock() {
    let ctx = TestContext::new().await;

    let item = create_stocked_item(&ctx, "Monitor Stand", price(25, 0), 8).await;

    let updated = ctx
        .services
        .catalog
        .update_item(
            item.id,
            stockledger_api::services::catalog::ItemUpdate {
                description: Some("aluminium".to_string()),
                price: price(22, 0),
                promo_price: Some(price(19, 99)),
                category: Some("Accessories".to_string()),
                image_url: None,
            },
        )
        .await
        .expect("update failed");

    assert_eq!(updated.price, price(22, 0));
    assert_eq!(updated.promo_price, Some(price(19, 99)));
    assert_eq!(updated.quantity, 8);
    assert_eq!(updated.name, "Monitor Stand");
}

#[tokio::test]
async fn updating_an_unknown_item_fails() {
    let ctx = TestContext::new().await;

    let err = ctx
        .services
        .catalog
        .update_item(
            404,
            stockledger_api::services::catalog::ItemUpdate {
                description: None,
                price: price(1, 0),
                promo_price: None,
                category: None,
                image_url: None,
            },
        )
        .await
        .expect_err("update of a missing item should fail");

    assert_matches!(err, ServiceError::ItemNotFound(404));
}

#[tokio::test]
async fn active_listing_is_alphabetical() {
    let ctx = TestContext::new().await;

    create_item(&ctx, "Zip Ties", price(0, 99)).await;
    create_item(&ctx, "Adapter", price(5, 0)).await;
    create_item(&ctx, "Mouse Pad", price(3, 0)).await;

    let names: Vec<String> = ctx
        .services
        .catalog
        .list_active()
        .await
        .expect("list failed")
        .into_iter()
        .map(|item| item.name)
        .collect();

    assert_eq!(names, vec!["Adapter", "Mouse Pad", "Zip Ties"]);
}
