mod common;

use assert_matches::assert_matches;
use common::{create_actor, TestContext};
use stockledger_api::{
    errors::ServiceError,
    services::{suppliers::SupplierDraft, users::UserDraft},
};

fn supplier(name: &str) -> SupplierDraft {
    SupplierDraft {
        name: name.to_string(),
        contact_person: None,
        email: None,
        phone: None,
        address: None,
    }
}

#[tokio::test]
async fn submitting_a_new_supplier_creates_an_active_record() {
    let ctx = TestContext::new().await;

    let created = ctx
        .services
        .suppliers
        .submit_supplier(SupplierDraft {
            contact_person: Some("Pat Lee".to_string()),
            email: Some("pat@acme.example".to_string()),
            ..supplier("Acme Corp")
        })
        .await
        .expect("supplier creation failed");

    assert!(created.active);
    assert_eq!(created.name, "Acme Corp");
    assert_eq!(created.contact_person.as_deref(), Some("Pat Lee"));
}

#[tokio::test]
async fn resubmitting_a_retired_supplier_reactivates_it_in_place() {
    let ctx = TestContext::new().await;
    let original = ctx
        .services
        .suppliers
        .submit_supplier(supplier("Acme Corp"))
        .await
        .expect("supplier creation failed");
    ctx.services
        .suppliers
        .retire_supplier(original.id)
        .await
        .expect("retire failed");

    let revived = ctx
        .services
        .suppliers
        .submit_supplier(SupplierDraft {
            phone: Some("555-0100".to_string()),
            ..supplier("Acme Corp")
        })
        .await
        .expect("resubmission failed");

    assert_eq!(revived.id, original.id);
    assert!(revived.active);
    assert_eq!(revived.phone.as_deref(), Some("555-0100"));

    let active = ctx
        .services
        .suppliers
        .list_active()
        .await
        .expect("listing failed");
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn renaming_a_supplier_onto_a_taken_name_fails() {
    let ctx = TestContext::new().await;
    ctx.services
        .suppliers
        .submit_supplier(supplier("Acme Corp"))
        .await
        .expect("supplier creation failed");
    let other = ctx
        .services
        .suppliers
        .submit_supplier(supplier("Globex"))
        .await
        .expect("supplier creation failed");

    let err = ctx
        .services
        .suppliers
        .update_supplier(other.id, supplier("Acme Corp"))
        .await
        .expect_err("rename onto a taken name should fail");

    assert_matches!(err, ServiceError::DuplicateName(name) if name == "Acme Corp");
}

#[tokio::test]
async fn retiring_hides_a_supplier_from_the_active_list() {
    let ctx = TestContext::new().await;
    let kept = ctx
        .services
        .suppliers
        .submit_supplier(supplier("Globex"))
        .await
        .expect("supplier creation failed");
    let retired = ctx
        .services
        .suppliers
        .submit_supplier(supplier("Acme Corp"))
        .await
        .expect("supplier creation failed");

    ctx.services
        .suppliers
        .retire_supplier(retired.id)
        .await
        .expect("retire failed");

    let active = ctx
        .services
        .suppliers
        .list_active()
        .await
        .expect("listing failed");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, kept.id);
}

#[tokio::test]
async fn retiring_an_unknown_supplier_fails() {
    let ctx = TestContext::new().await;

    let err = ctx
        .services
        .suppliers
        .retire_supplier(123)
        .await
        .expect_err("missing supplier should fail");

    assert_matches!(err, ServiceError::SupplierNotFound(123));
}

#[tokio::test]
async fn creating_an_actor_defaults_the_role_to_staff() {
    let ctx = TestContext::new().await;

    let actor = ctx
        .services
        .users
        .create_user(UserDraft {
            username: "clerk".to_string(),
            full_name: Some("Casey Clerk".to_string()),
            role: None,
        })
        .await
        .expect("actor creation failed");

    assert_eq!(actor.role, "STAFF");
    assert_eq!(actor.full_name.as_deref(), Some("Casey Clerk"));
}

#[tokio::test]
async fn an_explicit_role_is_kept() {
    let ctx = TestContext::new().await;

    let actor = ctx
        .services
        .users
        .create_user(UserDraft {
            username: "boss".to_string(),
            full_name: None,
            role: Some("ADMIN".to_string()),
        })
        .await
        .expect("actor creation failed");

    assert_eq!(actor.role, "ADMIN");
}

#[tokio::test]
async fn duplicate_usernames_are_rejected() {
    let ctx = TestContext::new().await;
    create_actor(&ctx, "clerk").await;

    let err = ctx
        .services
        .users
        .create_user(UserDraft {
            username: "clerk".to_string(),
            full_name: None,
            role: None,
        })
        .await
        .expect_err("duplicate username should fail");

    assert_matches!(err, ServiceError::DuplicateName(name) if name == "clerk");
}

#[tokio::test]
async fn resolving_an_unknown_actor_fails() {
    let ctx = TestContext::new().await;

    let err = ctx
        .services
        .users
        .resolve_actor(42)
        .await
        .expect_err("missing actor should fail");

    assert_matches!(err, ServiceError::ActorNotFound(42));
}

#[tokio::test]
async fn actors_list_in_username_order() {
    let ctx = TestContext::new().await;
    create_actor(&ctx, "zoe").await;
    create_actor(&ctx, "amir").await;
    create_actor(&ctx, "mila").await;

    let users = ctx.services.users.list_users().await.expect("listing failed");
    let usernames: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(usernames, ["amir", "mila", "zoe"]);
}
