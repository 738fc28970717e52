// Shared across the integration test binaries; not every binary uses
// every helper.
#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use slog::Logger;
use stockledger_api::{
    db::{establish_connection_with_config, run_migrations, DbConfig, DbPool},
    entities::{item, ledger_entry::StockChangeKind, user},
    events::{process_events, EventSender},
    handlers::AppServices,
    services::{catalog::ItemDraft, users::UserDraft},
};
use tokio::sync::mpsc;

/// Service layer wired to a fresh in-memory SQLite database.
pub struct TestContext {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestContext {
    /// Construct a new context with migrated, empty tables.
    pub async fn new() -> Self {
        // One pooled connection: with `sqlite::memory:` every extra
        // connection would get its own private database.
        let config = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };

        let pool = establish_connection_with_config(&config)
            .await
            .expect("failed to create test database");
        run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let db = Arc::new(pool);
        let (tx, rx) = mpsc::channel(64);
        let event_sender = Arc::new(EventSender::new(tx));
        let event_task = tokio::spawn(process_events(rx));

        let logger = Logger::root(slog::Discard, slog::o!());
        let services = AppServices::new(db.clone(), event_sender, logger);

        Self {
            db,
            services,
            _event_task: event_task,
        }
    }
}

/// Money helper: `price(2, 50)` is 2.50.
pub fn price(units: i64, cents: i64) -> Decimal {
    Decimal::new(units * 100 + cents, 2)
}

/// Creates an actor record for ledger attribution.
pub async fn create_actor(ctx: &TestContext, username: &str) -> user::Model {
    ctx.services
        .users
        .create_user(UserDraft {
            username: username.to_string(),
            full_name: None,
            role: None,
        })
        .await
        .expect("failed to create actor")
}

/// Creates a catalog item with no stock.
pub async fn create_item(ctx: &TestContext, name: &str, unit_price: Decimal) -> item::Model {
    ctx.services
        .catalog
        .submit_item(ItemDraft {
            name: name.to_string(),
            description: None,
            price: unit_price,
            promo_price: None,
            category: None,
            image_url: None,
        })
        .await
        .expect("failed to create item")
}

/// Creates a catalog item and books its opening stock through the ledger.
pub async fn create_stocked_item(
    ctx: &TestContext,
    name: &str,
    unit_price: Decimal,
    quantity: i32,
) -> item::Model {
    let item = create_item(ctx, name, unit_price).await;
    let (item, _entry) = ctx
        .services
        .ledger
        .apply_adjustment(
            item.id,
            quantity,
            &StockChangeKind::InitialStock.to_string(),
            None,
            None,
        )
        .await
        .expect("failed to book initial stock");
    item
}
