pub mod common;
pub mod items;
pub mod ledger;
pub mod purchases;
pub mod sales;
pub mod suppliers;
pub mod users;

use crate::db::DbPool;
use crate::events::EventSender;
use slog::Logger;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<crate::services::catalog::CatalogService>,
    pub ledger: Arc<crate::services::ledger::LedgerService>,
    pub sales: Arc<crate::services::sales::SaleService>,
    pub purchases: Arc<crate::services::purchases::PurchaseService>,
    pub suppliers: Arc<crate::services::suppliers::SupplierService>,
    pub users: Arc<crate::services::users::UserService>,
}

impl AppServices {
    /// Build the AppServices container, deriving per-service loggers from
    /// the base logger.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, base_logger: Logger) -> Self {
        let sales_logger = base_logger.new(slog::o!("component" => "sale_service"));
        let purchases_logger = base_logger.new(slog::o!("component" => "purchase_service"));

        let catalog = Arc::new(crate::services::catalog::CatalogService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let ledger = Arc::new(crate::services::ledger::LedgerService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let sales = Arc::new(crate::services::sales::SaleService::new(
            db_pool.clone(),
            event_sender.clone(),
            sales_logger,
        ));
        let purchases = Arc::new(crate::services::purchases::PurchaseService::new(
            db_pool.clone(),
            event_sender.clone(),
            purchases_logger,
        ));
        let suppliers = Arc::new(crate::services::suppliers::SupplierService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let users = Arc::new(crate::services::users::UserService::new(db_pool));

        Self {
            catalog,
            ledger,
            sales,
            purchases,
            suppliers,
            users,
        }
    }
}
