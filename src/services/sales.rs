use crate::{
    db::DbPool,
    entities::{
        ledger_entry::StockChangeKind,
        sale::{self, sale_reference, Entity as Sale},
        sale_line::{self, Entity as SaleLine},
        user::Entity as User,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::ledger::{LedgerService, MAX_ADJUST_ATTEMPTS},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionError, TransactionTrait,
};
use slog::Logger;
use std::sync::Arc;
use tracing::{error, instrument, warn};

/// One requested sale line: which item and how many units.
#[derive(Debug, Clone)]
pub struct SaleLineDraft {
    pub item_id: i64,
    pub quantity: i32,
}

/// Sale processor: multi-line point-of-sale transactions.
///
/// The header is persisted first so the invoice reference can be derived
/// from its generated id; every line then snapshots the item's current
/// price and pushes its stock decrease through the ledger. The whole sale
/// commits or rolls back as one unit.
#[derive(Clone)]
pub struct SaleService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    logger: Logger,
}

impl SaleService {
    /// Creates a new sale service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, logger: Logger) -> Self {
        Self {
            db_pool,
            event_sender,
            logger,
        }
    }

    /// Records a completed sale for the given actor.
    #[instrument(skip(self))]
    pub async fn record_sale(
        &self,
        lines: Vec<SaleLineDraft>,
        actor_id: i64,
        payment_method: Option<String>,
    ) -> Result<(sale::Model, Vec<sale_line::Model>), ServiceError> {
        if lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "sale requires at least one line".to_string(),
            ));
        }
        if lines.iter().any(|line| line.quantity <= 0) {
            return Err(ServiceError::ValidationError(
                "sale line quantity must be positive".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();

        let mut attempt = 1;
        let (sale, sale_lines) = loop {
            let lines = lines.clone();
            let payment_method = payment_method.clone();

            let result = db
                .transaction::<_, (sale::Model, Vec<sale_line::Model>), ServiceError>(
                    move |txn| {
                        Box::pin(async move {
                            Self::record_in_txn(txn, lines, actor_id, payment_method).await
                        })
                    },
                )
                .await
                .map_err(|e| match e {
                    TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                    TransactionError::Transaction(service_err) => service_err,
                });

            match result {
                Ok(done) => break done,
                Err(ServiceError::ConcurrentModification(_)) if attempt < MAX_ADJUST_ATTEMPTS => {
                    warn!(attempt, "Concurrent stock write during sale, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        let reference = sale.reference.clone().unwrap_or_default();

        slog::info!(self.logger, "sale recorded";
            "sale_id" => sale.id,
            "reference" => &reference,
            "lines" => sale_lines.len(),
            "total" => %sale.total_amount,
        );

        if let Err(e) = self
            .event_sender
            .send(Event::SaleCompleted {
                sale_id: sale.id,
                reference,
            })
            .await
        {
            error!("Failed to send sale completed event: {}", e);
        }

        Ok((sale, sale_lines))
    }

    /// Lists sale headers, newest first.
    #[instrument(skip(self))]
    pub async fn list_sales(&self) -> Result<Vec<sale::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        Sale::find()
            .order_by_desc(sale::Column::CreatedAt)
            .order_by_desc(sale::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Fetches a sale header with its lines.
    #[instrument(skip(self))]
    pub async fn get_sale(
        &self,
        id: i64,
    ) -> Result<(sale::Model, Vec<sale_line::Model>), ServiceError> {
        let db = self.db_pool.as_ref();

        let header = Sale::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Sale {} not found", id)))?;

        let lines = SaleLine::find()
            .filter(sale_line::Column::SaleId.eq(id))
            .order_by_asc(sale_line::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((header, lines))
    }

    async fn record_in_txn(
        txn: &DatabaseTransaction,
        lines: Vec<SaleLineDraft>,
        actor_id: i64,
        payment_method: Option<String>,
    ) -> Result<(sale::Model, Vec<sale_line::Model>), ServiceError> {
        User::find_by_id(actor_id)
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or(ServiceError::ActorNotFound(actor_id))?;

        // Header first: the reference needs the generated id.
        let header = sale::ActiveModel {
            total_amount: Set(Decimal::ZERO),
            payment_method: Set(payment_method),
            created_by: Set(actor_id),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;

        let reference = sale_reference(header.id);
        let sale_kind = StockChangeKind::Sale.to_string();

        let mut running_total = Decimal::ZERO;
        let mut persisted_lines = Vec::with_capacity(lines.len());

        for line in &lines {
            let (item, _entry) = LedgerService::apply_in_txn(
                txn,
                line.item_id,
                -line.quantity,
                &sale_kind,
                Some(reference.clone()),
                Some(actor_id),
            )
            .await?;

            let unit_price = item.price;
            let line_total = unit_price * Decimal::from(line.quantity);
            running_total += line_total;

            let persisted = sale_line::ActiveModel {
                sale_id: Set(header.id),
                item_id: Set(line.item_id),
                quantity: Set(line.quantity),
                unit_price: Set(unit_price),
                line_total: Set(line_total),
                ..Default::default()
            }
            .insert(txn)
            .await
            .map_err(ServiceError::db_error)?;

            persisted_lines.push(persisted);
        }

        let mut header: sale::ActiveModel = header.into();
        header.reference = Set(Some(reference));
        header.total_amount = Set(running_total);
        let header = header.update(txn).await.map_err(ServiceError::db_error)?;

        Ok((header, persisted_lines))
    }
}
