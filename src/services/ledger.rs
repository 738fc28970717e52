use crate::{
    db::DbPool,
    entities::{
        item::{self, Entity as Item},
        ledger_entry::{self, Entity as LedgerEntry},
        user::Entity as User,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use metrics::counter;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionError, TransactionTrait,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// How many times a quantity write is retried after losing the version race
/// before the operation gives up with `ConcurrentModification`. The sale and
/// purchase processors re-run their whole unit of work on the same budget.
pub(crate) const MAX_ADJUST_ATTEMPTS: u32 = 3;

/// The stock ledger: the single choke-point for every quantity mutation.
///
/// Each adjustment writes the item's new quantity and appends one immutable
/// ledger entry in the same transaction, so `item.quantity` always equals the
/// sum of the item's entry deltas.
#[derive(Clone)]
pub struct LedgerService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl LedgerService {
    /// Creates a new ledger service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Applies a signed quantity delta to an item and appends the matching
    /// ledger entry, atomically.
    ///
    /// Retries up to [`MAX_ADJUST_ATTEMPTS`] times when a concurrent writer
    /// wins the version race; each attempt re-reads the item so the
    /// non-negative check always runs against fresh state.
    #[instrument(skip(self))]
    pub async fn apply_adjustment(
        &self,
        item_id: i64,
        delta: i32,
        kind: &str,
        reference: Option<String>,
        actor: Option<i64>,
    ) -> Result<(item::Model, ledger_entry::Model), ServiceError> {
        let db = self.db_pool.as_ref();

        let mut attempt = 1;
        let (updated_item, entry) = loop {
            let kind = kind.to_string();
            let reference = reference.clone();

            let result = db
                .transaction::<_, (item::Model, ledger_entry::Model), ServiceError>(move |txn| {
                    Box::pin(async move {
                        Self::apply_in_txn(txn, item_id, delta, &kind, reference, actor).await
                    })
                })
                .await
                .map_err(|e| match e {
                    TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                    TransactionError::Transaction(service_err) => service_err,
                });

            match result {
                Ok(applied) => break applied,
                Err(ServiceError::ConcurrentModification(_)) if attempt < MAX_ADJUST_ATTEMPTS => {
                    counter!("ledger_retries_total", 1);
                    warn!(
                        item_id,
                        attempt, "Concurrent quantity write detected, retrying adjustment"
                    );
                    attempt += 1;
                }
                Err(e) => {
                    if matches!(e, ServiceError::InsufficientStock { .. }) {
                        counter!("ledger_insufficient_stock_total", 1);
                    }
                    return Err(e);
                }
            }
        };

        counter!("ledger_adjustments_total", 1);
        info!(
            item_id,
            delta,
            new_quantity = updated_item.quantity,
            "Stock adjustment applied"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::StockAdjusted {
                item_id,
                delta,
                new_quantity: updated_item.quantity,
            })
            .await
        {
            error!("Failed to send stock adjusted event: {}", e);
        }

        Ok((updated_item, entry))
    }

    /// Core of [`apply_adjustment`], usable from a caller-owned transaction.
    ///
    /// The sale and purchase processors run several of these inside one
    /// transaction; a failure from any call rolls the whole unit back.
    ///
    /// [`apply_adjustment`]: LedgerService::apply_adjustment
    pub(crate) async fn apply_in_txn(
        txn: &DatabaseTransaction,
        item_id: i64,
        delta: i32,
        kind: &str,
        reference: Option<String>,
        actor: Option<i64>,
    ) -> Result<(item::Model, ledger_entry::Model), ServiceError> {
        let item = Item::find_by_id(item_id)
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or(ServiceError::ItemNotFound(item_id))?;

        if let Some(actor_id) = actor {
            User::find_by_id(actor_id)
                .one(txn)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or(ServiceError::ActorNotFound(actor_id))?;
        }

        let new_quantity = item.quantity + delta;
        if new_quantity < 0 {
            return Err(ServiceError::InsufficientStock {
                item_id,
                delta,
                resulting: new_quantity,
            });
        }

        // Conditional write: only the writer that read the current version
        // gets to bump it. Zero rows affected means a concurrent adjustment
        // committed in between.
        let now = Utc::now();
        let update_result = Item::update_many()
            .col_expr(item::Column::Quantity, Expr::value(new_quantity))
            .col_expr(item::Column::Version, Expr::value(item.version + 1))
            .col_expr(item::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(item::Column::Id.eq(item_id))
            .filter(item::Column::Version.eq(item.version))
            .exec(txn)
            .await
            .map_err(ServiceError::db_error)?;

        if update_result.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification(item_id));
        }

        let entry = ledger_entry::ActiveModel {
            item_id: Set(item_id),
            quantity: Set(delta),
            description: Set(kind.to_string()),
            reference: Set(reference),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;

        let updated_item = item::Model {
            quantity: new_quantity,
            version: item.version + 1,
            updated_at: Some(now),
            ..item
        };

        Ok((updated_item, entry))
    }

    /// Lists every ledger entry, newest first.
    #[instrument(skip(self))]
    pub async fn list_entries(&self) -> Result<Vec<ledger_entry::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        LedgerEntry::find()
            .order_by_desc(ledger_entry::Column::CreatedAt)
            .order_by_desc(ledger_entry::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Deletes every ledger entry for an item. Admin tooling only; this is
    /// the one sanctioned hole in the append-only rule and has no HTTP route.
    #[instrument(skip(self))]
    pub async fn purge_item_history(&self, item_id: i64) -> Result<u64, ServiceError> {
        let db = self.db_pool.as_ref();

        Item::find_by_id(item_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or(ServiceError::ItemNotFound(item_id))?;

        let result = LedgerEntry::delete_many()
            .filter(ledger_entry::Column::ItemId.eq(item_id))
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        warn!(
            item_id,
            rows = result.rows_affected,
            "Purged ledger history for item"
        );

        Ok(result.rows_affected)
    }
}
