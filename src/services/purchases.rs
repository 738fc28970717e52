use crate::{
    db::DbPool,
    entities::{
        item::Entity as Item,
        ledger_entry::purchase_description,
        purchase::{self, Entity as Purchase},
        supplier::Entity as Supplier,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::catalog::{CatalogService, ItemDraft},
    services::ledger::{LedgerService, MAX_ADJUST_ATTEMPTS},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, EntityTrait, QueryOrder, Set, TransactionError,
    TransactionTrait,
};
use slog::Logger;
use std::sync::Arc;
use tracing::{error, instrument, warn};

/// Fields accepted when recording a purchase.
///
/// `item_id` points at an existing catalog item; leaving it empty and
/// supplying `item_name` instead creates (or reactivates) the item as part
/// of the purchase.
#[derive(Debug, Clone)]
pub struct PurchaseDraft {
    pub item_id: Option<i64>,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub category: Option<String>,
    pub reference: Option<String>,
    pub supplier_id: Option<i64>,
    pub actor: Option<i64>,
}

/// Purchase processor: receives stock into the catalog.
///
/// One purchase covers one item line. The item's quantity increase goes
/// through the ledger inside the purchase's own transaction, with the
/// supplier's display name baked into the entry description.
#[derive(Clone)]
pub struct PurchaseService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    logger: Logger,
}

impl PurchaseService {
    /// Creates a new purchase service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, logger: Logger) -> Self {
        Self {
            db_pool,
            event_sender,
            logger,
        }
    }

    /// Records a purchase: resolves or creates the item, computes the
    /// total, appends the ledger entry and persists the purchase record as
    /// one atomic unit.
    #[instrument(skip(self))]
    pub async fn record_purchase(
        &self,
        draft: PurchaseDraft,
    ) -> Result<purchase::Model, ServiceError> {
        if draft.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "purchase quantity must be positive".to_string(),
            ));
        }
        if draft.item_id.is_none() && draft.item_name.is_none() {
            return Err(ServiceError::ValidationError(
                "purchase requires an item id or a new item name".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();

        let mut attempt = 1;
        let (purchase, created_item_id) = loop {
            let draft = draft.clone();

            let result = db
                .transaction::<_, (purchase::Model, Option<i64>), ServiceError>(move |txn| {
                    Box::pin(async move { Self::record_in_txn(txn, draft).await })
                })
                .await
                .map_err(|e| match e {
                    TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                    TransactionError::Transaction(service_err) => service_err,
                });

            match result {
                Ok(done) => break done,
                Err(ServiceError::ConcurrentModification(_)) if attempt < MAX_ADJUST_ATTEMPTS => {
                    warn!(attempt, "Concurrent stock write during purchase, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        slog::info!(self.logger, "purchase recorded";
            "purchase_id" => purchase.id,
            "item_id" => purchase.item_id,
            "quantity" => purchase.quantity,
            "total" => %purchase.total_amount,
        );

        if let Some(item_id) = created_item_id {
            if let Err(e) = self.event_sender.send(Event::ItemSubmitted(item_id)).await {
                error!("Failed to send item submitted event: {}", e);
            }
        }
        if let Err(e) = self
            .event_sender
            .send(Event::PurchaseRecorded {
                purchase_id: purchase.id,
            })
            .await
        {
            error!("Failed to send purchase recorded event: {}", e);
        }

        Ok(purchase)
    }

    /// Lists purchases, newest first.
    #[instrument(skip(self))]
    pub async fn list_purchases(&self) -> Result<Vec<purchase::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        Purchase::find()
            .order_by_desc(purchase::Column::CreatedAt)
            .order_by_desc(purchase::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    async fn record_in_txn(
        txn: &DatabaseTransaction,
        draft: PurchaseDraft,
    ) -> Result<(purchase::Model, Option<i64>), ServiceError> {
        let (item_id, created_item_id) = match draft.item_id {
            Some(id) => {
                let item = Item::find_by_id(id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or(ServiceError::ItemNotFound(id))?;

                // The catalog's category mirrors the most recent purchase's
                // declared category.
                if draft.category.is_some() && draft.category != item.category {
                    let mut active: crate::entities::item::ActiveModel = item.into();
                    active.category = Set(draft.category.clone());
                    active.update(txn).await.map_err(ServiceError::db_error)?;
                }

                (id, None)
            }
            None => {
                let name = draft.item_name.clone().ok_or_else(|| {
                    ServiceError::ValidationError(
                        "purchase requires an item id or a new item name".to_string(),
                    )
                })?;

                let item = CatalogService::submit_in_txn(
                    txn,
                    ItemDraft {
                        name,
                        description: draft.description.clone(),
                        price: draft.unit_price,
                        promo_price: None,
                        category: draft.category.clone(),
                        image_url: None,
                    },
                )
                .await?;

                (item.id, Some(item.id))
            }
        };

        let total_amount = draft.unit_price * Decimal::from(draft.quantity);

        // Best-effort supplier display name; a missing or unreadable
        // supplier never fails the purchase.
        let (supplier_name, supplier_id) = match draft.supplier_id {
            None => ("Restock".to_string(), None),
            Some(sid) => match Supplier::find_by_id(sid).one(txn).await {
                Ok(Some(supplier)) => (supplier.name, Some(sid)),
                Ok(None) => ("Unknown Supplier".to_string(), None),
                Err(e) => {
                    warn!(supplier_id = sid, "Supplier lookup failed: {}", e);
                    ("Unknown Supplier".to_string(), None)
                }
            },
        };

        LedgerService::apply_in_txn(
            txn,
            item_id,
            draft.quantity,
            &purchase_description(&supplier_name),
            draft.reference.clone(),
            draft.actor,
        )
        .await?;

        let recorded = purchase::ActiveModel {
            item_id: Set(item_id),
            supplier_id: Set(supplier_id),
            quantity: Set(draft.quantity),
            unit_price: Set(draft.unit_price),
            total_amount: Set(total_amount),
            category: Set(draft.category),
            reference: Set(draft.reference),
            created_by: Set(draft.actor),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;

        Ok((recorded, created_item_id))
    }
}
