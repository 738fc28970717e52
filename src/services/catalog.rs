use crate::{
    db::DbPool,
    entities::item::{self, Entity as Item},
    errors::ServiceError,
    events::{Event, EventSender},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr, TransactionError, TransactionTrait,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Fields accepted when submitting an item to the catalog.
///
/// There is deliberately no quantity here: stock enters an item's record
/// exclusively through the ledger, including the initial fill.
#[derive(Debug, Clone)]
pub struct ItemDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub promo_price: Option<Decimal>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// Fields replaceable on an existing item. Name, quantity and the active
/// flag are not updatable through this path.
#[derive(Debug, Clone)]
pub struct ItemUpdate {
    pub description: Option<String>,
    pub price: Decimal,
    pub promo_price: Option<Decimal>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// Catalog service: owns item identity and the merge-by-name rule.
///
/// A submitted name that matches an existing item, active or retired,
/// updates that record in place and forces it active; only a genuinely
/// unseen name creates a new row. The `items.name` UNIQUE constraint backs
/// this up under concurrency.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    /// Creates a new catalog service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Submits an item draft: creates a new item, or merges the draft into
    /// the existing item of the same name and reactivates it.
    #[instrument(skip(self))]
    pub async fn submit_item(&self, draft: ItemDraft) -> Result<item::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let item = db
            .transaction::<_, item::Model, ServiceError>(move |txn| {
                Box::pin(async move { Self::submit_in_txn(txn, draft).await })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(item_id = item.id, name = %item.name, "Item submitted to catalog");

        if let Err(e) = self.event_sender.send(Event::ItemSubmitted(item.id)).await {
            error!("Failed to send item submitted event: {}", e);
        }

        Ok(item)
    }

    /// Transactional core of [`submit_item`], shared with the purchase
    /// processor so a purchase can create its item inside its own unit of
    /// work.
    ///
    /// [`submit_item`]: CatalogService::submit_item
    pub(crate) async fn submit_in_txn(
        txn: &DatabaseTransaction,
        draft: ItemDraft,
    ) -> Result<item::Model, ServiceError> {
        let existing = Item::find()
            .filter(item::Column::Name.eq(&draft.name))
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?;

        if let Some(existing) = existing {
            return Self::merge_into(txn, existing, &draft).await;
        }

        match Self::insert_draft(txn, &draft).await {
            Ok(created) => Ok(created),
            Err(e) if is_unique_violation(&e) => {
                // Lost the insert race to a concurrent submitter; the row
                // exists now, so fold the draft into it.
                warn!(name = %draft.name, "Concurrent item submission detected, merging instead");
                let existing = Item::find()
                    .filter(item::Column::Name.eq(&draft.name))
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| ServiceError::DuplicateName(draft.name.clone()))?;
                Self::merge_into(txn, existing, &draft).await
            }
            Err(e) => Err(e),
        }
    }

    /// Updates the replaceable fields of an item by id.
    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        id: i64,
        update: ItemUpdate,
    ) -> Result<item::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let item = Item::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or(ServiceError::ItemNotFound(id))?;

        let mut item: item::ActiveModel = item.into();
        item.description = Set(update.description);
        item.price = Set(update.price);
        item.promo_price = Set(update.promo_price);
        item.category = Set(update.category);
        item.image_url = Set(update.image_url);

        let updated = item.update(db).await.map_err(ServiceError::db_error)?;

        info!(item_id = updated.id, "Item updated");

        Ok(updated)
    }

    /// Retires an item: soft delete, quantity and ledger history untouched.
    #[instrument(skip(self))]
    pub async fn retire(&self, id: i64) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let item = Item::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or(ServiceError::ItemNotFound(id))?;

        let mut item: item::ActiveModel = item.into();
        item.active = Set(false);
        item.update(db).await.map_err(ServiceError::db_error)?;

        info!(item_id = id, "Item retired");

        if let Err(e) = self.event_sender.send(Event::ItemRetired(id)).await {
            error!("Failed to send item retired event: {}", e);
        }

        Ok(())
    }

    /// Fetches a single item by id.
    #[instrument(skip(self))]
    pub async fn get_item(&self, id: i64) -> Result<item::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        Item::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or(ServiceError::ItemNotFound(id))
    }

    /// Lists active items, name order.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<item::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        Item::find()
            .filter(item::Column::Active.eq(true))
            .order_by_asc(item::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Lists every item including retired ones. Admin view.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<item::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        Item::find()
            .order_by_asc(item::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    async fn merge_into(
        txn: &DatabaseTransaction,
        existing: item::Model,
        draft: &ItemDraft,
    ) -> Result<item::Model, ServiceError> {
        let was_retired = !existing.active;

        let mut merged: item::ActiveModel = existing.into();
        merged.description = Set(draft.description.clone());
        merged.price = Set(draft.price);
        merged.promo_price = Set(draft.promo_price);
        merged.category = Set(draft.category.clone());
        merged.image_url = Set(draft.image_url.clone());
        merged.active = Set(true);

        let merged = merged.update(txn).await.map_err(ServiceError::db_error)?;

        if was_retired {
            info!(item_id = merged.id, name = %merged.name, "Retired item reactivated by resubmission");
        }

        Ok(merged)
    }

    async fn insert_draft(
        txn: &DatabaseTransaction,
        draft: &ItemDraft,
    ) -> Result<item::Model, ServiceError> {
        let active_model = item::ActiveModel {
            name: Set(draft.name.clone()),
            description: Set(draft.description.clone()),
            price: Set(draft.price),
            promo_price: Set(draft.promo_price),
            category: Set(draft.category.clone()),
            image_url: Set(draft.image_url.clone()),
            ..Default::default()
        };

        // Savepoint around the insert: a lost unique-name race must not
        // poison the caller's enclosing transaction.
        txn.transaction::<_, item::Model, ServiceError>(move |sp| {
            Box::pin(async move { active_model.insert(sp).await.map_err(ServiceError::db_error) })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }
}

fn is_unique_violation(err: &ServiceError) -> bool {
    matches!(
        err,
        ServiceError::DatabaseError(db_err)
            if matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
    )
}
