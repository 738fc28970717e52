use crate::{
    db::DbPool,
    entities::supplier::{self, Entity as Supplier},
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Fields accepted when submitting a supplier record.
#[derive(Debug, Clone)]
pub struct SupplierDraft {
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Supplier directory with the same merge-by-name and soft-delete rules as
/// the item catalog: resubmitting a retired supplier's name reactivates it.
#[derive(Clone)]
pub struct SupplierService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SupplierService {
    /// Creates a new supplier service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Submits a supplier: creates a new record, or merges into the
    /// existing record of the same name and reactivates it.
    #[instrument(skip(self))]
    pub async fn submit_supplier(
        &self,
        draft: SupplierDraft,
    ) -> Result<supplier::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = Supplier::find()
            .filter(supplier::Column::Name.eq(&draft.name))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;

        if let Some(existing) = existing {
            return self.merge_into(existing, &draft).await;
        }

        let active_model = supplier::ActiveModel {
            name: Set(draft.name.clone()),
            contact_person: Set(draft.contact_person.clone()),
            email: Set(draft.email.clone()),
            phone: Set(draft.phone.clone()),
            address: Set(draft.address.clone()),
            ..Default::default()
        };

        match active_model.insert(db).await {
            Ok(created) => {
                info!(supplier_id = created.id, name = %created.name, "Supplier created");
                Ok(created)
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                warn!(name = %draft.name, "Concurrent supplier submission detected, merging instead");
                let existing = Supplier::find()
                    .filter(supplier::Column::Name.eq(&draft.name))
                    .one(db)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| ServiceError::DuplicateName(draft.name.clone()))?;
                self.merge_into(existing, &draft).await
            }
            Err(e) => Err(ServiceError::db_error(e)),
        }
    }

    /// Replaces a supplier's fields by id. Renaming onto a taken name
    /// surfaces `DuplicateName`.
    #[instrument(skip(self))]
    pub async fn update_supplier(
        &self,
        id: i64,
        draft: SupplierDraft,
    ) -> Result<supplier::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = Supplier::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or(ServiceError::SupplierNotFound(id))?;

        let mut active_model: supplier::ActiveModel = existing.into();
        active_model.name = Set(draft.name.clone());
        active_model.contact_person = Set(draft.contact_person);
        active_model.email = Set(draft.email);
        active_model.phone = Set(draft.phone);
        active_model.address = Set(draft.address);

        let updated = active_model.update(db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                ServiceError::DuplicateName(draft.name.clone())
            } else {
                ServiceError::db_error(e)
            }
        })?;

        info!(supplier_id = updated.id, "Supplier updated");

        Ok(updated)
    }

    /// Retires a supplier: soft delete; purchase history keeps pointing at
    /// the row.
    #[instrument(skip(self))]
    pub async fn retire_supplier(&self, id: i64) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = Supplier::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or(ServiceError::SupplierNotFound(id))?;

        let mut active_model: supplier::ActiveModel = existing.into();
        active_model.active = Set(false);
        active_model.update(db).await.map_err(ServiceError::db_error)?;

        info!(supplier_id = id, "Supplier retired");

        if let Err(e) = self.event_sender.send(Event::SupplierRetired(id)).await {
            error!("Failed to send supplier retired event: {}", e);
        }

        Ok(())
    }

    /// Lists active suppliers, name order.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        Supplier::find()
            .filter(supplier::Column::Active.eq(true))
            .order_by_asc(supplier::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    async fn merge_into(
        &self,
        existing: supplier::Model,
        draft: &SupplierDraft,
    ) -> Result<supplier::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let was_retired = !existing.active;

        let mut merged: supplier::ActiveModel = existing.into();
        merged.contact_person = Set(draft.contact_person.clone());
        merged.email = Set(draft.email.clone());
        merged.phone = Set(draft.phone.clone());
        merged.address = Set(draft.address.clone());
        merged.active = Set(true);

        let merged = merged.update(db).await.map_err(ServiceError::db_error)?;

        if was_retired {
            info!(supplier_id = merged.id, name = %merged.name, "Retired supplier reactivated by resubmission");
        } else {
            info!(supplier_id = merged.id, name = %merged.name, "Supplier merged by name");
        }

        Ok(merged)
    }
}
