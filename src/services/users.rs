use crate::{
    db::DbPool,
    entities::user::{self, Entity as User},
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, SqlErr};
use std::sync::Arc;
use tracing::{info, instrument};

/// Fields for creating an actor record. Actors carry no credentials;
/// authentication lives outside this service.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub username: String,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

/// Actor (user) records referenced by ledger entries, sales and purchases.
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
}

impl UserService {
    /// Creates a new user service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates an actor record. Usernames are unique; a collision surfaces
    /// as `DuplicateName`.
    #[instrument(skip(self))]
    pub async fn create_user(&self, draft: UserDraft) -> Result<user::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let mut active_model = user::ActiveModel {
            username: Set(draft.username.clone()),
            full_name: Set(draft.full_name),
            ..Default::default()
        };
        if let Some(role) = draft.role {
            active_model.role = Set(role);
        }

        let created = active_model.insert(db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                ServiceError::DuplicateName(draft.username.clone())
            } else {
                ServiceError::db_error(e)
            }
        })?;

        info!(user_id = created.id, username = %created.username, "Actor record created");

        Ok(created)
    }

    /// Resolves an actor by id, failing `ActorNotFound` when absent.
    #[instrument(skip(self))]
    pub async fn resolve_actor(&self, id: i64) -> Result<user::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        User::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or(ServiceError::ActorNotFound(id))
    }

    /// Lists all actor records, username order.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<user::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        User::find()
            .order_by_asc(user::Column::Username)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }
}
