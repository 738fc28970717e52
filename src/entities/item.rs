use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};

/// Catalog item entity
///
/// `quantity` is a denormalized cache of the item's ledger sum and is only
/// ever written through the ledger service; `version` guards that write
/// against concurrent adjusters.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Item name, unique across the catalog (active or retired)
    pub name: String,

    /// Item description
    pub description: Option<String>,

    /// Unit selling price
    pub price: Decimal,

    /// Promotional price, shown alongside the regular price when present
    pub promo_price: Option<Decimal>,

    /// Current stock level; reconcilable against the stock ledger at all times
    pub quantity: i32,

    /// Item category, kept in sync with the most recent purchase's declared category
    pub category: Option<String>,

    /// URL to the item image
    pub image_url: Option<String>,

    /// Soft-delete flag; retired items stay on disk for ledger integrity
    pub active: bool,

    /// Optimistic concurrency counter, bumped on every quantity write
    pub version: i32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger_entry::Entity")]
    LedgerEntries,
    #[sea_orm(has_many = "super::sale_line::Entity")]
    SaleLines,
    #[sea_orm(has_many = "super::purchase::Entity")]
    Purchases,
}

impl Related<super::ledger_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl Related<super::sale_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleLines.def()
    }
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            // Set default values if not provided by the caller
            if let ActiveValue::NotSet = active_model.active {
                active_model.active = Set(true);
            }

            if let ActiveValue::NotSet = active_model.quantity {
                active_model.quantity = Set(0);
            }

            if let ActiveValue::NotSet = active_model.version {
                active_model.version = Set(0);
            }

            active_model.created_at = Set(Utc::now());
        }

        active_model.updated_at = Set(Some(Utc::now()));

        Ok(active_model)
    }
}
