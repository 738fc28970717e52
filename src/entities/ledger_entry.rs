use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Fixed description tags for stock changes.
///
/// Purchases carry a free-form description built with [`purchase_description`]
/// instead, so the supplier the stock arrived from survives in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum StockChangeKind {
    #[strum(serialize = "SALE")]
    Sale,
    #[strum(serialize = "RESTOCK")]
    Restock,
    #[strum(serialize = "ADJUSTMENT")]
    Adjustment,
    #[strum(serialize = "INITIAL_STOCK")]
    InitialStock,
}

/// Description tag for purchase-driven stock increases, e.g. `PURCHASE FROM: Acme Corp`.
pub fn purchase_description(supplier_name: &str) -> String {
    format!("PURCHASE FROM: {}", supplier_name)
}

/// One immutable stock ledger entry.
///
/// `quantity` is the signed delta applied to the item (positive = increase,
/// negative = decrease). Entries are append-only; updates are rejected at the
/// ActiveModel layer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub item_id: i64,
    pub quantity: i32,
    pub description: String,
    pub reference: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            return Err(DbErr::Custom(
                "stock ledger entries are append-only".to_string(),
            ));
        }

        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.created_at {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}
