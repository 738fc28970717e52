use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Derives the human-readable sale reference from the generated header id:
/// id 61 becomes `SLS-00061`. Ids beyond five digits keep all their digits.
pub fn sale_reference(sale_id: i64) -> String {
    format!("SLS-{:05}", sale_id)
}

/// Sale header. The invoice reference is derived from the generated id
/// (`SLS-00061` for id 61), so the header is always persisted before its
/// lines and patched with the reference and final total afterwards.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub reference: Option<String>,
    pub total_amount: Decimal,
    pub payment_method: Option<String>,
    pub status: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sale_line::Entity")]
    SaleLines,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::sale_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleLines.def()
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
        let mut active_model = self;

        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.status {
                active_model.status = Set("COMPLETED".to_string());
            }
            active_model.created_at = Set(now);
        }

        active_model.updated_at = Set(Some(now));

        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(7, "SLS-00007"; "single digit pads to five")]
    #[test_case(61, "SLS-00061"; "two digits pad to five")]
    #[test_case(99999, "SLS-99999"; "five digits fit exactly")]
    #[test_case(123456, "SLS-123456"; "six digits keep them all")]
    fn reference_is_zero_padded_to_five_digits(id: i64, expected: &str) {
        assert_eq!(sale_reference(id), expected);
    }
}
