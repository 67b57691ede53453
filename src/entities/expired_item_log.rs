use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Immutable audit row written when an expired lot is pulled and disposed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expired_item_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub disposal_id: i64,
    pub store_id: i64,
    pub item_id: i64,
    pub location_id: i64,
    pub quantity: f64,
    pub expiration_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub disposed_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::ItemId"
    )]
    Item,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
