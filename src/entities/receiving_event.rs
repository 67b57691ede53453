use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable log row, one per delivery. Quantity is in the item's base unit.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receiving_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub receiving_id: i64,
    pub transaction_id: Uuid,
    pub store_id: i64,
    pub item_id: i64,
    pub quantity: f64,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub unit_cost: Option<Decimal>,
    pub received_at: DateTime<Utc>,
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
