use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Immutable audit row written during FULL stocktake finalization for every
/// counted (item, location) whose count disagreed with the ledger.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "variance_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub variance_id: i64,
    pub store_id: i64,
    pub item_id: i64,
    pub location_id: i64,
    pub expected_quantity: f64,
    pub actual_quantity: f64,
    /// Actual minus expected.
    pub variance: f64,
    pub recorded_at: DateTime<Utc>,
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
