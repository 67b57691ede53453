use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Physical storage area within a store (walk-in, dry storage, sales floor).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub location_id: i64,
    pub store_id: i64,
    pub name: String,
    pub is_sales_floor: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_lot::Entity")]
    InventoryLots,
}

impl Related<super::inventory_lot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryLots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
