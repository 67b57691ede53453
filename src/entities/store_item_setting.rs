use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Store-specific configuration for a catalog item: preferred receiving
/// location and par level. One row per (store, item).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "store_item_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub setting_id: i64,
    pub store_id: i64,
    pub item_id: i64,
    pub default_location_id: Option<i64>,
    /// Minimum desired on-hand quantity, used for low-stock signaling.
    pub par_level: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::ItemId"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::DefaultLocationId",
        to = "super::location::Column::LocationId"
    )]
    DefaultLocation,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DefaultLocation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
