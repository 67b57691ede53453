use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Named unit for an item: `factor` base units per one of `unit_name`
/// (e.g. 1 Box = 28.0 Gram). At most one conversion per item should carry
/// `is_default_display`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "unit_conversions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub conversion_id: i64,
    pub item_id: i64,
    pub unit_name: String,
    pub factor: f64,
    pub is_default_display: bool,
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
