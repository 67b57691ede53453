use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recipe producing one catalog item. `yield_quantity` is expressed in
/// `yield_unit` when set, otherwise in the produced item's base unit.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub recipe_id: i64,
    pub item_id: i64,
    pub yield_quantity: f64,
    pub yield_unit_id: Option<i64>,
    pub instructions: Option<String>,
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
        belongs_to = "super::unit_conversion::Entity",
        from = "Column::YieldUnitId",
        to = "super::unit_conversion::Column::ConversionId"
    )]
    YieldUnit,
    #[sea_orm(has_many = "super::recipe_ingredient::Entity")]
    Ingredients,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::recipe_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
