use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One ingredient line of a recipe. `quantity_required` is per batch, in the
/// ingredient item's base unit.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe_ingredients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub recipe_ingredient_id: i64,
    pub recipe_id: i64,
    pub ingredient_item_id: i64,
    pub quantity_required: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recipe::Entity",
        from = "Column::RecipeId",
        to = "super::recipe::Column::RecipeId"
    )]
    Recipe,
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::IngredientItemId",
        to = "super::item::Column::ItemId"
    )]
    IngredientItem,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IngredientItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
