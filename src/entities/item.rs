use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Catalog item shared across stores. Quantities elsewhere in the system are
/// always expressed in this item's `base_unit`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub item_id: i64,
    pub name: String,
    pub item_type: String,
    pub base_unit: String,
    /// Null means the item never expires (or expiry is not tracked).
    pub shelf_life_days: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::unit_conversion::Entity")]
    UnitConversions,
    #[sea_orm(has_many = "super::recipe::Entity")]
    Recipes,
    #[sea_orm(has_many = "super::inventory_lot::Entity")]
    InventoryLots,
}

impl Related<super::unit_conversion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UnitConversions.def()
    }
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipes.def()
    }
}

impl Related<super::inventory_lot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryLots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Ingredient,
    Product,
}

impl Model {
    /// Expiration timestamp for stock of this item entering the ledger at
    /// `now`; None when the item carries no shelf life.
    pub fn expiration_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.shelf_life_days
            .map(|days| now + Duration::days(days as i64))
    }

    pub fn is_ingredient(&self) -> bool {
        self.item_type == ItemType::Ingredient.as_ref()
    }

    pub fn is_product(&self) -> bool {
        self.item_type == ItemType::Product.as_ref()
    }
}
