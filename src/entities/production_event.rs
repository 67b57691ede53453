use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable log row, one per production run. Written only after the run's
/// deduction and output succeed; a failed availability check leaves no row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "production_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub production_id: i64,
    pub transaction_id: Uuid,
    pub store_id: i64,
    pub recipe_id: i64,
    pub quantity_made: f64,
    /// Unit the operator logged in, e.g. "Tins" or "batches".
    pub unit_type: String,
    /// Null means consumption only (waste, rework): no output lot.
    pub target_location_id: Option<i64>,
    pub produced_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recipe::Entity",
        from = "Column::RecipeId",
        to = "super::recipe::Column::RecipeId"
    )]
    Recipe,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
