use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One counted (item, location) pair within a session. Re-submitting the
/// same pair overwrites this row while the session is PENDING.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stocktake_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub record_id: i64,
    pub session_id: i64,
    pub item_id: i64,
    pub location_id: i64,
    /// Base units.
    pub quantity_counted: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stocktake_session::Entity",
        from = "Column::SessionId",
        to = "super::stocktake_session::Column::SessionId"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::ItemId"
    )]
    Item,
}

impl Related<super::stocktake_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
