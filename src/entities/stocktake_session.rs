use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// A counting session for one store. Created PENDING; finalization moves it
/// to COMPLETED (terminal), cancellation to CANCELLED (terminal, no ledger
/// effect). Records are frozen once the session completes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stocktake_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub session_id: i64,
    pub store_id: i64,
    pub status: String,
    pub session_type: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stocktake_record::Entity")]
    Records,
}

impl Related<super::stocktake_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Pending,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    /// Physical count that corrects the ledger and yields variance/usage.
    Full,
    /// Counted quantities are newly delivered stock; existing lots untouched.
    Addition,
}

impl Model {
    pub fn is_pending(&self) -> bool {
        self.status == SessionStatus::Pending.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed.as_ref()
    }

    pub fn is_addition(&self) -> bool {
        self.session_type == SessionType::Addition.as_ref()
    }
}
