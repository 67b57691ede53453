use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::errors::ServiceError;

/// Caller role, resolved by the surrounding auth layer before the engine is
/// invoked. Admins operate across stores; everyone else is pinned to the
/// store in their context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Staff,
}

/// Explicit access context passed into every engine call.
///
/// Visibility is a pure function of this value; the engine holds no global
/// user state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessContext {
    pub store_id: i64,
    pub role: Role,
}

impl AccessContext {
    pub fn new(store_id: i64, role: Role) -> Self {
        Self { store_id, role }
    }

    pub fn can_access_store(&self, store_id: i64) -> bool {
        self.role == Role::Admin || self.store_id == store_id
    }

    pub fn ensure_store(&self, store_id: i64) -> Result<(), ServiceError> {
        if self.can_access_store(store_id) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "store {} is outside this caller's scope",
                store_id
            )))
        }
    }

    /// Stocktake finalization/cancellation and expired-stock disposal rewrite
    /// or destroy ledger rows and are restricted to Manager and above.
    pub fn ensure_manager(&self) -> Result<(), ServiceError> {
        match self.role {
            Role::Admin | Role::Manager => Ok(()),
            Role::Staff => Err(ServiceError::Forbidden(
                "operation requires manager role".to_string(),
            )),
        }
    }
}
