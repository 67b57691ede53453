use sea_orm::error::DbErr;
use thiserror::Error;

/// Error taxonomy for the engine.
///
/// Insufficient stock during a production check is deliberately NOT an error:
/// it is a reported outcome (see `services::production::ProductionOutcome`)
/// so the caller can resubmit with `force`. Everything here is either a bad
/// request (`ValidationError`, `InvalidInput`, `NotFound`, `InvalidOperation`,
/// `Forbidden`) or a fatal mutation failure the caller must not treat as
/// partial success (`DatabaseError`).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl ServiceError {
    /// Helper to convert database errors consistently
    pub fn db_error(err: DbErr) -> Self {
        ServiceError::DatabaseError(err)
    }
}
