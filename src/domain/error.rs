use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Parking lot {0} has no free slot")]
    LotFull(String),

    #[error("Vehicle {0} already has an active session")]
    AlreadyParked(String),

    #[error("No active session for {0}")]
    NoActiveSession(String),

    #[error("Insufficient wallet balance")]
    InsufficientFunds,

    #[error("Database error: {0}")]
    Database(String),
}

impl DomainError {
    /// Business denials are expected outcomes (already parked, lot full,
    /// empty wallet); they must never surface as 500s.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            DomainError::LotFull(_)
                | DomainError::AlreadyParked(_)
                | DomainError::NoActiveSession(_)
                | DomainError::InsufficientFunds
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
