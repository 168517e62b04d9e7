//! Error types for the Convene system.
//!
//! The calling layer maps kinds onto HTTP classes: `InvalidArgument` →
//! 400, `NotFound` → 404, `AlreadyExists` and `Conflict` → 409,
//! `Forbidden` → 403, everything else → 500.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or missing required input.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A referenced entity or composite key does not exist.
    #[error("Entity not found: {entity} with key {key}")]
    NotFound { entity: String, key: String },

    /// A uniqueness invariant was violated (name, composite key pair).
    #[error("Entity already exists: {entity} with key {key}")]
    AlreadyExists { entity: String, key: String },

    /// A scheduling-interval overlap was detected.
    #[error("Scheduling conflict: {message}")]
    Conflict { message: String },

    /// The acting user is not authorized for the requested mutation.
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CoreError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, key: impl ToString) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            key: key.to_string(),
        }
    }

    pub fn already_exists(entity: impl Into<String>, key: impl ToString) -> Self {
        CoreError::AlreadyExists {
            entity: entity.into(),
            key: key.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CoreError::Conflict {
            message: message.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        CoreError::Forbidden {
            reason: reason.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
