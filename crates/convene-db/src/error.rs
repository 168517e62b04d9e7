//! Database-specific error types and conversions.

use convene_core::error::CoreError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with key {key}")]
    NotFound { entity: String, key: String },

    #[error("Unique index violated: {entity} with key {key}")]
    UniqueViolation { entity: String, key: String },
}

impl DbError {
    /// Classify a statement error from a write, turning a duplicate
    /// index entry into [`DbError::UniqueViolation`] so the service
    /// layer surfaces it as `AlreadyExists`. The index is the final
    /// backstop behind the services' optimistic existence checks.
    pub fn on_write(err: surrealdb::Error, entity: &str, key: impl ToString) -> DbError {
        if err.to_string().contains("already contains") {
            DbError::UniqueViolation {
                entity: entity.into(),
                key: key.to_string(),
            }
        } else {
            DbError::Surreal(err)
        }
    }
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, key } => CoreError::NotFound { entity, key },
            DbError::UniqueViolation { entity, key } => CoreError::AlreadyExists { entity, key },
            other => CoreError::Database(other.to_string()),
        }
    }
}
