//! Database-specific error types and conversions.

use unigate_core::error::UnigateError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid stored value: {0}")]
    Corrupt(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for UnigateError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => UnigateError::NotFound { entity, id },
            other => UnigateError::Database(other.to_string()),
        }
    }
}
