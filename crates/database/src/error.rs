//! Database error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, transaction)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("no {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already stored under the same key.
    ///
    /// For reviews this is the (source id, account) uniqueness constraint;
    /// callers polling repeatedly treat it as an ordinary duplicate skip.
    #[error("{entity} {id} already stored")]
    AlreadyExists { entity: &'static str, id: String },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
