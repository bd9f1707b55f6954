//! Error types for the database layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("database migration error: {0}")]
    Migration(String),

    #[error("database query error: {0}")]
    Query(#[from] sqlx::Error),
}

impl DatabaseError {
    /// True when the underlying driver rejected the statement because a
    /// uniqueness constraint would have been violated.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::Query(sqlx::Error::Database(err)) => err.is_unique_violation(),
            _ => false,
        }
    }
}
