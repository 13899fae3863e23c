//! Database error types

use agentmart_types::{Classify, ErrorKind};
use thiserror::Error;

/// Catalog store errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A known uniqueness guard rejected the write
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Any other constraint violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DbError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DbError::Duplicate(_))
    }
}

impl Classify for DbError {
    fn kind(&self) -> ErrorKind {
        match self {
            DbError::NotFound(_) => ErrorKind::NotFound,
            DbError::Duplicate(_) => ErrorKind::Conflict,
            DbError::InvalidInput(_) => ErrorKind::Validation,
            _ => ErrorKind::Store,
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::Serialization(e.to_string())
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Map a failed write, recognising only the named unique constraint as a
/// duplicate. Other unique violations stay generic constraint errors.
pub(crate) fn map_unique_violation(err: sqlx::Error, constraint: &str, message: impl FnOnce() -> String) -> DbError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.constraint() == Some(constraint) {
            return DbError::Duplicate(message());
        }
        if db_err.is_unique_violation() {
            return DbError::Constraint(db_err.message().to_string());
        }
    }
    DbError::Query(err)
}
