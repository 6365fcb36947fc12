use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// A UNIQUE, NOT NULL or FOREIGN KEY constraint rejected the write.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Any other SQLite failure.
    #[error("Database error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

impl DbError {
    pub fn is_integrity(&self) -> bool {
        matches!(self, DbError::Integrity(_))
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, msg)
                if inner.code == ErrorCode::ConstraintViolation =>
            {
                DbError::Integrity(msg.clone().unwrap_or_else(|| inner.to_string()))
            }
            _ => DbError::Sqlite(err),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DbError>;
