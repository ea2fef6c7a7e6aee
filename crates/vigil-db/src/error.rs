//! Database errors

use thiserror::Error;

// PostgreSQL error codes:
// https://www.postgresql.org/docs/current/errcodes-appendix.html
const UNIQUE_VIOLATION: &str = "23505";
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Record not found (or not visible to the requesting issuer)
    #[error("record not found")]
    NotFound,

    /// Record with the same id already exists
    #[error("record already exists")]
    Conflict,

    /// Input rejected by the storage layer
    #[error("malformed entity: {0}")]
    MalformedEntity(String),

    /// Storage backend cannot be reached
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
}

impl DbError {
    /// Whether the caller may retry the operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|code| code.into_owned());
                match code.as_deref() {
                    Some(UNIQUE_VIOLATION) => Self::Conflict,
                    Some(STRING_DATA_RIGHT_TRUNCATION | INVALID_TEXT_REPRESENTATION) => {
                        Self::MalformedEntity(db_err.message().to_string())
                    }
                    _ => Self::Sqlx(sqlx::Error::Database(db_err)),
                }
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Unavailable(err.to_string()),
            other => Self::Sqlx(other),
        }
    }
}

/// Result alias for repository operations
pub type DbResult<T> = Result<T, DbError>;
