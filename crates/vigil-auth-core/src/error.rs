//! Auth errors

use thiserror::Error;
use vigil_db::DbError;
use vigil_policy::PolicyError;

use crate::config::ConfigError;
use crate::token::{DecodeError, EncodeError};

/// Why a credential was not accepted
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationFailure {
    #[error("missing token")]
    MissingToken,
    #[error("bad signature")]
    BadSignature,
    #[error("malformed token")]
    Malformed,
    #[error("token expired")]
    Expired,
    #[error("token issued in the future")]
    IssuedInFuture,
    #[error("key revoked")]
    Revoked,
    #[error("wrong key type")]
    WrongKeyType,
    #[error("subject mismatch")]
    SubjectMismatch,
}

/// Auth errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Credential missing, invalid, expired or revoked
    #[error("authentication failed: {0}")]
    Authentication(AuthenticationFailure),

    /// Policy agent explicitly denied the request
    #[error("unauthorized access")]
    Authorization,

    /// Invalid issuance request
    #[error("malformed entity: {0}")]
    MalformedEntity(String),

    /// Key absent or owned by another issuer
    #[error("key not found")]
    NotFound,

    /// Key with the same id already exists
    #[error("key already exists")]
    Conflict,

    /// Key store or policy agent unreachable or timed out
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Authentication(_) => 401,
            Self::Authorization => 403,
            Self::MalformedEntity(_) => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Unavailable(_) => 503,
            Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Authentication(AuthenticationFailure::Expired) => "TOKEN_EXPIRED",
            Self::Authentication(AuthenticationFailure::Revoked) => "KEY_REVOKED",
            Self::Authentication(AuthenticationFailure::MissingToken) => "MISSING_TOKEN",
            Self::Authentication(_) => "INVALID_TOKEN",
            Self::Authorization => "UNAUTHORIZED",
            Self::MalformedEntity(_) => "MALFORMED_ENTITY",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller may retry the operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Authentication failure reason, if any
    pub fn authentication_failure(&self) -> Option<AuthenticationFailure> {
        match self {
            Self::Authentication(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<AuthenticationFailure> for AuthError {
    fn from(reason: AuthenticationFailure) -> Self {
        Self::Authentication(reason)
    }
}

impl From<DecodeError> for AuthError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::BadSignature => Self::Authentication(AuthenticationFailure::BadSignature),
            DecodeError::Malformed(_) => Self::Authentication(AuthenticationFailure::Malformed),
        }
    }
}

impl From<EncodeError> for AuthError {
    fn from(err: EncodeError) -> Self {
        tracing::error!("Token encoding error: {}", err);
        Self::Internal(err.to_string())
    }
}

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => Self::NotFound,
            DbError::Conflict => Self::Conflict,
            DbError::MalformedEntity(msg) => Self::MalformedEntity(msg),
            DbError::Unavailable(msg) => {
                tracing::warn!("Key store unavailable: {}", msg);
                Self::Unavailable(msg)
            }
            DbError::Sqlx(e) => {
                tracing::error!("Database error: {}", e);
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<PolicyError> for AuthError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Denied => Self::Authorization,
            PolicyError::Unavailable(msg) => Self::Unavailable(msg),
            PolicyError::InvalidRequest(msg) => Self::MalformedEntity(msg),
            PolicyError::Internal(msg) => {
                tracing::error!("Policy agent error: {}", msg);
                Self::Internal(msg)
            }
        }
    }
}

impl From<ConfigError> for AuthError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Result alias for auth operations
pub type AuthResult<T> = Result<T, AuthError>;
