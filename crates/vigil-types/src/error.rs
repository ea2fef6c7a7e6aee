//! Common error types

use thiserror::Error;

/// Errors raised while parsing or converting shared types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// Key type ordinal outside the known range
    #[error("unknown key type ordinal: {0}")]
    UnknownKeyType(u32),

    /// Key type name not recognized
    #[error("invalid key type: {0}")]
    InvalidKeyType(String),
}
