//! Token types

use serde::{Deserialize, Serialize};

/// Access scheme advertised for every issued token
pub const BEARER: &str = "Bearer";

/// Externally visible credential derived from a [`Key`](crate::Key)
///
/// Tokens are never persisted; their authority comes from the signature and,
/// for persisted key types, from the backing key store record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Signed encoding of the key
    pub access_token: String,
    /// Signed encoding of the companion refresh key (login pairs only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Access scheme label
    pub access_type: String,
    /// Id of the persisted key behind `access_token`, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
}

impl Token {
    /// Token for a login pair
    pub fn pair(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token: Some(refresh_token),
            access_type: BEARER.to_string(),
            key_id: None,
        }
    }

    /// Token for a persisted key
    pub fn persisted(access_token: String, key_id: String) -> Self {
        Self {
            access_token,
            refresh_token: None,
            access_type: BEARER.to_string(),
            key_id: Some(key_id),
        }
    }
}
