//! Token codec
//!
//! Encodes a [`Key`] as an HS256-signed JWT and verifies it back. The codec is
//! synchronous, does no I/O and does not enforce expiry; those checks belong
//! to the service.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vigil_types::{Key, KeyType};

use crate::crypto::{constant_time_str_eq, SigningSecret};

/// Token decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Signature mismatch or a signing algorithm other than HS256
    #[error("bad token signature")]
    BadSignature,

    /// Structurally invalid token or claims
    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Token encoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Signed claim set
#[derive(Debug, Serialize, Deserialize)]
struct KeyClaims {
    iss: String,
    sub: String,
    #[serde(rename = "type")]
    key_type: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    issuer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
    iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

/// HS256 token codec
#[derive(Clone)]
pub struct KeyCodec {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl KeyCodec {
    /// Create a codec for the given secret and `iss` claim value
    pub fn new(secret: &SigningSecret, issuer: impl Into<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is a read-time predicate owned by the service
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["iss", "sub"]);

        Self {
            issuer: issuer.into(),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Value written to and required in the `iss` claim
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Encode a key as a signed token
    pub fn encode(&self, key: &Key) -> Result<String, EncodeError> {
        let claims = KeyClaims {
            iss: self.issuer.clone(),
            sub: key.subject.clone(),
            key_type: key.key_type.ordinal(),
            issuer_id: key.issuer.clone(),
            jti: key.id.clone(),
            iat: key.issued_at.timestamp(),
            exp: key.expires_at.map(|t| t.timestamp()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| EncodeError::Signing(e.to_string()))
    }

    /// Verify a token and rebuild its key
    ///
    /// The signature is checked before any claim is interpreted, so a tampered
    /// token is always [`DecodeError::BadSignature`].
    pub fn decode(&self, token: &str) -> Result<Key, DecodeError> {
        let data = decode::<KeyClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    DecodeError::BadSignature
                }
                _ => DecodeError::Malformed(e.to_string()),
            },
        )?;
        let claims = data.claims;

        if !constant_time_str_eq(&claims.iss, &self.issuer) {
            return Err(DecodeError::Malformed("foreign issuer".to_string()));
        }
        if claims.sub.is_empty() {
            return Err(DecodeError::Malformed("empty subject".to_string()));
        }

        let key_type = KeyType::try_from(claims.key_type)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
        let issued_at = timestamp(claims.iat, "iat")?;
        let expires_at = claims.exp.map(|exp| timestamp(exp, "exp")).transpose()?;

        Ok(Key {
            id: claims.jti.filter(|id| !id.is_empty()),
            key_type,
            issuer: claims.issuer_id,
            subject: claims.sub,
            issued_at,
            expires_at,
        })
    }
}

fn timestamp(secs: i64, claim: &str) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DecodeError::Malformed(format!("{claim} out of range")))
}

impl std::fmt::Debug for KeyCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCodec")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}
