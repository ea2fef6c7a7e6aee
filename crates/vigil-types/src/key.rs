//! Key types
//!
//! A [`Key`] is the canonical credential record. Its [`KeyType`] decides whether
//! the key lives in the key store ([`Persistence::Persisted`]) or is validated
//! purely from its signed claims ([`Persistence::Stateless`]).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::TypesError;

/// Credential kind
///
/// The discriminants are part of the wire contract (token `type` claim and the
/// `key_type` column) and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
#[repr(u32)]
pub enum KeyType {
    /// Short-lived login key
    Access = 0,
    /// Login companion key, exchanged for a new access key
    Refresh = 1,
    /// Key for resetting a password
    Recovery = 2,
    /// Long-lived key acting on behalf of a subject
    Api = 3,
}

/// Whether a key type is backed by a key store record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Validated from signature and claims only; cannot be revoked before expiry
    Stateless,
    /// Backed by a key store record; revocable
    Persisted,
}

impl KeyType {
    /// All key types, in ordinal order
    pub const ALL: [KeyType; 4] = [Self::Access, Self::Refresh, Self::Recovery, Self::Api];

    /// Storage class of this key type
    pub const fn persistence(self) -> Persistence {
        match self {
            Self::Access | Self::Refresh => Persistence::Stateless,
            Self::Recovery | Self::Api => Persistence::Persisted,
        }
    }

    /// Wire ordinal
    pub const fn ordinal(self) -> u32 {
        self as u32
    }

    /// Get the string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
            Self::Recovery => "recovery",
            Self::Api => "API",
        }
    }
}

impl From<KeyType> for u32 {
    fn from(kt: KeyType) -> Self {
        kt.ordinal()
    }
}

impl TryFrom<u32> for KeyType {
    type Error = TypesError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Access),
            1 => Ok(Self::Refresh),
            2 => Ok(Self::Recovery),
            3 => Ok(Self::Api),
            other => Err(TypesError::UnknownKeyType(other)),
        }
    }
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KeyType {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "access" => Ok(Self::Access),
            "refresh" => Ok(Self::Refresh),
            "recovery" => Ok(Self::Recovery),
            "api" => Ok(Self::Api),
            _ => Err(TypesError::InvalidKeyType(s.to_string())),
        }
    }
}

/// Credential record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Opaque identifier, assigned by the key store for persisted key types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Key kind
    #[serde(rename = "type")]
    pub key_type: KeyType,
    /// Entity that authorized issuance (empty for login keys)
    #[serde(default)]
    pub issuer: String,
    /// Principal the key asserts identity for
    pub subject: String,
    /// Issue time
    pub issued_at: DateTime<Utc>,
    /// Expiration time; `None` means no expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Key {
    /// Create a key request of the given type for a subject
    pub fn new(key_type: KeyType, subject: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            key_type,
            issuer: String::new(),
            subject: subject.into(),
            issued_at,
            expires_at: None,
        }
    }

    /// Set the issuer
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Set the id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Expire the key `duration` after its issue time
    pub fn valid_for(mut self, duration: Duration) -> Self {
        self.expires_at = Some(self.issued_at + duration);
        self
    }

    /// Set an absolute expiration time
    pub fn with_expires_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// Whether the issue time was set (the Unix epoch counts as unset)
    pub fn has_issued_at(&self) -> bool {
        self.issued_at != DateTime::<Utc>::UNIX_EPOCH
    }

    /// Check expiry against the given instant
    ///
    /// An API key without an expiration never expires. Every other key type
    /// without an expiration is treated as already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match (self.key_type, self.expires_at) {
            (KeyType::Api, None) => false,
            (_, None) => true,
            (_, Some(expires_at)) => now >= expires_at,
        }
    }

    /// Check expiry against the current time
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl Default for Key {
    fn default() -> Self {
        Self::new(KeyType::Access, String::new(), DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} key {} (subject {}, issuer {})",
            self.key_type,
            self.id.as_deref().unwrap_or("-"),
            self.subject,
            if self.issuer.is_empty() { "-" } else { self.issuer.as_str() },
        )
    }
}
