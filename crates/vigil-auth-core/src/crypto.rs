//! Cryptographic utilities
//!
//! The signing secret and the helpers that must not leak timing or token
//! material.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::config::ConfigError;

/// Process-wide token signing secret.
///
/// Built once at startup and never mutated. Rotation is a restart.
#[derive(Clone)]
pub struct SigningSecret {
    bytes: Arc<[u8]>,
}

impl SigningSecret {
    /// Recommended minimum secret length in bytes (256 bits)
    pub const RECOMMENDED_LENGTH: usize = 32;

    /// Create a signing secret from bytes.
    ///
    /// # Errors
    /// Returns [`ConfigError::EmptySecret`] if the secret is empty. Secrets
    /// shorter than [`Self::RECOMMENDED_LENGTH`] are accepted with a warning.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let bytes = secret.as_ref();
        if bytes.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if bytes.len() < Self::RECOMMENDED_LENGTH {
            tracing::warn!(
                length = bytes.len(),
                recommended = Self::RECOMMENDED_LENGTH,
                "Signing secret is shorter than recommended"
            );
        }
        Ok(Self {
            bytes: Arc::from(bytes),
        })
    }

    /// Raw secret bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Secret length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; an empty secret cannot be constructed
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningSecret")
            .field("length", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

/// Constant-time string comparison.
///
/// Length is not treated as secret.
#[inline]
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Short, log-safe fingerprint of a token.
///
/// First 16 hex chars of the SHA-256 digest. The token cannot be recovered
/// from it, but the same token always yields the same fingerprint.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut fp = hex::encode(digest);
    fp.truncate(16);
    fp
}
