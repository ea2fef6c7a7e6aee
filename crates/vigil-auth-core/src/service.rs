//! Auth service - ties together the token codec, the key store and the
//! authorization gateway

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};
use vigil_db::KeyRepository;
use vigil_policy::{AuthzGateway, PolicyAgent};
use vigil_types::{Key, KeyType, Persistence, PolicyRequest, Token};

use crate::{
    config::{AuthConfig, ConfigError},
    crypto::token_fingerprint,
    token::KeyCodec,
    AuthError, AuthResult, AuthenticationFailure,
};

/// Authentication and authorization service
///
/// Provides unified interface for:
/// - Issuing login pairs, API keys and recovery keys
/// - Identifying the subject behind a token
/// - Revoking persisted keys
/// - Authorization checks against the policy agent
pub struct AuthService<K: KeyRepository, P: PolicyAgent> {
    codec: KeyCodec,
    keys: Arc<K>,
    authz: AuthzGateway<P>,
    access_duration: ChronoDuration,
    refresh_duration: ChronoDuration,
    recovery_duration: ChronoDuration,
    clock_skew: ChronoDuration,
    backend_timeout: Duration,
}

impl<K: KeyRepository, P: PolicyAgent> AuthService<K, P> {
    /// Create a new auth service
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] if a configured duration cannot be
    /// represented.
    pub fn new(config: AuthConfig, keys: Arc<K>, agent: Arc<P>) -> AuthResult<Self> {
        Ok(Self {
            codec: KeyCodec::new(&config.secret, config.token_issuer.clone()),
            keys,
            authz: AuthzGateway::from_arc(agent),
            access_duration: to_chrono(config.access_duration, "access_duration")?,
            refresh_duration: to_chrono(config.refresh_duration, "refresh_duration")?,
            recovery_duration: to_chrono(config.recovery_duration, "recovery_duration")?,
            clock_skew: to_chrono(config.clock_skew, "clock_skew")?,
            backend_timeout: config.backend_timeout,
        })
    }

    /// Token codec used by this service
    pub fn codec(&self) -> &KeyCodec {
        &self.codec
    }

    // =========================================================================
    // Issuance
    // =========================================================================

    /// Issue a token for the requested key
    ///
    /// - `Access`: login; the caller token is not consulted
    /// - `Refresh`: the caller token must be a live refresh key for the same subject
    /// - `Api` / `Recovery`: the caller token must be a live access key; the
    ///   caller becomes the issuer, and issuing for another subject requires
    ///   platform admin rights
    #[instrument(skip(self, caller_token, key), fields(key_type = %key.key_type))]
    pub async fn issue(&self, caller_token: &str, key: Key) -> AuthResult<Token> {
        self.validate_request(&key, Utc::now())?;

        match key.key_type {
            KeyType::Access => self.login_pair(&key.subject, key.issued_at),
            KeyType::Refresh => {
                let caller = self.caller(caller_token, KeyType::Refresh)?;
                if caller.subject != key.subject {
                    debug!("Refresh token subject does not match request");
                    return Err(AuthenticationFailure::SubjectMismatch.into());
                }
                self.login_pair(&key.subject, key.issued_at)
            }
            KeyType::Api | KeyType::Recovery => self.issue_persisted(caller_token, key).await,
        }
    }

    /// Exchange a live refresh token for a fresh login pair
    #[instrument(skip_all, fields(token = %token_fingerprint(refresh_token)))]
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<Token> {
        let caller = self.caller(refresh_token, KeyType::Refresh)?;
        self.login_pair(&caller.subject, Utc::now())
    }

    async fn issue_persisted(&self, caller_token: &str, key: Key) -> AuthResult<Token> {
        let caller = self.caller(caller_token, KeyType::Access)?;

        if caller.subject != key.subject {
            debug!("Issuing on behalf of another subject, checking admin rights");
            self.bounded("check_admin", self.authz.check_admin(&caller.subject))
                .await?;
        }

        let expires_at = match key.key_type {
            KeyType::Recovery => Some(expiry(key.issued_at, self.recovery_duration)?),
            _ => key.expires_at,
        };
        let mut record = Key {
            id: None,
            issuer: caller.subject,
            expires_at,
            ..key
        };

        let id = self.bounded("save key", self.keys.save(&record)).await?;
        record.id = Some(id.clone());

        match self.codec.encode(&record) {
            Ok(token) => {
                debug!(key_id = %id, "Persisted key issued");
                Ok(Token::persisted(token, id))
            }
            Err(e) => {
                error!(key_id = %id, error = %e, "Failed to encode persisted key");
                if let Err(cleanup) = self
                    .bounded("remove key", self.keys.remove(&record.issuer, &id))
                    .await
                {
                    warn!(key_id = %id, error = %cleanup, "Failed to remove unusable key");
                }
                Err(e.into())
            }
        }
    }

    fn login_pair(&self, subject: &str, issued_at: DateTime<Utc>) -> AuthResult<Token> {
        let access = Key::new(KeyType::Access, subject, issued_at)
            .with_expires_at(Some(expiry(issued_at, self.access_duration)?));
        let refresh = Key::new(KeyType::Refresh, subject, issued_at)
            .with_expires_at(Some(expiry(issued_at, self.refresh_duration)?));

        Ok(Token::pair(
            self.codec.encode(&access)?,
            self.codec.encode(&refresh)?,
        ))
    }

    // =========================================================================
    // Key Management
    // =========================================================================

    /// Retrieve a persisted key issued by the caller
    #[instrument(skip(self, caller_token))]
    pub async fn retrieve_key(&self, caller_token: &str, id: &str) -> AuthResult<Key> {
        let caller = self.caller(caller_token, KeyType::Access)?;
        self.bounded("retrieve key", self.keys.retrieve(&caller.subject, id))
            .await
    }

    /// Revoke a persisted key issued by the caller; revoking twice succeeds
    #[instrument(skip(self, caller_token))]
    pub async fn revoke(&self, caller_token: &str, id: &str) -> AuthResult<()> {
        let caller = self.caller(caller_token, KeyType::Access)?;
        self.bounded("remove key", self.keys.remove(&caller.subject, id))
            .await?;
        debug!(key_id = %id, "Key revoked");
        Ok(())
    }

    // =========================================================================
    // Identification
    // =========================================================================

    /// Resolve the subject behind a token
    ///
    /// Refresh tokens cannot identify. Persisted key types must still be
    /// present in the key store.
    #[instrument(skip_all, fields(token = %token_fingerprint(token)))]
    pub async fn identify(&self, token: &str) -> AuthResult<String> {
        let key = self.decode(token)?;
        check_validity(&key, Utc::now(), self.clock_skew)?;

        if key.key_type == KeyType::Refresh {
            debug!("Refresh token presented for identification");
            return Err(AuthenticationFailure::WrongKeyType.into());
        }

        match key.key_type.persistence() {
            Persistence::Stateless => Ok(key.subject),
            Persistence::Persisted => {
                let id = key
                    .id
                    .as_deref()
                    .ok_or(AuthError::Authentication(AuthenticationFailure::Malformed))?;

                match self
                    .bounded("retrieve key", self.keys.retrieve(&key.issuer, id))
                    .await
                {
                    Ok(stored)
                        if stored.subject == key.subject && stored.key_type == key.key_type =>
                    {
                        Ok(key.subject)
                    }
                    Ok(_) | Err(AuthError::NotFound) => {
                        debug!(key_id = %id, "Key is no longer in the store");
                        Err(AuthenticationFailure::Revoked.into())
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    // =========================================================================
    // Authorization
    // =========================================================================

    /// Succeeds only when the policy agent allows the request
    #[instrument(skip(self), fields(request = %request))]
    pub async fn authorize(&self, request: &PolicyRequest) -> AuthResult<()> {
        self.bounded("authorize", self.authz.authorize(request))
            .await
    }

    /// Store a relation tuple
    pub async fn add_policy(&self, request: &PolicyRequest) -> AuthResult<()> {
        self.bounded("add policy", self.authz.add_policy(request))
            .await
    }

    /// Delete a relation tuple
    pub async fn delete_policy(&self, request: &PolicyRequest) -> AuthResult<()> {
        self.bounded("delete policy", self.authz.delete_policy(request))
            .await
    }

    /// Objects on which `subject` holds `relation`
    pub async fn list_objects(&self, subject: &str, relation: &str) -> AuthResult<Vec<String>> {
        self.bounded("list objects", self.authz.list_objects(subject, relation))
            .await
    }

    /// Subjects holding `relation` on `object`
    pub async fn list_subjects(&self, object: &str, relation: &str) -> AuthResult<Vec<String>> {
        self.bounded("list subjects", self.authz.list_subjects(object, relation))
            .await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn validate_request(&self, key: &Key, now: DateTime<Utc>) -> AuthResult<()> {
        if key.subject.is_empty() {
            return Err(AuthError::MalformedEntity("missing subject".to_string()));
        }
        if !key.has_issued_at() {
            return Err(AuthError::MalformedEntity("missing issue time".to_string()));
        }
        if key.issued_at > now + self.clock_skew {
            return Err(AuthError::MalformedEntity(
                "issue time is in the future".to_string(),
            ));
        }
        if key.key_type == KeyType::Api {
            if let Some(expires_at) = key.expires_at {
                if expires_at <= key.issued_at {
                    return Err(AuthError::MalformedEntity(
                        "expiration must be after issue time".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    fn decode(&self, token: &str) -> AuthResult<Key> {
        if token.is_empty() {
            return Err(AuthenticationFailure::MissingToken.into());
        }
        self.codec.decode(token).map_err(|e| {
            debug!(token = %token_fingerprint(token), error = %e, "Token rejected");
            AuthError::from(e)
        })
    }

    /// Decode a caller token that must be a live key of the given type
    fn caller(&self, token: &str, expected: KeyType) -> AuthResult<Key> {
        let key = self.decode(token)?;
        check_validity(&key, Utc::now(), self.clock_skew)?;
        if key.key_type != expected {
            debug!(
                expected = %expected,
                actual = %key.key_type,
                "Caller token has the wrong key type"
            );
            return Err(AuthenticationFailure::WrongKeyType.into());
        }
        Ok(key)
    }

    /// Run a key store or policy agent call under the backend timeout
    async fn bounded<T, E, F>(&self, op: &'static str, fut: F) -> AuthResult<T>
    where
        F: Future<Output = Result<T, E>>,
        AuthError: From<E>,
    {
        match tokio::time::timeout(self.backend_timeout, fut).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_) => {
                warn!(
                    op,
                    timeout_ms = self.backend_timeout.as_millis() as u64,
                    "Backend call timed out"
                );
                Err(AuthError::Unavailable(format!("{op} timed out")))
            }
        }
    }
}

/// Issue-time and expiry checks, in that order
fn check_validity(key: &Key, now: DateTime<Utc>, skew: ChronoDuration) -> AuthResult<()> {
    if key.issued_at > now + skew {
        debug!("Token issued in the future");
        return Err(AuthenticationFailure::IssuedInFuture.into());
    }
    if key.is_expired_at(now) {
        debug!("Token expired");
        return Err(AuthenticationFailure::Expired.into());
    }
    Ok(())
}

fn expiry(issued_at: DateTime<Utc>, duration: ChronoDuration) -> AuthResult<DateTime<Utc>> {
    issued_at
        .checked_add_signed(duration)
        .ok_or_else(|| AuthError::MalformedEntity("expiration out of range".to_string()))
}

fn to_chrono(duration: Duration, name: &'static str) -> AuthResult<ChronoDuration> {
    ChronoDuration::from_std(duration)
        .map_err(|_| ConfigError::DurationOutOfRange(name).into())
}

impl<K: KeyRepository, P: PolicyAgent> std::fmt::Debug for AuthService<K, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("codec", &self.codec)
            .field("access_duration", &self.access_duration)
            .field("refresh_duration", &self.refresh_duration)
            .field("recovery_duration", &self.recovery_duration)
            .field("backend_timeout", &self.backend_timeout)
            .finish_non_exhaustive()
    }
}
