//! Configuration types for the auth service

use std::time::Duration;

use crate::crypto::SigningSecret;

/// Default `iss` claim
pub const DEFAULT_TOKEN_ISSUER: &str = "vigil.auth";

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token signing secret
    pub secret: SigningSecret,
    /// Value of the `iss` claim; tokens carrying another value are rejected
    pub token_issuer: String,
    /// Access key lifetime
    pub access_duration: Duration,
    /// Refresh key lifetime
    pub refresh_duration: Duration,
    /// Recovery key lifetime
    pub recovery_duration: Duration,
    /// Tolerated clock drift for issue times in the future
    pub clock_skew: Duration,
    /// Upper bound for every key store and policy agent call
    pub backend_timeout: Duration,
}

impl AuthConfig {
    /// Create a config with default durations.
    ///
    /// # Errors
    /// Returns [`ConfigError::EmptySecret`] for an empty secret.
    pub fn try_new(secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        Ok(Self {
            secret: SigningSecret::new(secret)?,
            token_issuer: DEFAULT_TOKEN_ISSUER.to_string(),
            access_duration: Duration::from_secs(30 * 60), // 30 minutes
            refresh_duration: Duration::from_secs(24 * 60 * 60), // 24 hours
            recovery_duration: Duration::from_secs(5 * 60), // 5 minutes
            clock_skew: Duration::from_secs(5),
            backend_timeout: Duration::from_secs(5),
        })
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through a variable lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("VIGIL_SECRET").ok_or(ConfigError::Missing("VIGIL_SECRET"))?;
        let mut config = Self::try_new(secret)?;

        if let Some(issuer) = lookup("VIGIL_TOKEN_ISSUER") {
            if issuer.trim().is_empty() {
                return Err(ConfigError::Invalid("VIGIL_TOKEN_ISSUER"));
            }
            config.token_issuer = issuer;
        }

        let secs = |name: &'static str, default: Duration, allow_zero: bool| {
            match lookup(name) {
                Some(v) => match v.parse::<u64>() {
                    Ok(0) if !allow_zero => Err(ConfigError::Invalid(name)),
                    Ok(n) => Ok(Duration::from_secs(n)),
                    Err(_) => Err(ConfigError::Invalid(name)),
                },
                None => Ok(default),
            }
        };

        // A zero lifetime would mint tokens that are expired on arrival
        config.access_duration = secs("VIGIL_ACCESS_DURATION_SECS", config.access_duration, false)?;
        config.refresh_duration =
            secs("VIGIL_REFRESH_DURATION_SECS", config.refresh_duration, false)?;
        config.recovery_duration =
            secs("VIGIL_RECOVERY_DURATION_SECS", config.recovery_duration, false)?;
        config.clock_skew = secs("VIGIL_CLOCK_SKEW_SECS", config.clock_skew, true)?;

        if let Some(v) = lookup("VIGIL_BACKEND_TIMEOUT_MS") {
            let ms: u64 = v
                .parse()
                .map_err(|_| ConfigError::Invalid("VIGIL_BACKEND_TIMEOUT_MS"))?;
            if ms == 0 {
                return Err(ConfigError::Invalid("VIGIL_BACKEND_TIMEOUT_MS"));
            }
            config.backend_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Set the `iss` claim value
    pub fn with_token_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.token_issuer = issuer.into();
        self
    }

    /// Set access key lifetime
    pub fn with_access_duration(mut self, duration: Duration) -> Self {
        self.access_duration = duration;
        self
    }

    /// Set refresh key lifetime
    pub fn with_refresh_duration(mut self, duration: Duration) -> Self {
        self.refresh_duration = duration;
        self
    }

    /// Set recovery key lifetime
    pub fn with_recovery_duration(mut self, duration: Duration) -> Self {
        self.recovery_duration = duration;
        self
    }

    /// Set clock skew tolerance
    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    /// Set backend call timeout
    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Signing secret must not be empty")]
    EmptySecret,

    #[error("Duration out of range: {0}")]
    DurationOutOfRange(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AuthConfig::try_new("a".repeat(32)).unwrap();
        assert_eq!(config.token_issuer, "vigil.auth");
        assert_eq!(config.access_duration, Duration::from_secs(1800));
        assert_eq!(config.refresh_duration, Duration::from_secs(86400));
        assert_eq!(config.recovery_duration, Duration::from_secs(300));
        assert_eq!(config.clock_skew, Duration::from_secs(5));
        assert_eq!(config.backend_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_secret() {
        let err = AuthConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("VIGIL_SECRET")));
    }

    #[test]
    fn test_empty_secret() {
        let err = AuthConfig::from_lookup(lookup_from(&[("VIGIL_SECRET", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySecret));
    }

    #[test]
    fn test_overrides() {
        let config = AuthConfig::from_lookup(lookup_from(&[
            ("VIGIL_SECRET", "s3cret"),
            ("VIGIL_TOKEN_ISSUER", "acme.auth"),
            ("VIGIL_ACCESS_DURATION_SECS", "60"),
            ("VIGIL_REFRESH_DURATION_SECS", "120"),
            ("VIGIL_RECOVERY_DURATION_SECS", "30"),
            ("VIGIL_CLOCK_SKEW_SECS", "0"),
            ("VIGIL_BACKEND_TIMEOUT_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.token_issuer, "acme.auth");
        assert_eq!(config.access_duration, Duration::from_secs(60));
        assert_eq!(config.refresh_duration, Duration::from_secs(120));
        assert_eq!(config.recovery_duration, Duration::from_secs(30));
        assert_eq!(config.clock_skew, Duration::ZERO);
        assert_eq!(config.backend_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values() {
        let err = AuthConfig::from_lookup(lookup_from(&[
            ("VIGIL_SECRET", "s3cret"),
            ("VIGIL_ACCESS_DURATION_SECS", "thirty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("VIGIL_ACCESS_DURATION_SECS")));

        let err = AuthConfig::from_lookup(lookup_from(&[
            ("VIGIL_SECRET", "s3cret"),
            ("VIGIL_BACKEND_TIMEOUT_MS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("VIGIL_BACKEND_TIMEOUT_MS")));
    }

    #[test]
    fn test_zero_lifetimes_rejected() {
        for name in [
            "VIGIL_ACCESS_DURATION_SECS",
            "VIGIL_REFRESH_DURATION_SECS",
            "VIGIL_RECOVERY_DURATION_SECS",
        ] {
            let err = AuthConfig::from_lookup(lookup_from(&[("VIGIL_SECRET", "s3cret"), (name, "0")]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid(n) if n == name),
                "{name}: {err:?}"
            );
        }

        // Zero skew means no tolerance, which is valid
        let config = AuthConfig::from_lookup(lookup_from(&[
            ("VIGIL_SECRET", "s3cret"),
            ("VIGIL_CLOCK_SKEW_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.clock_skew, Duration::ZERO);
    }
}
