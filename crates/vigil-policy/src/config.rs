//! Policy agent configuration

use std::time::Duration;

/// Default per-request timeout for the policy agent
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP policy agent configuration
#[derive(Clone)]
pub struct PolicyConfig {
    /// Base URL of the policy agent, without trailing slash
    pub base_url: String,
    /// Optional bearer token sent with every request
    pub bearer_token: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl PolicyConfig {
    /// Create a new policy config
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set the bearer token
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Full URL for an endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl std::fmt::Debug for PolicyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyConfig")
            .field("base_url", &self.base_url)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = PolicyConfig::new("http://policy:8080/");
        assert_eq!(
            config.endpoint("/v1/permissions/check"),
            "http://policy:8080/v1/permissions/check"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = PolicyConfig::new("http://policy").with_bearer_token("s3cret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("REDACTED"));
    }
}
