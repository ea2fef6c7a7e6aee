//! HTTP policy agent
//!
//! JSON-over-HTTP client for the external relationship-based policy engine.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error, instrument};
use vigil_types::PolicyRequest;

use crate::{PolicyAgent, PolicyConfig, PolicyError, PolicyResult};

const CHECK_PATH: &str = "/v1/permissions/check";
const WRITE_PATH: &str = "/v1/relationships/write";
const DELETE_PATH: &str = "/v1/relationships/delete";
const LOOKUP_SUBJECTS_PATH: &str = "/v1/subjects/lookup";
const LOOKUP_OBJECTS_PATH: &str = "/v1/objects/lookup";

/// HTTP policy agent
#[derive(Clone)]
pub struct HttpPolicyAgent {
    client: Client,
    config: PolicyConfig,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    allowed: bool,
}

#[derive(Debug, Serialize)]
struct LookupSubjectsRequest<'a> {
    object: &'a str,
    relation: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupSubjectsResponse {
    #[serde(default)]
    subjects: Vec<String>,
}

#[derive(Debug, Serialize)]
struct LookupObjectsRequest<'a> {
    subject: &'a str,
    relation: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupObjectsResponse {
    #[serde(default)]
    objects: Vec<String>,
}

impl HttpPolicyAgent {
    /// Create a new HTTP policy agent
    pub fn new(config: PolicyConfig) -> PolicyResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PolicyError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Send a JSON POST and return the successful response
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> PolicyResult<reqwest::Response> {
        let mut request = self.client.post(self.config.endpoint(path)).json(body);
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, path, "Policy agent request failed");
            PolicyError::Unavailable(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, path, &body))
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> PolicyResult<T> {
        // A body that stops arriving is the engine failing, not a bad answer
        let bytes = self.post(path, body).await?.bytes().await.map_err(|e| {
            error!(error = %e, path, "Failed to read policy agent response");
            PolicyError::Unavailable(e.to_string())
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            error!(error = %e, path, "Failed to parse policy agent response");
            PolicyError::Internal(e.to_string())
        })
    }
}

fn status_error(status: StatusCode, path: &str, body: &str) -> PolicyError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        error!(status = %status, path, body, "Policy agent unavailable");
        PolicyError::Unavailable(format!("policy agent returned {status}"))
    } else if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
        debug!(status = %status, path, body, "Policy agent rejected request");
        PolicyError::InvalidRequest(body.to_string())
    } else {
        error!(status = %status, path, body, "Unexpected policy agent response");
        PolicyError::Internal(format!("policy agent returned {status}"))
    }
}

#[async_trait]
impl PolicyAgent for HttpPolicyAgent {
    #[instrument(skip(self), fields(request = %request))]
    async fn evaluate(&self, request: &PolicyRequest) -> PolicyResult<bool> {
        let res: CheckResponse = self.post_json(CHECK_PATH, request).await?;
        Ok(res.allowed)
    }

    #[instrument(skip(self), fields(request = %request))]
    async fn add_policy(&self, request: &PolicyRequest) -> PolicyResult<()> {
        self.post(WRITE_PATH, request).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(request = %request))]
    async fn delete_policy(&self, request: &PolicyRequest) -> PolicyResult<()> {
        self.post(DELETE_PATH, request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_subjects(&self, object: &str, relation: &str) -> PolicyResult<Vec<String>> {
        let res: LookupSubjectsResponse = self
            .post_json(LOOKUP_SUBJECTS_PATH, &LookupSubjectsRequest { object, relation })
            .await?;
        Ok(res.subjects)
    }

    #[instrument(skip(self))]
    async fn list_objects(&self, subject: &str, relation: &str) -> PolicyResult<Vec<String>> {
        let res: LookupObjectsResponse = self
            .post_json(LOOKUP_OBJECTS_PATH, &LookupObjectsRequest { subject, relation })
            .await?;
        Ok(res.objects)
    }
}

impl std::fmt::Debug for HttpPolicyAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPolicyAgent")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, CHECK_PATH, ""),
            PolicyError::Unavailable(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, CHECK_PATH, ""),
            PolicyError::Unavailable(_)
        ));
        assert!(matches!(
            status_error(StatusCode::UNPROCESSABLE_ENTITY, CHECK_PATH, "bad relation"),
            PolicyError::InvalidRequest(msg) if msg == "bad relation"
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, CHECK_PATH, ""),
            PolicyError::Internal(_)
        ));
    }
}
