//! Authorization gateway
//!
//! Thin adapter over a [`PolicyAgent`] that turns boolean verdicts into
//! results and offers the admin and ownership shortcuts.

use std::sync::Arc;

use tracing::{debug, instrument, warn};
use vigil_types::{PolicyRequest, ADMIN_RELATION, OWNER_RELATION, PLATFORM_OBJECT};

use crate::{PolicyAgent, PolicyError, PolicyResult};

/// Authorization gateway
pub struct AuthzGateway<A: PolicyAgent> {
    agent: Arc<A>,
}

impl<A: PolicyAgent> Clone for AuthzGateway<A> {
    fn clone(&self) -> Self {
        Self {
            agent: Arc::clone(&self.agent),
        }
    }
}

impl<A: PolicyAgent> AuthzGateway<A> {
    /// Create a new gateway around a policy agent
    pub fn new(agent: A) -> Self {
        Self {
            agent: Arc::new(agent),
        }
    }

    /// Create a gateway sharing an existing agent
    pub fn from_arc(agent: Arc<A>) -> Self {
        Self { agent }
    }

    /// Underlying policy agent
    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// Raw verdict from the policy agent
    pub async fn evaluate(&self, request: &PolicyRequest) -> PolicyResult<bool> {
        if request.is_incomplete() {
            return Err(PolicyError::InvalidRequest(format!(
                "incomplete policy request: {request}"
            )));
        }
        self.agent.evaluate(request).await
    }

    /// Succeeds only when the relation holds
    ///
    /// A negative verdict becomes [`PolicyError::Denied`]. Backend failures
    /// pass through unchanged so callers can tell "no" from "cannot answer".
    #[instrument(skip(self), fields(request = %request))]
    pub async fn authorize(&self, request: &PolicyRequest) -> PolicyResult<()> {
        match self.evaluate(request).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                debug!("Policy denied");
                Err(PolicyError::Denied)
            }
            Err(e) => {
                if e.is_retryable() {
                    warn!(error = %e, "Policy agent unavailable");
                }
                Err(e)
            }
        }
    }

    /// Whether `subject` administers the platform
    pub async fn check_admin(&self, subject: &str) -> PolicyResult<()> {
        self.authorize(&PolicyRequest::new(subject, ADMIN_RELATION, PLATFORM_OBJECT))
            .await
    }

    /// Whether `subject` owns `object`
    pub async fn is_owner(&self, object: &str, subject: &str) -> PolicyResult<()> {
        self.authorize(&PolicyRequest::new(subject, OWNER_RELATION, object))
            .await
    }

    /// Store a relation tuple
    #[instrument(skip(self), fields(request = %request))]
    pub async fn add_policy(&self, request: &PolicyRequest) -> PolicyResult<()> {
        if request.is_incomplete() {
            return Err(PolicyError::InvalidRequest(format!(
                "incomplete policy: {request}"
            )));
        }
        self.agent.add_policy(request).await
    }

    /// Delete a relation tuple
    #[instrument(skip(self), fields(request = %request))]
    pub async fn delete_policy(&self, request: &PolicyRequest) -> PolicyResult<()> {
        if request.is_incomplete() {
            return Err(PolicyError::InvalidRequest(format!(
                "incomplete policy: {request}"
            )));
        }
        self.agent.delete_policy(request).await
    }

    /// Subjects holding `relation` on `object`
    pub async fn list_subjects(&self, object: &str, relation: &str) -> PolicyResult<Vec<String>> {
        self.agent.list_subjects(object, relation).await
    }

    /// Objects on which `subject` holds `relation`
    pub async fn list_objects(&self, subject: &str, relation: &str) -> PolicyResult<Vec<String>> {
        self.agent.list_objects(subject, relation).await
    }
}
