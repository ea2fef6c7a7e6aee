//! Policy agent abstraction

use async_trait::async_trait;
use vigil_types::PolicyRequest;

use crate::PolicyResult;

/// Policy agent trait
///
/// A policy agent stores relation tuples (`subject` has `relation` on
/// `object`) and answers membership checks against them.
#[async_trait]
pub trait PolicyAgent: Send + Sync {
    /// Check whether the relation holds
    ///
    /// `Ok(false)` is a definite "no". Transport failures must be reported as
    /// [`PolicyError::Unavailable`](crate::PolicyError::Unavailable), never as `Ok(false)`.
    async fn evaluate(&self, request: &PolicyRequest) -> PolicyResult<bool>;

    /// Store a relation tuple
    async fn add_policy(&self, request: &PolicyRequest) -> PolicyResult<()>;

    /// Delete a relation tuple; deleting an absent tuple succeeds
    async fn delete_policy(&self, request: &PolicyRequest) -> PolicyResult<()>;

    /// Subjects holding `relation` on `object`
    async fn list_subjects(&self, object: &str, relation: &str) -> PolicyResult<Vec<String>>;

    /// Objects on which `subject` holds `relation`
    async fn list_objects(&self, subject: &str, relation: &str) -> PolicyResult<Vec<String>>;
}
