//! In-memory policy agent
//!
//! Exact tuple matching, no relation inheritance. The availability switch lets
//! tests simulate an unreachable policy engine.

use async_trait::async_trait;
use dashmap::DashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use vigil_types::PolicyRequest;

use crate::{PolicyAgent, PolicyError, PolicyResult};

/// In-memory policy agent
#[derive(Debug, Clone)]
pub struct MemoryPolicyAgent {
    tuples: Arc<DashSet<PolicyRequest>>,
    available: Arc<AtomicBool>,
}

impl Default for MemoryPolicyAgent {
    fn default() -> Self {
        Self {
            tuples: Arc::new(DashSet::new()),
            available: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl MemoryPolicyAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated reachability
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> PolicyResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PolicyError::Unavailable(
                "in-memory policy agent switched off".to_string(),
            ))
        }
    }
}

#[async_trait]
impl PolicyAgent for MemoryPolicyAgent {
    async fn evaluate(&self, request: &PolicyRequest) -> PolicyResult<bool> {
        self.ensure_available()?;
        Ok(self.tuples.contains(request))
    }

    async fn add_policy(&self, request: &PolicyRequest) -> PolicyResult<()> {
        self.ensure_available()?;
        self.tuples.insert(request.clone());
        Ok(())
    }

    async fn delete_policy(&self, request: &PolicyRequest) -> PolicyResult<()> {
        self.ensure_available()?;
        self.tuples.remove(request);
        Ok(())
    }

    async fn list_subjects(&self, object: &str, relation: &str) -> PolicyResult<Vec<String>> {
        self.ensure_available()?;
        let mut subjects: Vec<String> = self
            .tuples
            .iter()
            .filter(|t| t.object == object && t.relation == relation)
            .map(|t| t.subject.clone())
            .collect();
        subjects.sort();
        Ok(subjects)
    }

    async fn list_objects(&self, subject: &str, relation: &str) -> PolicyResult<Vec<String>> {
        self.ensure_available()?;
        let mut objects: Vec<String> = self
            .tuples
            .iter()
            .filter(|t| t.subject == subject && t.relation == relation)
            .map(|t| t.object.clone())
            .collect();
        objects.sort();
        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_evaluate_delete() {
        let agent = MemoryPolicyAgent::new();
        let req = PolicyRequest::new("u1", "write", "chan-1");

        assert!(!agent.evaluate(&req).await.unwrap());
        agent.add_policy(&req).await.unwrap();
        assert!(agent.evaluate(&req).await.unwrap());

        agent.delete_policy(&req).await.unwrap();
        // Deleting twice is fine
        agent.delete_policy(&req).await.unwrap();
        assert!(!agent.evaluate(&req).await.unwrap());
    }

    #[tokio::test]
    async fn test_listing() {
        let agent = MemoryPolicyAgent::new();
        for (s, o) in [("u2", "chan-1"), ("u1", "chan-1"), ("u1", "chan-2")] {
            agent
                .add_policy(&PolicyRequest::new(s, "read", o))
                .await
                .unwrap();
        }
        agent
            .add_policy(&PolicyRequest::new("u3", "write", "chan-1"))
            .await
            .unwrap();

        assert_eq!(
            agent.list_subjects("chan-1", "read").await.unwrap(),
            vec!["u1", "u2"]
        );
        assert_eq!(
            agent.list_objects("u1", "read").await.unwrap(),
            vec!["chan-1", "chan-2"]
        );
        assert!(agent.list_objects("u3", "read").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_switched_off_agent_is_unavailable() {
        let agent = MemoryPolicyAgent::new();
        agent.set_available(false);

        let err = agent
            .evaluate(&PolicyRequest::new("u1", "read", "x"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        agent.set_available(true);
        assert!(agent
            .evaluate(&PolicyRequest::new("u1", "read", "x"))
            .await
            .is_ok());
    }
}
