//! Key repositories that misbehave on purpose

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use vigil_db::{DbError, DbResult, KeyRepository, MemoryKeyRepository};
use vigil_types::Key;

/// Repository whose every call reports the store as unreachable
#[derive(Default, Clone)]
pub struct OutageKeyRepository;

#[async_trait]
impl KeyRepository for OutageKeyRepository {
    async fn save(&self, _: &Key) -> DbResult<String> {
        Err(DbError::Unavailable("connection refused".to_string()))
    }

    async fn retrieve(&self, _: &str, _: &str) -> DbResult<Key> {
        Err(DbError::Unavailable("connection refused".to_string()))
    }

    async fn remove(&self, _: &str, _: &str) -> DbResult<()> {
        Err(DbError::Unavailable("connection refused".to_string()))
    }
}

/// Repository that delays reads past any sane timeout
///
/// Writes go straight to the inner memory store so tests can issue keys first.
#[derive(Default, Clone)]
pub struct StalledKeyRepository {
    inner: MemoryKeyRepository,
    pub delay: Duration,
}

impl StalledKeyRepository {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryKeyRepository::new(),
            delay,
        }
    }
}

#[async_trait]
impl KeyRepository for StalledKeyRepository {
    async fn save(&self, key: &Key) -> DbResult<String> {
        self.inner.save(key).await
    }

    async fn retrieve(&self, issuer: &str, id: &str) -> DbResult<Key> {
        tokio::time::sleep(self.delay).await;
        self.inner.retrieve(issuer, id).await
    }

    async fn remove(&self, issuer: &str, id: &str) -> DbResult<()> {
        self.inner.remove(issuer, id).await
    }
}

/// Repository that counts calls on top of a memory store
#[derive(Default, Clone)]
pub struct CountingKeyRepository {
    inner: MemoryKeyRepository,
    pub saves: Arc<AtomicUsize>,
    pub retrieves: Arc<AtomicUsize>,
}

impl CountingKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn retrieves(&self) -> usize {
        self.retrieves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyRepository for CountingKeyRepository {
    async fn save(&self, key: &Key) -> DbResult<String> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(key).await
    }

    async fn retrieve(&self, issuer: &str, id: &str) -> DbResult<Key> {
        self.retrieves.fetch_add(1, Ordering::SeqCst);
        self.inner.retrieve(issuer, id).await
    }

    async fn remove(&self, issuer: &str, id: &str) -> DbResult<()> {
        self.inner.remove(issuer, id).await
    }
}
