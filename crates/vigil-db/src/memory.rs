//! In-memory key repository
//!
//! Backed by [`DashMap`], so it is safe to share across tasks. Every operation
//! is linearizable per id. Removed ids are remembered and never accepted again.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::sync::Arc;
use uuid::Uuid;
use vigil_types::Key;

use crate::error::{DbError, DbResult};
use crate::repo::KeyRepository;

/// In-memory key repository
#[derive(Debug, Default, Clone)]
pub struct MemoryKeyRepository {
    keys: Arc<DashMap<String, Key>>,
    removed: Arc<DashSet<String>>,
}

impl MemoryKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store holds no live keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl KeyRepository for MemoryKeyRepository {
    async fn save(&self, key: &Key) -> DbResult<String> {
        let id = key
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // Tombstones are checked and written under the entry's shard lock
        match self.keys.entry(id.clone()) {
            Entry::Occupied(_) => Err(DbError::Conflict),
            Entry::Vacant(_) if self.removed.contains(&id) => Err(DbError::Conflict),
            Entry::Vacant(slot) => {
                let mut stored = key.clone();
                stored.id = Some(id.clone());
                slot.insert(stored);
                Ok(id)
            }
        }
    }

    async fn retrieve(&self, issuer: &str, id: &str) -> DbResult<Key> {
        self.keys
            .get(id)
            .filter(|entry| entry.value().issuer == issuer)
            .map(|entry| entry.value().clone())
            .ok_or(DbError::NotFound)
    }

    async fn remove(&self, issuer: &str, id: &str) -> DbResult<()> {
        if let Entry::Occupied(entry) = self.keys.entry(id.to_string()) {
            if entry.get().issuer == issuer {
                self.removed.insert(id.to_string());
                entry.remove();
            }
        }
        Ok(())
    }
}
