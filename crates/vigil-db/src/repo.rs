//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use vigil_types::Key;

use crate::error::DbResult;

/// Key repository trait
///
/// Persists revocable keys. Lookups and deletions are always scoped to the
/// issuer recorded on the key, so a guessed id never crosses tenants.
///
/// Implementations must be safe for concurrent use. A single id gets
/// read-after-write consistency only as far as the backend offers it.
#[async_trait]
pub trait KeyRepository: Send + Sync {
    /// Persist a key, assigning a fresh id when it has none
    ///
    /// Returns the id. A key whose explicit id is already taken, or was
    /// taken by a key since removed, fails with
    /// [`DbError::Conflict`](crate::DbError::Conflict).
    async fn save(&self, key: &Key) -> DbResult<String>;

    /// Fetch a key by id, scoped to its issuer
    ///
    /// Fails with [`DbError::NotFound`](crate::DbError::NotFound) when the key
    /// is absent or belongs to another issuer.
    async fn retrieve(&self, issuer: &str, id: &str) -> DbResult<Key>;

    /// Revoke a key by id, scoped to its issuer
    ///
    /// The key stops being retrievable and its id is never accepted again.
    /// Removing an absent key is not an error.
    async fn remove(&self, issuer: &str, id: &str) -> DbResult<()>;
}
