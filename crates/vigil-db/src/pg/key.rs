//! PostgreSQL key repository implementation
//!
//! Removal stamps `revoked_at` instead of deleting the row. The id stays
//! taken, so a later save with the same explicit id hits the primary key
//! and fails with `Conflict`, the same contract the in-memory store keeps.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;
use vigil_types::Key;

use crate::error::{DbError, DbResult};
use crate::models::KeyRow;
use crate::repo::KeyRepository;

const INSERT_KEY: &str = r#"
INSERT INTO keys (id, key_type, issuer, subject, issued_at, expires_at)
VALUES ($1, $2, $3, $4, $5, $6)
"#;

const SELECT_LIVE_KEY: &str = r#"
SELECT id, key_type, issuer, subject, issued_at, expires_at
FROM keys
WHERE id = $1 AND issuer = $2 AND revoked_at IS NULL
"#;

const REVOKE_KEY: &str = r#"
UPDATE keys SET revoked_at = now()
WHERE id = $1 AND issuer = $2 AND revoked_at IS NULL
"#;

/// PostgreSQL key repository
#[derive(Clone)]
pub struct PgKeyRepository {
    pool: PgPool,
}

impl PgKeyRepository {
    /// Create a new key repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyRepository for PgKeyRepository {
    #[instrument(skip(self, key), fields(key_type = %key.key_type))]
    async fn save(&self, key: &Key) -> DbResult<String> {
        let id = key
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let ordinal = i32::try_from(key.key_type.ordinal())
            .map_err(|_| DbError::MalformedEntity(format!("key type {}", key.key_type)))?;

        sqlx::query(INSERT_KEY)
            .bind(&id)
            .bind(ordinal)
            .bind(&key.issuer)
            .bind(&key.subject)
            .bind(key.issued_at)
            .bind(key.expires_at)
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn retrieve(&self, issuer: &str, id: &str) -> DbResult<Key> {
        let row = sqlx::query_as::<_, KeyRow>(SELECT_LIVE_KEY)
            .bind(id)
            .bind(issuer)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)?;

        Key::try_from(row)
    }

    #[instrument(skip(self))]
    async fn remove(&self, issuer: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query(REVOKE_KEY)
            .bind(id)
            .bind(issuer)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!("No live key to revoke");
        }
        Ok(())
    }
}

impl std::fmt::Debug for PgKeyRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgKeyRepository").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_remove_keeps_the_row() {
        let sql = normalized(REVOKE_KEY);
        assert!(sql.starts_with("UPDATE keys SET revoked_at = now()"));
        assert!(!sql.contains("DELETE"));
        assert!(sql.contains("issuer = $2"));
    }

    #[test]
    fn test_retrieve_skips_revoked_rows() {
        let sql = normalized(SELECT_LIVE_KEY);
        assert!(sql.ends_with("WHERE id = $1 AND issuer = $2 AND revoked_at IS NULL"));
    }

    #[test]
    fn test_insert_leaves_revocation_unset() {
        // A fresh row must start live, and the id column stays the conflict target
        let sql = normalized(INSERT_KEY);
        assert!(!sql.contains("revoked_at"));
        assert!(!sql.contains("ON CONFLICT"));
    }
}
