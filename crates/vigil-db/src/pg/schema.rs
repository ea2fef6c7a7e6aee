//! Schema bootstrap for the key store

use crate::error::DbResult;
use crate::DbPool;

const CREATE_KEYS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS keys (
    id          VARCHAR(254) PRIMARY KEY,
    key_type    INTEGER      NOT NULL,
    issuer      VARCHAR(254) NOT NULL,
    subject     VARCHAR(254) NOT NULL,
    issued_at   TIMESTAMPTZ  NOT NULL,
    expires_at  TIMESTAMPTZ,
    revoked_at  TIMESTAMPTZ
)
"#;

// Tables created before soft revocation lack the column
const ADD_REVOKED_AT: &str = "ALTER TABLE keys ADD COLUMN IF NOT EXISTS revoked_at TIMESTAMPTZ";

const CREATE_ISSUER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS keys_issuer_idx ON keys (issuer, id)";

/// Create the key store tables if they do not exist yet
pub async fn migrate(pool: &DbPool) -> DbResult<()> {
    sqlx::query(CREATE_KEYS_TABLE).execute(pool).await?;
    sqlx::query(ADD_REVOKED_AT).execute(pool).await?;
    sqlx::query(CREATE_ISSUER_INDEX).execute(pool).await?;
    tracing::debug!("Key store schema ready");
    Ok(())
}
