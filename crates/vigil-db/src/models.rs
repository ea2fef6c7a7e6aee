//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use vigil_types::{Key, KeyType};

use crate::DbError;

/// Key row from the database
#[derive(Debug, Clone, FromRow)]
pub struct KeyRow {
    pub id: String,
    pub key_type: i32,
    pub issuer: String,
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TryFrom<KeyRow> for Key {
    type Error = DbError;

    fn try_from(row: KeyRow) -> Result<Self, Self::Error> {
        let key_type = u32::try_from(row.key_type)
            .ok()
            .and_then(|ordinal| KeyType::try_from(ordinal).ok())
            .ok_or_else(|| DbError::MalformedEntity(format!("key type {}", row.key_type)))?;

        Ok(Key {
            id: Some(row.id),
            key_type,
            issuer: row.issuer,
            subject: row.subject,
            issued_at: row.issued_at,
            expires_at: row.expires_at,
        })
    }
}
