//! Vigil DB - Key store abstractions
//!
//! SQLx-based persistence for revocable keys, plus an in-memory store with the
//! same contract.
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_db::{create_pool, migrate, KeyRepository, PgKeyRepository};
//!
//! let pool = create_pool("postgres://localhost/vigil").await?;
//! migrate(&pool).await?;
//! let keys = PgKeyRepository::new(pool);
//!
//! let id = keys.save(&key).await?;
//! let key = keys.retrieve(&key.issuer, &id).await?;
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use memory::MemoryKeyRepository;
pub use models::*;
pub use pg::{migrate, PgKeyRepository};
pub use pool::{create_pool, create_pool_with_options, DbPool, PoolOptions};
pub use repo::*;
