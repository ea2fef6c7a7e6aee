//! PostgreSQL repository implementations

mod key;
mod schema;

pub use key::PgKeyRepository;
pub use schema::migrate;
