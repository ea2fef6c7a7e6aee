//! PostgreSQL key store tests
//!
//! Run against a live database when `VIGIL_TEST_DATABASE_URL` is set,
//! otherwise each test returns early.

use chrono::{Duration, Utc};
use uuid::Uuid;
use vigil_db::{create_pool, migrate, DbError, KeyRepository, PgKeyRepository};
use vigil_types::{Key, KeyType};

async fn repo() -> Option<PgKeyRepository> {
    let url = std::env::var("VIGIL_TEST_DATABASE_URL").ok()?;
    let pool = create_pool(&url).await.expect("connect test database");
    migrate(&pool).await.expect("migrate test database");
    Some(PgKeyRepository::new(pool))
}

fn api_key(issuer: &str) -> Key {
    Key::new(KeyType::Api, issuer, Utc::now())
        .with_issuer(issuer)
        .valid_for(Duration::hours(1))
}

#[tokio::test]
async fn test_save_retrieve_scoped_to_issuer() {
    let Some(repo) = repo().await else { return };
    let issuer = format!("pg-{}", Uuid::new_v4());

    let id = repo.save(&api_key(&issuer)).await.unwrap();
    let found = repo.retrieve(&issuer, &id).await.unwrap();
    assert_eq!(found.id.as_deref(), Some(id.as_str()));
    assert_eq!(found.key_type, KeyType::Api);

    assert!(matches!(
        repo.retrieve("someone-else", &id).await,
        Err(DbError::NotFound)
    ));
}

#[tokio::test]
async fn test_removed_id_cannot_be_saved_again() {
    let Some(repo) = repo().await else { return };
    let issuer = format!("pg-{}", Uuid::new_v4());
    let id = format!("explicit-{}", Uuid::new_v4());

    let key = api_key(&issuer).with_id(id.clone());
    assert_eq!(repo.save(&key).await.unwrap(), id);

    repo.remove(&issuer, &id).await.unwrap();
    assert!(matches!(
        repo.retrieve(&issuer, &id).await,
        Err(DbError::NotFound)
    ));

    assert!(matches!(repo.save(&key).await, Err(DbError::Conflict)));
    assert!(matches!(
        repo.retrieve(&issuer, &id).await,
        Err(DbError::NotFound)
    ));

    // Removing twice is still fine
    repo.remove(&issuer, &id).await.unwrap();
}

#[tokio::test]
async fn test_remove_by_other_issuer_leaves_key_live() {
    let Some(repo) = repo().await else { return };
    let issuer = format!("pg-{}", Uuid::new_v4());

    let id = repo.save(&api_key(&issuer)).await.unwrap();
    repo.remove("someone-else", &id).await.unwrap();
    assert!(repo.retrieve(&issuer, &id).await.is_ok());
}
