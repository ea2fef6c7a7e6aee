//! Common test utilities for vigil-auth-core integration tests

pub mod mock_repos;

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use vigil_auth_core::{AuthConfig, AuthService};
use vigil_db::{KeyRepository, MemoryKeyRepository};
use vigil_policy::MemoryPolicyAgent;
use vigil_types::{Key, KeyType};

#[allow(unused_imports)]
pub use mock_repos::{CountingKeyRepository, OutageKeyRepository, StalledKeyRepository};

pub const TEST_SECRET: &str = "test-signing-secret-with-32-bytes!";

/// Config with defaults and a short backend timeout
#[allow(dead_code)]
pub fn test_config() -> AuthConfig {
    AuthConfig::try_new(TEST_SECRET)
        .unwrap()
        .with_backend_timeout(Duration::from_millis(200))
}

/// Service over the given store, with a memory policy agent
#[allow(dead_code)]
pub fn service_with<K: KeyRepository>(
    keys: K,
) -> (AuthService<K, MemoryPolicyAgent>, Arc<K>, Arc<MemoryPolicyAgent>) {
    let keys = Arc::new(keys);
    let agent = Arc::new(MemoryPolicyAgent::new());
    let svc = AuthService::new(test_config(), Arc::clone(&keys), Arc::clone(&agent)).unwrap();
    (svc, keys, agent)
}

/// Service over memory doubles
#[allow(dead_code)]
pub fn memory_service() -> (
    AuthService<MemoryKeyRepository, MemoryPolicyAgent>,
    Arc<MemoryKeyRepository>,
    Arc<MemoryPolicyAgent>,
) {
    service_with(MemoryKeyRepository::new())
}

/// Current time truncated to whole seconds
#[allow(dead_code)]
pub fn now_secs() -> DateTime<Utc> {
    Utc.timestamp_opt(Utc::now().timestamp(), 0).unwrap()
}

/// Login request for `subject`
#[allow(dead_code)]
pub fn login(subject: &str) -> Key {
    Key::new(KeyType::Access, subject, Utc::now())
}
