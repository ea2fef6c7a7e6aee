//! Vigil Auth Core - Credential issuance, validation and authorization
//!
//! Mints signed tokens for login pairs, API keys and recovery keys,
//! identifies the subject behind a token, revokes persisted keys and routes
//! authorization checks to the policy agent.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vigil_auth_core::{AuthConfig, AuthService};
//! use vigil_db::MemoryKeyRepository;
//! use vigil_policy::MemoryPolicyAgent;
//! use vigil_types::{Key, KeyType};
//!
//! let config = AuthConfig::from_env()?;
//! let svc = AuthService::new(
//!     config,
//!     Arc::new(MemoryKeyRepository::new()),
//!     Arc::new(MemoryPolicyAgent::new()),
//! )?;
//!
//! let login = svc.issue("", Key::new(KeyType::Access, "user-1", Utc::now())).await?;
//! let subject = svc.identify(&login.access_token).await?;
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod service;
pub mod token;

pub use config::{AuthConfig, ConfigError};
pub use crypto::{token_fingerprint, SigningSecret};
pub use error::{AuthError, AuthResult, AuthenticationFailure};
pub use service::AuthService;
pub use token::{DecodeError, EncodeError, KeyCodec};
