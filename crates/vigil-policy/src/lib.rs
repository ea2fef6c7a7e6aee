//! Vigil Policy - Authorization decisions
//!
//! Relation checks are answered by an external policy agent. This crate holds
//! the [`PolicyAgent`] abstraction, an HTTP adapter, an in-memory agent, and
//! the [`AuthzGateway`] that the credential core talks to.
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_policy::{AuthzGateway, HttpPolicyAgent, PolicyConfig};
//! use vigil_types::PolicyRequest;
//!
//! let agent = HttpPolicyAgent::new(PolicyConfig::new("http://policy:8080"))?;
//! let gateway = AuthzGateway::new(agent);
//!
//! gateway
//!     .authorize(&PolicyRequest::new("user-1", "read", "thing-42"))
//!     .await?;
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;

pub use agent::PolicyAgent;
pub use config::PolicyConfig;
pub use error::{PolicyError, PolicyResult};
pub use gateway::AuthzGateway;
pub use http::HttpPolicyAgent;
pub use memory::MemoryPolicyAgent;
