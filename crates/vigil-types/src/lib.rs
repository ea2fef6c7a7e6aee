//! Vigil Types - Shared domain types
//!
//! This crate contains domain types used across Vigil crates:
//! - Credential keys and key types
//! - Issued tokens
//! - Policy (relationship) requests

pub mod error;
pub mod key;
pub mod policy;
pub mod token;

pub use error::*;
pub use key::*;
pub use policy::*;
pub use token::*;
