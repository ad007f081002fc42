//! # ldapgw-core
//!
//! Core types for the LDAP gateway.
//!
//! This crate provides the error taxonomy, structured error responses,
//! process-wide configuration, and credential types shared by the directory
//! execution layer and the HTTP adapter.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status code mapping
//! - [`config`] - Startup configuration (trust policy, listener settings)
//! - [`credentials`] - Request-scoped bind credentials

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod credentials;
pub mod error;

// Re-export commonly used types
pub use config::{GatewayConfig, TrustPolicy};
pub use credentials::BindCredentials;
pub use error::{Error, Result};
