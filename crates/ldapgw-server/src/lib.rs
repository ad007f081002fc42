//! HTTP adapter for the LDAP gateway.
//!
//! A thin axum layer over [`ldapgw_directory::DirectoryGateway`]: it
//! extracts the caller's Basic credentials, validates the request shape,
//! invokes the directory layer, and renders results as JSON or LDIF. All
//! directory semantics live in `ldapgw-directory`.

#![deny(missing_docs)]

pub mod auth;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;

pub use error::WebError;
pub use routes::router;
pub use state::AppState;
