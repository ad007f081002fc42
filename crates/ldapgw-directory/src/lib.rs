//! LDAP operation execution layer for the gateway.
//!
//! This crate owns everything between a typed request and the directory
//! server: target URI parsing, TLS trust strategy resolution, connection
//! establishment, credential-scoped binds, search and modify execution, LDIF
//! change-record batches, and the normalized response model.
//!
//! Every operation opens exactly one short-lived connection, performs one
//! bind with the caller's own credentials, and closes the connection on
//! every exit path. Nothing is pooled or shared across requests except the
//! trust strategy resolved once at startup.

#![deny(missing_docs)]

mod batch;
mod connection;
mod entry;
mod gateway;
mod ldif;
mod modify;
mod search;
mod target;
mod tls;

pub use entry::{AttributeValue, DirectoryEntry, SearchOutcome};
pub use gateway::DirectoryGateway;
pub use ldif::{parse_change_records, render_entries, ChangeRecord};
pub use modify::{AttributeOperation, ModifyOutcome, ModifySpec};
pub use search::{SearchScope, SearchSpec, DEFAULT_FILTER, DEFAULT_SCOPE};
pub use target::{DirectoryTarget, Scheme};
pub use tls::TlsStrategy;

/// Convenient result alias that reuses the core error type.
pub type Result<T> = ldapgw_core::Result<T>;
