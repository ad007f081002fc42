//! Error types for gateway operations.
//!
//! This module provides the error taxonomy for the LDAP gateway, including
//! HTTP status code mapping and the structured error response returned to
//! API callers.

use serde::Serialize;
use thiserror::Error;

/// Main error type for gateway operations.
///
/// Connection, bind, and protocol faults abort the current operation and are
/// surfaced to the caller through this type. Business-level rejections (the
/// directory answering "no" to a modify) are *not* errors; they are reported
/// in the operation's result payload instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The caller-supplied LDAP URI could not be parsed
    #[error("Invalid LDAP URI: {0}")]
    InvalidUri(String),

    /// The directory connection could not be established
    #[error("Failed to connect to directory: {0}")]
    Connection(String),

    /// The configured truststore could not be read or parsed
    #[error("Trust store error: {0}")]
    TrustStore(String),

    /// The directory rejected the bind credentials
    #[error("LDAP bind failed: {0}")]
    BindFailed(String),

    /// A search operation failed at the protocol level
    #[error("LDAP search failed: {0}")]
    Search(String),

    /// A modify operation failed at the protocol level
    #[error("LDAP modify failed: {0}")]
    Modify(String),

    /// LDIF content could not be parsed
    #[error("LDIF parse error: {0}")]
    LdifParse(String),

    /// Malformed caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Specialized result type for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structured error response returned to API callers.
///
/// The field shape (`error`, `message`, `code`, optional `details`) is part
/// of the public API and must not change.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// HTTP status code
    pub code: u16,
    /// Name of the error kind that produced this response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUri(_) => "INVALID_URI",
            Self::Connection(_) => "CONNECTION_ERROR",
            Self::TrustStore(_) => "TRUST_STORE_ERROR",
            Self::BindFailed(_) => "AUTHENTICATION_ERROR",
            Self::Search(_) => "SEARCH_ERROR",
            Self::Modify(_) => "MODIFY_ERROR",
            Self::LdifParse(_) => "LDIF_PARSE_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code this error maps to.
    ///
    /// Bind rejections are unauthorized; malformed caller input is a bad
    /// request; an unreachable directory is a bad gateway.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidUri(_) | Self::LdifParse(_) | Self::Validation(_) => 400,
            Self::BindFailed(_) => 401,
            Self::Connection(_) => 502,
            Self::TrustStore(_)
            | Self::Search(_)
            | Self::Modify(_)
            | Self::Config(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Returns the bare name of this error kind (used as `details` in the
    /// error response).
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::InvalidUri(_) => "InvalidUri",
            Self::Connection(_) => "Connection",
            Self::TrustStore(_) => "TrustStore",
            Self::BindFailed(_) => "BindFailed",
            Self::Search(_) => "Search",
            Self::Modify(_) => "Modify",
            Self::LdifParse(_) => "LdifParse",
            Self::Validation(_) => "Validation",
            Self::Config(_) => "Config",
            Self::Internal(_) => "Internal",
        }
    }

    /// Converts the error into an [`ErrorResponse`].
    #[must_use]
    pub fn into_error_response(self) -> ErrorResponse {
        ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            code: self.http_status(),
            details: Some(self.kind_name().to_string()),
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::TrustStore(_) | Self::Config(_) | Self::Internal(_)
        )
    }
}

// Conversions from external error types
impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUri(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}
