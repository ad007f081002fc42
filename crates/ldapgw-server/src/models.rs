//! Request DTOs for the HTTP surface.
//!
//! The field shapes mirror the public API contract; validation rejects
//! malformed input before any directory traffic.

use ldapgw_directory::{AttributeOperation, ModifySpec, SearchSpec};
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_filter() -> String {
    ldapgw_directory::DEFAULT_FILTER.to_string()
}

fn default_scope() -> String {
    ldapgw_directory::DEFAULT_SCOPE.to_string()
}

/// Search parameters, accepted as a JSON body or as query parameters.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchRequest {
    /// Target directory URI.
    #[validate(length(min = 1, message = "URI is required"))]
    pub uri: String,
    /// Search base DN; defaults to the empty string.
    #[serde(default)]
    pub base: String,
    /// Search filter; defaults to `(objectClass=*)`.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Scope keyword (`base`, `one`, `sub`); defaults to `sub`.
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl SearchRequest {
    /// Converts the validated request into a directory search spec.
    #[must_use]
    pub fn into_spec(self) -> SearchSpec {
        SearchSpec {
            uri: self.uri,
            base: self.base,
            filter: self.filter,
            scope: self.scope,
        }
    }
}

/// One declarative modification in a modify request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModificationRequest {
    /// Operation keyword: `add`, `delete`, or `replace`.
    pub operation: String,
    /// Attribute to modify.
    pub attribute: String,
    /// Attribute values; may be absent or empty (a values-less operation).
    #[serde(default)]
    pub values: Vec<String>,
}

/// A modify request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ModifyRequest {
    /// Target directory URI.
    #[validate(length(min = 1, message = "URI is required"))]
    pub uri: String,
    /// Distinguished name of the entry to modify.
    #[validate(length(min = 1, message = "DN is required"))]
    pub dn: String,
    /// Modifications to apply as one atomic directory call.
    #[validate(length(min = 1, message = "Modifications cannot be empty"))]
    pub modifications: Vec<ModificationRequest>,
}

impl ModifyRequest {
    /// Converts the validated request into a directory modify spec.
    ///
    /// # Errors
    ///
    /// Returns [`ldapgw_core::Error::Validation`] for an unrecognized
    /// operation keyword.
    pub fn into_spec(self) -> ldapgw_core::Result<ModifySpec> {
        let operations = self
            .modifications
            .into_iter()
            .map(|m| AttributeOperation::parse(&m.operation, m.attribute, m.values))
            .collect::<ldapgw_core::Result<Vec<_>>>()?;
        Ok(ModifySpec {
            uri: self.uri,
            dn: self.dn,
            operations,
        })
    }
}

/// Query parameters for the LDIF modify endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LdifParams {
    /// Target directory URI.
    pub uri: String,
}
