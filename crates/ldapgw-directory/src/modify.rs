//! Modify request types.

use ldapgw_core::{Error, Result};
use serde::Serialize;

/// Fixed message for a successful modify.
pub const MODIFY_SUCCESS_MESSAGE: &str = "Modification successful";

/// A declarative attribute operation.
///
/// An empty value list is legal for every kind: `Delete` with no values
/// removes the whole attribute, and `Add`/`Replace` with no values are
/// submitted to the directory as values-less modifications rather than being
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeOperation {
    /// Add attribute values.
    Add {
        /// Attribute to modify.
        attribute: String,
        /// Values to add.
        values: Vec<String>,
    },
    /// Delete attribute values.
    Delete {
        /// Attribute to modify.
        attribute: String,
        /// Values to delete (empty removes the attribute entirely).
        values: Vec<String>,
    },
    /// Replace attribute values.
    Replace {
        /// Attribute to modify.
        attribute: String,
        /// Replacement values.
        values: Vec<String>,
    },
}

impl AttributeOperation {
    /// Builds an operation from a caller-supplied kind keyword.
    ///
    /// Recognized keywords (case-insensitive): `add`, `delete`, `replace`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for any other keyword, before any
    /// network traffic happens.
    pub fn parse(kind: &str, attribute: String, values: Vec<String>) -> Result<Self> {
        match kind.to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add { attribute, values }),
            "delete" => Ok(Self::Delete { attribute, values }),
            "replace" => Ok(Self::Replace { attribute, values }),
            other => Err(Error::Validation(format!(
                "invalid modification operation: {other}"
            ))),
        }
    }

    /// The attribute this operation touches.
    #[must_use]
    pub fn attribute(&self) -> &str {
        match self {
            Self::Add { attribute, .. }
            | Self::Delete { attribute, .. }
            | Self::Replace { attribute, .. } => attribute,
        }
    }
}

/// One modify operation as the caller described it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifySpec {
    /// Target directory URI.
    pub uri: String,
    /// Distinguished name of the entry to modify.
    pub dn: String,
    /// Operations applied as one atomic directory modify.
    pub operations: Vec<AttributeOperation>,
}

/// Result of a modify or LDIF batch operation.
///
/// `success: false` is a normal outcome (the directory rejected the change),
/// not a fault; faults surface as errors instead. The serialized field shape
/// (`success`, `message`, `dn`) is part of the public API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModifyOutcome {
    /// Whether every requested change was applied.
    pub success: bool,
    /// Success message or the directory's diagnostic text.
    pub message: String,
    /// Distinguished name the outcome refers to.
    pub dn: String,
}

impl ModifyOutcome {
    /// A successful single-entry modify.
    #[must_use]
    pub fn succeeded(dn: impl Into<String>) -> Self {
        Self {
            success: true,
            message: MODIFY_SUCCESS_MESSAGE.to_string(),
            dn: dn.into(),
        }
    }

    /// A directory-rejected modify, carrying the diagnostic text.
    #[must_use]
    pub fn rejected(dn: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            dn: dn.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds() {
        let op = AttributeOperation::parse("add", "mail".to_string(), vec!["a@b".to_string()])
            .unwrap();
        assert!(matches!(op, AttributeOperation::Add { .. }));
        assert_eq!(op.attribute(), "mail");

        assert!(matches!(
            AttributeOperation::parse("delete", "mail".to_string(), Vec::new()),
            Ok(AttributeOperation::Delete { .. })
        ));
        assert!(matches!(
            AttributeOperation::parse("replace", "cn".to_string(), Vec::new()),
            Ok(AttributeOperation::Replace { .. })
        ));
    }

    #[test]
    fn kind_keywords_are_case_insensitive() {
        assert!(matches!(
            AttributeOperation::parse("Replace", "cn".to_string(), Vec::new()),
            Ok(AttributeOperation::Replace { .. })
        ));
    }

    #[test]
    fn unknown_kind_is_a_validation_error() {
        let err =
            AttributeOperation::parse("append", "cn".to_string(), Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("append"));
    }

    #[test]
    fn empty_values_are_preserved_not_dropped() {
        let op = AttributeOperation::parse("replace", "mail".to_string(), Vec::new()).unwrap();
        match op {
            AttributeOperation::Replace { values, .. } => assert!(values.is_empty()),
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn outcome_serialization_shape() {
        let outcome = ModifyOutcome::succeeded("cn=x,dc=example,dc=com");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], MODIFY_SUCCESS_MESSAGE);
        assert_eq!(json["dn"], "cn=x,dc=example,dc=com");

        let rejected = ModifyOutcome::rejected("cn=x", "attribute not allowed");
        assert_eq!(
            serde_json::to_value(&rejected).unwrap()["message"],
            "attribute not allowed"
        );
    }
}
