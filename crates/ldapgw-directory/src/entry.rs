//! Normalized directory entry model.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A single attribute's normalized value(s).
///
/// An attribute with exactly one value serializes as a bare string; an
/// attribute with two or more values serializes as an ordered list. This
/// collapse is part of the public API and must be preserved exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Exactly one value.
    Single(String),
    /// Two or more values, in the order the directory returned them.
    Many(Vec<String>),
}

impl AttributeValue {
    /// Collapses a raw value list per the single/list rule.
    ///
    /// An empty list becomes an empty `Many` (the directory does not
    /// normally return valueless attributes, but the representation must
    /// not invent a value if it does).
    #[must_use]
    pub fn collapse(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            Self::Single(values.remove(0))
        } else {
            Self::Many(values)
        }
    }

    /// All values in directory order, regardless of representation.
    #[must_use]
    pub fn values(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }
}

/// A directory entry normalized for the response model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Distinguished name of the entry.
    pub dn: String,
    /// Attribute map with the single/list collapse applied.
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl DirectoryEntry {
    /// Normalizes a raw attribute map as returned by the transport.
    #[must_use]
    pub fn from_raw(dn: String, raw: HashMap<String, Vec<String>>) -> Self {
        let attributes = raw
            .into_iter()
            .map(|(name, values)| (name, AttributeValue::collapse(values)))
            .collect();
        Self { dn, attributes }
    }
}

/// The JSON search response: entries plus their count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    /// Entries found by the search.
    pub entries: Vec<DirectoryEntry>,
    /// Number of entries returned.
    pub count: usize,
}

impl SearchOutcome {
    /// Wraps a normalized entry list; `count` is derived from its length.
    #[must_use]
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        let count = entries.len();
        Self { entries, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_collapses_to_scalar() {
        let value = AttributeValue::collapse(vec!["John Doe".to_string()]);
        assert_eq!(value, AttributeValue::Single("John Doe".to_string()));
        assert_eq!(serde_json::to_value(&value).unwrap(), "John Doe");
    }

    #[test]
    fn multiple_values_stay_an_ordered_list() {
        let value = AttributeValue::collapse(vec![
            "person".to_string(),
            "inetOrgPerson".to_string(),
        ]);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            serde_json::json!(["person", "inetOrgPerson"])
        );
    }

    #[test]
    fn values_accessor_is_uniform() {
        let single = AttributeValue::collapse(vec!["a".to_string()]);
        let many = AttributeValue::collapse(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(single.values(), ["a".to_string()]);
        assert_eq!(many.values(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn entry_normalization() {
        let raw = HashMap::from([
            ("cn".to_string(), vec!["John Doe".to_string()]),
            (
                "objectClass".to_string(),
                vec!["person".to_string(), "inetOrgPerson".to_string()],
            ),
        ]);
        let entry = DirectoryEntry::from_raw("cn=John Doe,dc=example,dc=com".to_string(), raw);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["dn"], "cn=John Doe,dc=example,dc=com");
        assert_eq!(json["attributes"]["cn"], "John Doe");
        assert_eq!(
            json["attributes"]["objectClass"],
            serde_json::json!(["person", "inetOrgPerson"])
        );
    }

    #[test]
    fn outcome_counts_entries() {
        let outcome = SearchOutcome::new(vec![DirectoryEntry::from_raw(
            "dc=example,dc=com".to_string(),
            HashMap::new(),
        )]);
        assert_eq!(outcome.count, 1);

        let empty = SearchOutcome::new(Vec::new());
        let json = serde_json::to_value(&empty).unwrap();
        assert_eq!(json["count"], 0);
        assert_eq!(json["entries"], serde_json::json!([]));
    }
}
