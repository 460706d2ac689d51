//! Oid value object for schema object identifiers.
//!
//! This module provides a type-safe wrapper around numeric object identifiers with
//! built-in validation. OIDs are the identity of every schema definition in the catalog.

use crate::error::{SchemaError, SchemaResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated numeric object identifier.
///
/// ## Validation Rules
///
/// - At least two arcs separated by dots (`numericoid` in RFC 4512)
/// - Every arc is a decimal number without leading zeros
///
/// ## Examples
///
/// ```rust
/// use ldap_schema::Oid;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let oid = Oid::new("2.5.4.3")?;
///     assert_eq!(oid.as_str(), "2.5.4.3");
///
///     assert!(Oid::new("cn").is_err());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid(String);

impl Oid {
    /// Create a new Oid with validation.
    pub fn new(value: impl Into<String>) -> SchemaResult<Self> {
        let value = value.into();
        if !is_oid(&value) {
            return Err(SchemaError::invalid_syntax("not a numeric OID", value));
        }
        Ok(Self(value))
    }

    /// Get the string representation of the Oid.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the owned string value of the Oid.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Iterate over the numeric arcs.
    pub fn arcs(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

/// Whether `value` looks like a numeric OID.
///
/// Names never look like OIDs because a `descr` must start with a letter.
pub fn is_oid(value: &str) -> bool {
    let mut arcs = 0;
    for arc in value.split('.') {
        if arc.is_empty() || !arc.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        if arc.len() > 1 && arc.starts_with('0') {
            return false;
        }
        arcs += 1;
    }
    arcs >= 2
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Oid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Oid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<&str> for Oid {
    type Error = SchemaError;

    fn try_from(value: &str) -> SchemaResult<Self> {
        Self::new(value)
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_oids() {
        assert!(is_oid("2.5.4.3"));
        assert!(is_oid("0.9.2342.19200300.100.1.25"));
        assert!(is_oid("1.3.6.1.4.1.1466.115.121.1.15"));
    }

    #[test]
    fn test_invalid_oids() {
        assert!(!is_oid(""));
        assert!(!is_oid("2"));
        assert!(!is_oid("cn"));
        assert!(!is_oid("2.5..3"));
        assert!(!is_oid("2.5.4."));
        assert!(!is_oid("2.05.4"));
        assert!(!is_oid("2.5.4.3a"));
    }

    #[test]
    fn test_oid_rejects_names() {
        match Oid::new("commonName").unwrap_err() {
            SchemaError::InvalidSyntax { raw, .. } => assert_eq!(raw, "commonName"),
            other => panic!("Expected InvalidSyntax error, got: {:?}", other),
        }
    }

    #[test]
    fn test_serialization() {
        let oid = Oid::new("2.5.13.2").unwrap();
        assert_eq!(serde_json::to_string(&oid).unwrap(), "\"2.5.13.2\"");
        let back: Oid = serde_json::from_str("\"2.5.13.2\"").unwrap();
        assert_eq!(back, oid);
        assert!(serde_json::from_str::<Oid>("\"caseIgnoreMatch\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_generated_oids_are_valid(arcs in proptest::collection::vec(0u32..100_000, 2..8)) {
            let text = arcs.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(".");
            prop_assert!(is_oid(&text));
            prop_assert_eq!(Oid::new(text.clone()).unwrap().arcs().count(), arcs.len());
        }

        #[test]
        fn prop_names_are_never_oids(name in "[a-zA-Z][a-zA-Z0-9-]{0,20}") {
            prop_assert!(!is_oid(&name));
        }
    }
}
