//! Attribute values as seen by normalizers, comparators and syntax checkers.

use crate::dn::Dn;
use crate::error::{SchemaError, SchemaResult};
use std::fmt;

/// A single attribute value.
///
/// Normalizers, comparators and syntax checkers accept any shape and reject the ones
/// they do not handle with an "unsupported input shape" [`SchemaError::InvalidSyntax`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Human readable (UTF-8) value
    String(String),
    /// Opaque binary value
    Binary(Vec<u8>),
    /// Already parsed distinguished name
    Dn(Dn),
}

impl Value {
    /// Get the string content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the raw bytes of a string or binary value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) => Some(s.as_bytes()),
            Value::Binary(b) => Some(b),
            Value::Dn(_) => None,
        }
    }

    /// Name of the value shape, for error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Dn(_) => "distinguished name",
        }
    }

    /// Get the string content or fail with an unsupported input shape error.
    pub fn require_str(&self, implementation: &str) -> SchemaResult<&str> {
        self.as_str()
            .ok_or_else(|| self.unsupported_shape(implementation))
    }

    /// Build the error reported when `implementation` cannot handle this shape.
    pub fn unsupported_shape(&self, implementation: &str) -> SchemaError {
        SchemaError::invalid_syntax(
            format!(
                "{} does not accept {} values (unsupported input shape)",
                implementation,
                self.shape()
            ),
            self.to_string(),
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Binary(b) => {
                write!(f, "#")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Value::Dn(dn) => write!(f, "{}", dn),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(value)
    }
}

impl From<Dn> for Value {
    fn from(value: Dn) -> Self {
        Value::Dn(value)
    }
}
