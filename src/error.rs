//! Error types for schema catalog operations.
//!
//! This module provides the error taxonomy shared by the identifier registry, the typed
//! registries, the description decoder and the schema change coordinator. Every operation
//! returns a [`SchemaResult`]; monitors observe failures but never convert them.

use std::fmt;

/// Main error type for schema catalog operations.
///
/// The `kind` fields carry a human readable label of the schema object kind involved
/// (for example `"attribute type"` or `"name or OID"`).
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// An OID or name does not resolve in the relevant registry
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// OID collision on registration
    #[error("{kind} with OID {oid} is already registered")]
    AlreadyRegistered { kind: &'static str, oid: String },

    /// A name is already bound to a different OID
    #[error("name '{name}' is already bound to OID {existing}, cannot bind it to {requested}")]
    NameConflict {
        name: String,
        existing: String,
        requested: String,
    },

    /// Removal or rename of an object other registered objects still reference
    #[error("{kind} {oid} is still referenced by: {}", .dependents.join(", "))]
    DependencyViolation {
        kind: &'static str,
        oid: String,
        dependents: Vec<String>,
    },

    /// A textual description or an input value failed to parse or validate
    #[error("invalid syntax: {message} (in '{raw}')")]
    InvalidSyntax { message: String, raw: String },

    /// Operation not implemented for the given object kind or entry
    #[error("unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// A chain of superiors loops back on itself
    #[error("cyclic reference through {kind} {oid}")]
    CyclicReference { kind: &'static str, oid: String },

    /// The catalog lock was poisoned by a panicking writer
    #[error("lock poisoned during {0}")]
    LockPoisoned(&'static str),

    /// A schema object outlived the registries it was constructed against
    #[error("schema object is detached from its registries")]
    Detached,

    /// The schema loader failed to read or persist schema entries
    #[error("schema loader error: {message}")]
    Loader { message: String },
}

// Convenience methods for creating common errors
impl SchemaError {
    /// Create a not found error
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create an already registered error
    pub fn already_registered(kind: &'static str, oid: impl Into<String>) -> Self {
        Self::AlreadyRegistered {
            kind,
            oid: oid.into(),
        }
    }

    /// Create an invalid syntax error carrying the offending raw text
    pub fn invalid_syntax(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a dependency violation error from a list of dependents
    pub fn dependency_violation<D: fmt::Display>(
        kind: &'static str,
        oid: impl Into<String>,
        dependents: impl IntoIterator<Item = D>,
    ) -> Self {
        Self::DependencyViolation {
            kind,
            oid: oid.into(),
            dependents: dependents.into_iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Create a loader error
    pub fn loader(message: impl Into<String>) -> Self {
        Self::Loader {
            message: message.into(),
        }
    }

    /// Whether this error reports a missing OID or name.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// Result type alias for convenience
pub type SchemaResult<T> = Result<T, SchemaError>;
