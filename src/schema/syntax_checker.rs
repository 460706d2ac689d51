//! Syntax checker objects.

use super::{SchemaObject, SchemaObjectInfo, SchemaObjectKind, registered};
use crate::registries::RegistriesRef;
use crate::value::Value;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Validation behaviour behind a [`SyntaxChecker`].
pub trait ValueChecker: fmt::Debug + Send + Sync {
    fn is_valid(&self, value: &Value) -> bool;
}

/// A registered syntax checker: an implementation name bound to an OID.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxChecker {
    #[serde(flatten)]
    info: SchemaObjectInfo,
    implementation: String,
    #[serde(skip)]
    checker: Arc<dyn ValueChecker>,
}

registered!(SyntaxChecker, SyntaxChecker, syntax_checkers);

impl SyntaxChecker {
    pub fn new(
        oid: impl Into<String>,
        implementation: impl Into<String>,
        checker: Arc<dyn ValueChecker>,
        registries: &RegistriesRef,
    ) -> Self {
        Self {
            info: SchemaObjectInfo::new(oid, registries),
            implementation: implementation.into(),
            checker,
        }
    }

    /// Name of the implementation, as stored in `m-fqcn`.
    pub fn implementation(&self) -> &str {
        &self.implementation
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.checker.is_valid(value)
    }
}

impl SchemaObject for SyntaxChecker {
    fn info(&self) -> &SchemaObjectInfo {
        &self.info
    }

    fn kind(&self) -> SchemaObjectKind {
        SchemaObjectKind::SyntaxChecker
    }
}
