//! Normalizer objects.

use super::{SchemaObject, SchemaObjectInfo, SchemaObjectKind, registered};
use crate::error::SchemaResult;
use crate::registries::RegistriesRef;
use crate::value::Value;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Canonicalization behaviour behind a [`Normalizer`].
///
/// Implementations reject value shapes they do not handle with an
/// "unsupported input shape" error (see [`Value::unsupported_shape`]).
pub trait ValueNormalizer: fmt::Debug + Send + Sync {
    fn normalize(&self, value: &Value) -> SchemaResult<Value>;
}

/// A registered normalizer, sharing the OID of the matching rule it serves.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Normalizer {
    #[serde(flatten)]
    info: SchemaObjectInfo,
    implementation: String,
    #[serde(skip)]
    normalizer: Arc<dyn ValueNormalizer>,
}

registered!(Normalizer, Normalizer, normalizers);

impl Normalizer {
    pub fn new(
        oid: impl Into<String>,
        implementation: impl Into<String>,
        normalizer: Arc<dyn ValueNormalizer>,
        registries: &RegistriesRef,
    ) -> Self {
        Self {
            info: SchemaObjectInfo::new(oid, registries),
            implementation: implementation.into(),
            normalizer,
        }
    }

    pub fn implementation(&self) -> &str {
        &self.implementation
    }

    pub fn normalize(&self, value: &Value) -> SchemaResult<Value> {
        self.normalizer.normalize(value)
    }
}

impl SchemaObject for Normalizer {
    fn info(&self) -> &SchemaObjectInfo {
        &self.info
    }

    fn kind(&self) -> SchemaObjectKind {
        SchemaObjectKind::Normalizer
    }
}
