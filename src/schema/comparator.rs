//! Comparator objects.

use super::{SchemaObject, SchemaObjectInfo, SchemaObjectKind, registered};
use crate::error::SchemaResult;
use crate::registries::RegistriesRef;
use crate::value::Value;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Ordering behaviour behind a [`Comparator`].
pub trait ValueComparator: fmt::Debug + Send + Sync {
    fn compare(&self, left: &Value, right: &Value) -> SchemaResult<Ordering>;
}

/// A registered comparator, sharing the OID of the matching rule it serves.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparator {
    #[serde(flatten)]
    info: SchemaObjectInfo,
    implementation: String,
    #[serde(skip)]
    comparator: Arc<dyn ValueComparator>,
}

registered!(Comparator, Comparator, comparators);

impl Comparator {
    pub fn new(
        oid: impl Into<String>,
        implementation: impl Into<String>,
        comparator: Arc<dyn ValueComparator>,
        registries: &RegistriesRef,
    ) -> Self {
        Self {
            info: SchemaObjectInfo::new(oid, registries),
            implementation: implementation.into(),
            comparator,
        }
    }

    pub fn implementation(&self) -> &str {
        &self.implementation
    }

    pub fn compare(&self, left: &Value, right: &Value) -> SchemaResult<Ordering> {
        self.comparator.compare(left, right)
    }
}

impl SchemaObject for Comparator {
    fn info(&self) -> &SchemaObjectInfo {
        &self.info
    }

    fn kind(&self) -> SchemaObjectKind {
        SchemaObjectKind::Comparator
    }
}
