//! Matching rule definitions.
//!
//! A matching rule names a syntax and is paired, through its own OID, with the normalizer
//! and comparator that implement it.

use super::{
    Comparator, Normalizer, Reference, SchemaObject, SchemaObjectInfo, SchemaObjectKind, Syntax,
    registered, resolve, rewrite_opt,
};
use crate::error::{SchemaError, SchemaResult};
use crate::registries::RegistriesRef;
use crate::value::Value;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingRule {
    #[serde(flatten)]
    info: SchemaObjectInfo,
    syntax_oid: Option<String>,
}

registered!(MatchingRule, MatchingRule, matching_rules);

impl MatchingRule {
    pub fn new(oid: impl Into<String>, registries: &RegistriesRef) -> Self {
        Self {
            info: SchemaObjectInfo::new(oid, registries),
            syntax_oid: None,
        }
    }

    pub fn with_syntax(mut self, id: impl Into<String>) -> Self {
        self.syntax_oid = Some(id.into());
        self
    }

    pub fn syntax_oid(&self) -> Option<&str> {
        self.syntax_oid.as_deref()
    }

    pub fn syntax(&self) -> SchemaResult<Arc<Syntax>> {
        match &self.syntax_oid {
            Some(id) => resolve(&self.info, id),
            None => Err(SchemaError::not_found(
                SchemaObjectKind::Syntax.label(),
                format!("(unset on matching rule {})", self.oid()),
            )),
        }
    }

    /// The comparator registered under this rule's OID.
    pub fn comparator(&self) -> SchemaResult<Arc<Comparator>> {
        resolve(&self.info, self.oid())
    }

    /// The normalizer registered under this rule's OID.
    pub fn normalizer(&self) -> SchemaResult<Arc<Normalizer>> {
        resolve(&self.info, self.oid())
    }

    pub fn normalize(&self, value: &Value) -> SchemaResult<Value> {
        self.normalizer()?.normalize(value)
    }

    /// Compare two values after normalizing both.
    pub fn compare(&self, left: &Value, right: &Value) -> SchemaResult<Ordering> {
        let normalizer = self.normalizer()?;
        let comparator = self.comparator()?;
        comparator.compare(&normalizer.normalize(left)?, &normalizer.normalize(right)?)
    }

    /// Whether two values match under this rule.
    pub fn matches(&self, left: &Value, right: &Value) -> SchemaResult<bool> {
        Ok(self.compare(left, right)? == Ordering::Equal)
    }
}

impl SchemaObject for MatchingRule {
    fn info(&self) -> &SchemaObjectInfo {
        &self.info
    }

    fn kind(&self) -> SchemaObjectKind {
        SchemaObjectKind::MatchingRule
    }

    fn references(&self) -> Vec<Reference> {
        let mut references = vec![
            Reference::new(SchemaObjectKind::Comparator, self.oid()),
            Reference::new(SchemaObjectKind::Normalizer, self.oid()),
        ];
        if let Some(id) = &self.syntax_oid {
            references.push(Reference::new(SchemaObjectKind::Syntax, id.clone()));
        }
        references
    }

    fn rewrite_reference(&mut self, kind: SchemaObjectKind, from: &str, to: &str) -> bool {
        kind == SchemaObjectKind::Syntax && rewrite_opt(&mut self.syntax_oid, from, to)
    }
}
