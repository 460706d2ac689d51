//! DIT content rule definitions.

use super::{
    AttributeType, ObjectClass, Reference, SchemaObject, SchemaObjectInfo, SchemaObjectKind,
    references_to, registered, resolve, resolve_all, rewrite_all,
};
use crate::error::SchemaResult;
use crate::registries::RegistriesRef;
use serde::Serialize;
use std::sync::Arc;

/// Content allowed in entries of a structural object class. Shares the class's OID.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DitContentRule {
    #[serde(flatten)]
    info: SchemaObjectInfo,
    aux_oids: Vec<String>,
    must_oids: Vec<String>,
    may_oids: Vec<String>,
    not_oids: Vec<String>,
}

registered!(DitContentRule, DitContentRule, dit_content_rules);

impl DitContentRule {
    pub fn new(oid: impl Into<String>, registries: &RegistriesRef) -> Self {
        Self {
            info: SchemaObjectInfo::new(oid, registries),
            aux_oids: Vec::new(),
            must_oids: Vec::new(),
            may_oids: Vec::new(),
            not_oids: Vec::new(),
        }
    }

    pub fn with_aux<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aux_oids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_must<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.must_oids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_may<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.may_oids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_not<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.not_oids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn aux_oids(&self) -> &[String] {
        &self.aux_oids
    }

    pub fn must_oids(&self) -> &[String] {
        &self.must_oids
    }

    pub fn may_oids(&self) -> &[String] {
        &self.may_oids
    }

    pub fn not_oids(&self) -> &[String] {
        &self.not_oids
    }

    /// The structural object class this rule governs.
    pub fn object_class(&self) -> SchemaResult<Arc<ObjectClass>> {
        resolve(&self.info, self.oid())
    }

    pub fn auxiliary_classes(&self) -> SchemaResult<Vec<Arc<ObjectClass>>> {
        resolve_all(&self.info, &self.aux_oids)
    }

    pub fn must_attribute_types(&self) -> SchemaResult<Vec<Arc<AttributeType>>> {
        resolve_all(&self.info, &self.must_oids)
    }

    pub fn may_attribute_types(&self) -> SchemaResult<Vec<Arc<AttributeType>>> {
        resolve_all(&self.info, &self.may_oids)
    }

    pub fn not_attribute_types(&self) -> SchemaResult<Vec<Arc<AttributeType>>> {
        resolve_all(&self.info, &self.not_oids)
    }
}

impl SchemaObject for DitContentRule {
    fn info(&self) -> &SchemaObjectInfo {
        &self.info
    }

    fn kind(&self) -> SchemaObjectKind {
        SchemaObjectKind::DitContentRule
    }

    fn references(&self) -> Vec<Reference> {
        let mut references = vec![Reference::new(SchemaObjectKind::ObjectClass, self.oid())];
        references.extend(references_to(SchemaObjectKind::ObjectClass, &self.aux_oids));
        for ids in [&self.must_oids, &self.may_oids, &self.not_oids] {
            references.extend(references_to(SchemaObjectKind::AttributeType, ids));
        }
        references
    }

    fn rewrite_reference(&mut self, kind: SchemaObjectKind, from: &str, to: &str) -> bool {
        match kind {
            SchemaObjectKind::ObjectClass => rewrite_all(&mut self.aux_oids, from, to),
            SchemaObjectKind::AttributeType => {
                let must = rewrite_all(&mut self.must_oids, from, to);
                let may = rewrite_all(&mut self.may_oids, from, to);
                let not = rewrite_all(&mut self.not_oids, from, to);
                must || may || not
            }
            _ => false,
        }
    }
}
