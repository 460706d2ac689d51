//! Name form definitions.

use super::{
    AttributeType, ObjectClass, Reference, SchemaObject, SchemaObjectInfo, SchemaObjectKind,
    references_to, registered, resolve, resolve_all, rewrite_all, rewrite_opt,
};
use crate::error::{SchemaError, SchemaResult};
use crate::registries::RegistriesRef;
use serde::Serialize;
use std::sync::Arc;

/// Attributes allowed in the RDN of entries of a structural object class.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameForm {
    #[serde(flatten)]
    info: SchemaObjectInfo,
    structural_class_oid: Option<String>,
    must_oids: Vec<String>,
    may_oids: Vec<String>,
}

registered!(NameForm, NameForm, name_forms);

impl NameForm {
    pub fn new(oid: impl Into<String>, registries: &RegistriesRef) -> Self {
        Self {
            info: SchemaObjectInfo::new(oid, registries),
            structural_class_oid: None,
            must_oids: Vec::new(),
            may_oids: Vec::new(),
        }
    }

    pub fn with_structural_class(mut self, id: impl Into<String>) -> Self {
        self.structural_class_oid = Some(id.into());
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

    pub fn structural_class_oid(&self) -> Option<&str> {
        self.structural_class_oid.as_deref()
    }

    pub fn must_oids(&self) -> &[String] {
        &self.must_oids
    }

    pub fn may_oids(&self) -> &[String] {
        &self.may_oids
    }

    pub fn structural_object_class(&self) -> SchemaResult<Arc<ObjectClass>> {
        match &self.structural_class_oid {
            Some(id) => resolve(&self.info, id),
            None => Err(SchemaError::not_found(
                SchemaObjectKind::ObjectClass.label(),
                format!("(unset on name form {})", self.oid()),
            )),
        }
    }

    pub fn must_attribute_types(&self) -> SchemaResult<Vec<Arc<AttributeType>>> {
        resolve_all(&self.info, &self.must_oids)
    }

    pub fn may_attribute_types(&self) -> SchemaResult<Vec<Arc<AttributeType>>> {
        resolve_all(&self.info, &self.may_oids)
    }
}

impl SchemaObject for NameForm {
    fn info(&self) -> &SchemaObjectInfo {
        &self.info
    }

    fn kind(&self) -> SchemaObjectKind {
        SchemaObjectKind::NameForm
    }

    fn references(&self) -> Vec<Reference> {
        let mut references = Vec::new();
        if let Some(id) = &self.structural_class_oid {
            references.push(Reference::new(SchemaObjectKind::ObjectClass, id.clone()));
        }
        references.extend(references_to(SchemaObjectKind::AttributeType, &self.must_oids));
        references.extend(references_to(SchemaObjectKind::AttributeType, &self.may_oids));
        references
    }

    fn rewrite_reference(&mut self, kind: SchemaObjectKind, from: &str, to: &str) -> bool {
        match kind {
            SchemaObjectKind::ObjectClass => rewrite_opt(&mut self.structural_class_oid, from, to),
            SchemaObjectKind::AttributeType => {
                let must = rewrite_all(&mut self.must_oids, from, to);
                let may = rewrite_all(&mut self.may_oids, from, to);
                must || may
            }
            _ => false,
        }
    }
}
