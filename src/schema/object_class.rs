//! Object class definitions.

use super::{
    AttributeType, Reference, SchemaObject, SchemaObjectInfo, SchemaObjectKind, references_to,
    registered, resolve_all, rewrite_all,
};
use crate::error::{SchemaError, SchemaResult};
use crate::registries::RegistriesRef;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Kind of an object class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObjectClassType {
    Abstract,
    #[default]
    Structural,
    Auxiliary,
}

impl ObjectClassType {
    pub fn parse(value: &str) -> SchemaResult<Self> {
        match value.to_ascii_uppercase().as_str() {
            "ABSTRACT" => Ok(ObjectClassType::Abstract),
            "STRUCTURAL" => Ok(ObjectClassType::Structural),
            "AUXILIARY" => Ok(ObjectClassType::Auxiliary),
            _ => Err(SchemaError::invalid_syntax("unknown object class type", value)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectClassType::Abstract => "ABSTRACT",
            ObjectClassType::Structural => "STRUCTURAL",
            ObjectClassType::Auxiliary => "AUXILIARY",
        }
    }
}

/// An object class: superiors plus required and allowed attribute types.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectClass {
    #[serde(flatten)]
    info: SchemaObjectInfo,
    superior_oids: Vec<String>,
    class_type: ObjectClassType,
    must_oids: Vec<String>,
    may_oids: Vec<String>,
}

registered!(ObjectClass, ObjectClass, object_classes);

impl ObjectClass {
    pub fn new(oid: impl Into<String>, registries: &RegistriesRef) -> Self {
        Self {
            info: SchemaObjectInfo::new(oid, registries),
            superior_oids: Vec::new(),
            class_type: ObjectClassType::Structural,
            must_oids: Vec::new(),
            may_oids: Vec::new(),
        }
    }

    pub fn with_superiors<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.superior_oids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_type(mut self, class_type: ObjectClassType) -> Self {
        self.class_type = class_type;
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

    pub fn superior_oids(&self) -> &[String] {
        &self.superior_oids
    }

    pub fn class_type(&self) -> ObjectClassType {
        self.class_type
    }

    pub fn must_oids(&self) -> &[String] {
        &self.must_oids
    }

    pub fn may_oids(&self) -> &[String] {
        &self.may_oids
    }

    pub fn superiors(&self) -> SchemaResult<Vec<Arc<ObjectClass>>> {
        resolve_all(&self.info, &self.superior_oids)
    }

    pub fn must_attribute_types(&self) -> SchemaResult<Vec<Arc<AttributeType>>> {
        resolve_all(&self.info, &self.must_oids)
    }

    pub fn may_attribute_types(&self) -> SchemaResult<Vec<Arc<AttributeType>>> {
        resolve_all(&self.info, &self.may_oids)
    }
}

impl SchemaObject for ObjectClass {
    fn info(&self) -> &SchemaObjectInfo {
        &self.info
    }

    fn kind(&self) -> SchemaObjectKind {
        SchemaObjectKind::ObjectClass
    }

    fn references(&self) -> Vec<Reference> {
        let mut references = references_to(SchemaObjectKind::ObjectClass, &self.superior_oids);
        references.extend(references_to(SchemaObjectKind::AttributeType, &self.must_oids));
        references.extend(references_to(SchemaObjectKind::AttributeType, &self.may_oids));
        references
    }

    fn rewrite_reference(&mut self, kind: SchemaObjectKind, from: &str, to: &str) -> bool {
        match kind {
            SchemaObjectKind::ObjectClass => rewrite_all(&mut self.superior_oids, from, to),
            SchemaObjectKind::AttributeType => {
                let must = rewrite_all(&mut self.must_oids, from, to);
                let may = rewrite_all(&mut self.may_oids, from, to);
                must || may
            }
            _ => false,
        }
    }
}
