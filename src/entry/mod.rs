//! Meta-schema entries.
//!
//! Schema definitions are stored in the directory as entries below `ou=schema`:
//!
//! ```text
//! ou=schema
//!   cn=core                                  (metaSchema)
//!     ou=attributeTypes
//!       m-oid=2.5.4.4                        (metaAttributeType)
//!     ou=objectClasses
//!       m-oid=2.5.6.6                        (metaObjectClass)
//! ```
//!
//! This module models such entries, the modifications applied to them and the
//! classification of an entry into the kind of definition it describes. Turning an entry
//! into a schema object is the job of [`FromEntry`].

pub mod factory;

pub use factory::{FromEntry, decode_entry};

use crate::dn::{Dn, Rdn};
use crate::error::{SchemaError, SchemaResult};
use crate::schema::SchemaObjectKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Meta-schema attribute names.
pub mod attrs {
    pub const OBJECT_CLASS: &str = "objectClass";
    pub const CN: &str = "cn";
    pub const OID: &str = "m-oid";
    pub const NAME: &str = "m-name";
    pub const DESCRIPTION: &str = "m-description";
    pub const OBSOLETE: &str = "m-obsolete";
    pub const SUP_ATTRIBUTE_TYPE: &str = "m-supAttributeType";
    pub const EQUALITY: &str = "m-equality";
    pub const ORDERING: &str = "m-ordering";
    pub const SUBSTR: &str = "m-substr";
    pub const SYNTAX: &str = "m-syntax";
    pub const LENGTH: &str = "m-length";
    pub const SINGLE_VALUE: &str = "m-singleValue";
    pub const COLLECTIVE: &str = "m-collective";
    pub const NO_USER_MODIFICATION: &str = "m-noUserModification";
    pub const USAGE: &str = "m-usage";
    pub const SUP_OBJECT_CLASS: &str = "m-supObjectClass";
    pub const TYPE_OBJECT_CLASS: &str = "m-typeObjectClass";
    pub const MUST: &str = "m-must";
    pub const MAY: &str = "m-may";
    pub const APPLIES: &str = "m-applies";
    pub const NOT_HUMAN_READABLE: &str = "x-not-human-readable";
    pub const FQCN: &str = "m-fqcn";
    pub const BYTECODE: &str = "m-bytecode";
    pub const OC: &str = "m-oc";
    pub const AUX: &str = "m-aux";
    pub const NOT: &str = "m-not";
    pub const FORM: &str = "m-form";
    pub const SUP_DIT_STRUCTURE_RULE: &str = "m-supDITStructureRule";
    pub const DEPENDENCIES: &str = "m-dependencies";
    pub const DISABLED: &str = "m-disabled";
    pub const OWNER: &str = "m-owner";
}

/// Object class of schema description entries.
pub const META_SCHEMA_OC: &str = "metaSchema";

/// RDN of the meta-schema subtree.
pub const SCHEMA_ROOT: &str = "ou=schema";

/// An attribute of an entry: its id as written and its values in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    id: String,
    values: Vec<String>,
}

impl Attribute {
    pub fn new<I, S>(id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// A directory entry. Attribute ids match case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    dn: Dn,
    attributes: BTreeMap<String, Attribute>,
}

impl Entry {
    pub fn new(dn: Dn) -> Self {
        Self {
            dn,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute<I, S>(mut self, id: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.put(id, values);
        self
    }

    pub fn dn(&self) -> &Dn {
        &self.dn
    }

    pub fn set_dn(&mut self, dn: Dn) {
        self.dn = dn;
    }

    pub fn get(&self, id: &str) -> Option<&Attribute> {
        self.attributes.get(&id.to_ascii_lowercase())
    }

    /// Values of an attribute; empty when absent.
    pub fn values(&self, id: &str) -> &[String] {
        self.get(id).map(Attribute::values).unwrap_or(&[])
    }

    pub fn first(&self, id: &str) -> Option<&str> {
        self.get(id).and_then(Attribute::first)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Replace all values of an attribute. No values removes it.
    pub fn put<I, S>(&mut self, id: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let attribute = Attribute::new(id, values);
        if attribute.values.is_empty() {
            self.remove(id);
        } else {
            self.attributes.insert(id.to_ascii_lowercase(), attribute);
        }
    }

    /// Add values, skipping the ones already present.
    pub fn add_values<I, S>(&mut self, id: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let attribute = self
            .attributes
            .entry(id.to_ascii_lowercase())
            .or_insert_with(|| Attribute::new(id, Vec::<String>::new()));
        for value in values {
            let value = value.into();
            if !attribute.values.contains(&value) {
                attribute.values.push(value);
            }
        }
        if attribute.values.is_empty() {
            self.remove(id);
        }
    }

    /// Remove the given values; the attribute goes away with its last value.
    pub fn remove_values(&mut self, id: &str, values: &[String]) -> SchemaResult<()> {
        let key = id.to_ascii_lowercase();
        let attribute = self
            .attributes
            .get_mut(&key)
            .ok_or_else(|| SchemaError::not_found("attribute", id))?;
        attribute.values.retain(|value| !values.contains(value));
        if attribute.values.is_empty() {
            self.attributes.remove(&key);
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Attribute> {
        self.attributes.remove(&id.to_ascii_lowercase())
    }

    pub fn object_classes(&self) -> &[String] {
        self.values(attrs::OBJECT_CLASS)
    }

    pub fn has_object_class(&self, object_class: &str) -> bool {
        self.object_classes()
            .iter()
            .any(|oc| oc.eq_ignore_ascii_case(object_class))
    }

    /// Apply one modification item.
    pub fn apply(&mut self, modification: &Modification) -> SchemaResult<()> {
        let attribute = &modification.attribute;
        match modification.operation {
            ModificationOperation::Add => {
                self.add_values(attribute.id(), attribute.values().iter().cloned());
            }
            ModificationOperation::Remove if attribute.values().is_empty() => {
                self.remove(attribute.id())
                    .ok_or_else(|| SchemaError::not_found("attribute", attribute.id()))?;
            }
            ModificationOperation::Remove => {
                self.remove_values(attribute.id(), attribute.values())?;
            }
            ModificationOperation::Replace => {
                self.put(attribute.id(), attribute.values().iter().cloned());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationOperation {
    Add,
    Remove,
    Replace,
}

/// One modification item: an operation on one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    pub operation: ModificationOperation,
    pub attribute: Attribute,
}

impl Modification {
    pub fn new(operation: ModificationOperation, attribute: Attribute) -> Self {
        Self {
            operation,
            attribute,
        }
    }

    pub fn add<I, S>(id: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ModificationOperation::Add, Attribute::new(id, values))
    }

    pub fn remove<I, S>(id: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ModificationOperation::Remove, Attribute::new(id, values))
    }

    pub fn replace<I, S>(id: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ModificationOperation::Replace, Attribute::new(id, values))
    }
}

/// What a meta-schema entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A schema grouping (`metaSchema`)
    MetaSchema,
    /// A schema definition of the given kind
    SchemaObject(SchemaObjectKind),
}

impl EntryKind {
    /// Classify an entry by its object classes.
    pub fn of(entry: &Entry) -> SchemaResult<Self> {
        if entry.has_object_class(META_SCHEMA_OC) {
            return Ok(EntryKind::MetaSchema);
        }
        entry
            .object_classes()
            .iter()
            .find_map(|oc| SchemaObjectKind::from_meta_object_class(oc))
            .map(EntryKind::SchemaObject)
            .ok_or_else(|| {
                SchemaError::unsupported(format!(
                    "entry {} is not a meta-schema entry",
                    entry.dn()
                ))
            })
    }
}

/// `cn=<schema>,ou=schema`
pub fn schema_dn(schema_name: &str) -> Dn {
    Dn::from_rdns(vec![Rdn::new(attrs::CN, schema_name), Rdn::new("ou", "schema")])
}

/// `m-oid=<oid>,ou=<container>,cn=<schema>,ou=schema`
pub fn meta_dn(kind: SchemaObjectKind, schema_name: &str, oid: &str) -> Dn {
    schema_dn(schema_name)
        .child(Rdn::new("ou", kind.container()))
        .child(Rdn::new(attrs::OID, oid))
}

/// The schema a meta-schema DN belongs to: the value of its `cn` RDN.
pub fn schema_name_from_dn(dn: &Dn) -> SchemaResult<String> {
    dn.value_of(attrs::CN)
        .map(str::to_string)
        .ok_or_else(|| SchemaError::invalid_syntax("DN does not name a schema", dn.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> Entry {
        Entry::new(meta_dn(SchemaObjectKind::AttributeType, "core", "2.5.4.4"))
            .with_attribute(attrs::OBJECT_CLASS, ["top", "metaTop", "metaAttributeType"])
            .with_attribute(attrs::OID, ["2.5.4.4"])
            .with_attribute(attrs::NAME, ["sn", "surname"])
    }

    #[test]
    fn test_meta_dn_layout() {
        let dn = meta_dn(SchemaObjectKind::AttributeType, "core", "2.5.4.4");
        assert_eq!(dn.to_string(), "m-oid=2.5.4.4,ou=attributeTypes,cn=core,ou=schema");
        assert_eq!(schema_name_from_dn(&dn).unwrap(), "core");
        assert_eq!(schema_name_from_dn(&schema_dn("nis")).unwrap(), "nis");
        assert!(schema_name_from_dn(&Dn::parse("ou=schema").unwrap()).is_err());
    }

    #[test]
    fn test_attribute_ids_are_case_insensitive() {
        let entry = entry();
        assert_eq!(entry.values("M-NAME"), ["sn", "surname"]);
        assert_eq!(entry.first("m-Oid"), Some("2.5.4.4"));
        assert!(entry.values("m-description").is_empty());
    }

    #[test]
    fn test_apply_modifications() {
        let mut entry = entry();
        entry
            .apply(&Modification::add(attrs::NAME, ["sn", "lastName"]))
            .unwrap();
        assert_eq!(entry.values(attrs::NAME), ["sn", "surname", "lastName"]);

        entry
            .apply(&Modification::remove(attrs::NAME, ["surname"]))
            .unwrap();
        assert_eq!(entry.values(attrs::NAME), ["sn", "lastName"]);

        entry
            .apply(&Modification::replace(attrs::DESCRIPTION, ["family name"]))
            .unwrap();
        assert_eq!(entry.first(attrs::DESCRIPTION), Some("family name"));

        entry
            .apply(&Modification::remove(attrs::DESCRIPTION, Vec::<String>::new()))
            .unwrap();
        assert!(!entry.contains(attrs::DESCRIPTION));
        assert!(
            entry
                .apply(&Modification::remove(attrs::DESCRIPTION, Vec::<String>::new()))
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn test_entry_kind_classification() {
        assert_eq!(
            EntryKind::of(&entry()).unwrap(),
            EntryKind::SchemaObject(SchemaObjectKind::AttributeType)
        );

        let schema = Entry::new(schema_dn("core"))
            .with_attribute(attrs::OBJECT_CLASS, ["top", "metaSchema"]);
        assert_eq!(EntryKind::of(&schema).unwrap(), EntryKind::MetaSchema);

        let person = Entry::new(Dn::parse("cn=alice,dc=example").unwrap())
            .with_attribute(attrs::OBJECT_CLASS, ["top", "person"]);
        assert!(matches!(
            EntryKind::of(&person),
            Err(SchemaError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_entry_serializes_dn_as_string() {
        let json = serde_json::to_value(entry()).unwrap();
        assert_eq!(
            json["dn"],
            "m-oid=2.5.4.4,ou=attributeTypes,cn=core,ou=schema"
        );
        assert_eq!(json["attributes"]["m-name"]["values"][1], "surname");
    }
}
