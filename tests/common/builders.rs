//! Builders for meta-schema entries.

use ldap_schema::Entry;
use ldap_schema::dn::Dn;
use ldap_schema::entry::{attrs, meta_dn};
use ldap_schema::schema::SchemaObjectKind;

/// Builds the entry of one definition below `cn=<schema>,ou=schema`.
pub struct MetaEntryBuilder {
    kind: SchemaObjectKind,
    schema: String,
    oid: String,
    entry: Entry,
}

impl MetaEntryBuilder {
    pub fn new(kind: SchemaObjectKind, schema: &str, oid: &str) -> Self {
        let entry = Entry::new(meta_dn(kind, schema, oid))
            .with_attribute(attrs::OBJECT_CLASS, ["top", kind.meta_object_class()])
            .with_attribute(attrs::OID, [oid]);
        Self {
            kind,
            schema: schema.to_string(),
            oid: oid.to_string(),
            entry,
        }
    }

    pub fn attribute_type(schema: &str, oid: &str) -> Self {
        Self::new(SchemaObjectKind::AttributeType, schema, oid)
    }

    pub fn object_class(schema: &str, oid: &str) -> Self {
        Self::new(SchemaObjectKind::ObjectClass, schema, oid)
    }

    pub fn names(mut self, names: &[&str]) -> Self {
        self.entry.put(attrs::NAME, names.iter().copied());
        self
    }

    pub fn with(mut self, id: &str, values: &[&str]) -> Self {
        self.entry.put(id, values.iter().copied());
        self
    }

    pub fn dn(&self) -> Dn {
        meta_dn(self.kind, &self.schema, &self.oid)
    }

    pub fn build(self) -> Entry {
        self.entry
    }
}

/// `attributetype ( <oid> NAME '<name>' SUP name )` as an entry.
pub fn string_attribute(schema: &str, oid: &str, name: &str) -> Entry {
    MetaEntryBuilder::attribute_type(schema, oid)
        .names(&[name])
        .with(attrs::SUP_ATTRIBUTE_TYPE, &["name"])
        .build()
}

/// An auxiliary object class allowing `may`.
pub fn auxiliary_class(schema: &str, oid: &str, name: &str, may: &[&str]) -> Entry {
    MetaEntryBuilder::object_class(schema, oid)
        .names(&[name])
        .with(attrs::SUP_OBJECT_CLASS, &["top"])
        .with(attrs::TYPE_OBJECT_CLASS, &["AUXILIARY"])
        .with(attrs::MAY, may)
        .build()
}
