//! Schema-aware DN normalization.

use super::{Ava, Dn, Rdn};
use crate::error::SchemaResult;
use crate::registries::RegistriesRef;
use crate::schema::ValueNormalizer;
use crate::value::Value;

/// Normalizes DNs through the catalog: every attribute type becomes its numeric OID and
/// every value goes through the type's equality normalizer. Multi-valued RDNs are then
/// put in canonical order.
///
/// Unknown attribute types fail with `NotFound`; binary input is rejected as an
/// unsupported input shape.
#[derive(Debug, Clone)]
pub struct DnNormalizer {
    registries: RegistriesRef,
}

impl DnNormalizer {
    pub fn new(registries: RegistriesRef) -> Self {
        Self { registries }
    }

    pub fn normalize_dn(&self, dn: &Dn) -> SchemaResult<Dn> {
        let registries = self.registries.upgrade()?;
        let mut rdns = Vec::with_capacity(dn.len());
        for rdn in dn.rdns() {
            let mut avas = Vec::with_capacity(rdn.avas().len());
            for ava in rdn.avas() {
                let mapping = registries.oid_normalizer(ava.attr_type())?;
                let value = match mapping.normalize(&Value::from(ava.value()))? {
                    Value::String(value) => value,
                    other => other.to_string(),
                };
                avas.push(Ava::new(mapping.oid(), value));
            }
            let mut normalized = Rdn::from_avas(avas)?;
            normalized.sort();
            rdns.push(normalized);
        }
        Ok(Dn::from_rdns(rdns))
    }

    /// Normalize a DN given either parsed or as its string form.
    pub fn normalize_value(&self, value: &Value) -> SchemaResult<Dn> {
        match value {
            Value::Dn(dn) => self.normalize_dn(dn),
            Value::String(raw) => self.normalize_dn(&Dn::parse(raw)?),
            Value::Binary(_) => Err(value.unsupported_shape("DnNormalizer")),
        }
    }
}

impl ValueNormalizer for DnNormalizer {
    fn normalize(&self, value: &Value) -> SchemaResult<Value> {
        self.normalize_value(value).map(Value::Dn)
    }
}
