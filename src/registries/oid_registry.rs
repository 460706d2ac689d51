//! Identifier registry binding names to OIDs.
//!
//! All named schema objects share one namespace: a name (case-insensitive) resolves to at
//! most one OID, while an OID may carry several names. The first name bound to an OID is
//! its primary name.

use super::Registries;
use crate::error::{SchemaError, SchemaResult};
use crate::oid::is_oid;
use std::collections::{BTreeMap, HashMap};

/// Bidirectional name/OID mapping.
#[derive(Debug, Clone, Default)]
pub struct OidRegistry {
    by_name: HashMap<String, String>,
    by_oid: BTreeMap<String, Vec<String>>,
}

impl OidRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a binding without applying it.
    pub fn check(&self, name: &str, oid: &str) -> SchemaResult<()> {
        if !is_oid(oid) {
            return Err(SchemaError::invalid_syntax("not a numeric OID", oid));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(SchemaError::invalid_syntax("empty name", oid));
        }
        if is_oid(name) && name != oid {
            return Err(SchemaError::NameConflict {
                name: name.to_string(),
                existing: name.to_string(),
                requested: oid.to_string(),
            });
        }
        match self.by_name.get(&name.to_lowercase()) {
            Some(existing) if existing != oid => Err(SchemaError::NameConflict {
                name: name.to_string(),
                existing: existing.clone(),
                requested: oid.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Bind `name` to `oid`. Binding an existing pair again is a no-op.
    pub fn register(&mut self, name: &str, oid: &str) -> SchemaResult<()> {
        self.check(name, oid)?;
        let name = name.trim();
        let key = name.to_lowercase();
        if self.by_name.contains_key(&key) {
            return Ok(());
        }
        self.by_name.insert(key, oid.to_string());
        self.by_oid
            .entry(oid.to_string())
            .or_default()
            .push(name.to_string());
        Ok(())
    }

    /// Resolve a name or OID. OIDs are returned as given, registered or not.
    pub fn get_oid(&self, name_or_oid: &str) -> SchemaResult<String> {
        let id = name_or_oid.trim();
        if is_oid(id) {
            return Ok(id.to_string());
        }
        self.by_name
            .get(&id.to_lowercase())
            .cloned()
            .ok_or_else(|| SchemaError::not_found("name or OID", name_or_oid))
    }

    /// Whether the name or OID is bound.
    pub fn has_oid(&self, name_or_oid: &str) -> bool {
        let id = name_or_oid.trim();
        if is_oid(id) {
            self.by_oid.contains_key(id)
        } else {
            self.by_name.contains_key(&id.to_lowercase())
        }
    }

    pub fn get_primary_name(&self, oid: &str) -> SchemaResult<String> {
        self.by_oid
            .get(oid)
            .and_then(|names| names.first())
            .cloned()
            .ok_or_else(|| SchemaError::not_found("OID", oid))
    }

    /// Names bound to `oid`, primary first.
    pub fn get_name_set(&self, oid: &str) -> SchemaResult<Vec<String>> {
        self.by_oid
            .get(oid)
            .cloned()
            .ok_or_else(|| SchemaError::not_found("OID", oid))
    }

    /// Registered OIDs in ascending order.
    pub fn list(&self) -> impl Iterator<Item = &str> {
        self.by_oid.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_oid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_oid.is_empty()
    }

    /// Snapshot of lowercase name to OID.
    pub fn name_map(&self) -> HashMap<String, String> {
        self.by_name.clone()
    }

    /// Snapshot of OID to its names.
    pub fn oid_map(&self) -> BTreeMap<String, Vec<String>> {
        self.by_oid.clone()
    }

    /// Remove an OID and every name bound to it.
    pub fn unregister(&mut self, oid: &str) -> bool {
        match self.by_oid.remove(oid) {
            Some(names) => {
                for name in names {
                    self.by_name.remove(&name.to_lowercase());
                }
                true
            }
            None => false,
        }
    }

    /// Remove a single name; the OID goes too once its last name is gone.
    pub(crate) fn unregister_name(&mut self, name: &str) {
        let key = name.to_lowercase();
        let Some(oid) = self.by_name.remove(&key) else {
            return;
        };
        if let Some(names) = self.by_oid.get_mut(&oid) {
            names.retain(|n| n.to_lowercase() != key);
            if names.is_empty() {
                self.by_oid.remove(&oid);
            }
        }
    }

    /// Move every binding of `from` to `to`. An OID used as its own name is renamed along.
    pub(crate) fn rekey(&mut self, from: &str, to: &str) -> SchemaResult<()> {
        if self.by_oid.contains_key(to) {
            return Err(SchemaError::already_registered("OID", to));
        }
        let Some(names) = self.by_oid.remove(from) else {
            return Ok(());
        };
        let names: Vec<String> = names
            .into_iter()
            .map(|name| if name == from { to.to_string() } else { name })
            .collect();
        self.by_name.remove(from);
        for name in &names {
            self.by_name.insert(name.to_lowercase(), to.to_string());
        }
        self.by_oid.insert(to.to_string(), names);
        Ok(())
    }
}

/// Live view of the identifier registry inside a [`Registries`] aggregate.
///
/// Every call takes the catalog lock for its own duration only.
#[derive(Debug, Clone, Copy)]
pub struct OidRegistryHandle<'a> {
    registries: &'a Registries,
}

impl<'a> OidRegistryHandle<'a> {
    pub(crate) fn new(registries: &'a Registries) -> Self {
        Self { registries }
    }

    pub fn register(&self, name: &str, oid: &str) -> SchemaResult<()> {
        self.registries
            .write("register name", |state| state.oids.register(name, oid))
    }

    pub fn get_oid(&self, name_or_oid: &str) -> SchemaResult<String> {
        self.registries
            .read("resolve name", |state| state.oids.get_oid(name_or_oid))
    }

    pub fn has_oid(&self, name_or_oid: &str) -> bool {
        self.registries
            .read("check name", |state| Ok(state.oids.has_oid(name_or_oid)))
            .unwrap_or(false)
    }

    pub fn get_primary_name(&self, oid: &str) -> SchemaResult<String> {
        self.registries
            .read("primary name", |state| state.oids.get_primary_name(oid))
    }

    pub fn get_name_set(&self, oid: &str) -> SchemaResult<Vec<String>> {
        self.registries
            .read("name set", |state| state.oids.get_name_set(oid))
    }

    /// Registered OIDs in ascending order.
    pub fn list(&self) -> SchemaResult<Vec<String>> {
        self.registries
            .read("list OIDs", |state| Ok(state.oids.list().map(String::from).collect()))
    }

    pub fn name_map(&self) -> SchemaResult<HashMap<String, String>> {
        self.registries
            .read("name map", |state| Ok(state.oids.name_map()))
    }

    pub fn oid_map(&self) -> SchemaResult<BTreeMap<String, Vec<String>>> {
        self.registries.read("OID map", |state| Ok(state.oids.oid_map()))
    }

    pub fn unregister(&self, oid: &str) -> SchemaResult<bool> {
        self.registries
            .write("unregister OID", |state| Ok(state.oids.unregister(oid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve_case_insensitive() {
        let mut registry = OidRegistry::new();
        registry.register("cn", "2.5.4.3").unwrap();
        registry.register("commonName", "2.5.4.3").unwrap();

        assert_eq!(registry.get_oid("CN").unwrap(), "2.5.4.3");
        assert_eq!(registry.get_oid("COMMONNAME").unwrap(), "2.5.4.3");
        assert_eq!(registry.get_oid("2.5.4.3").unwrap(), "2.5.4.3");
        assert_eq!(registry.get_primary_name("2.5.4.3").unwrap(), "cn");
        assert_eq!(
            registry.get_name_set("2.5.4.3").unwrap(),
            vec!["cn", "commonName"]
        );
        assert!(registry.has_oid("Cn"));
        assert!(!registry.has_oid("sn"));
    }

    #[test]
    fn test_name_conflict() {
        let mut registry = OidRegistry::new();
        registry.register("cn", "2.5.4.3").unwrap();
        registry.register("cn", "2.5.4.3").unwrap();

        match registry.register("CN", "2.5.4.4").unwrap_err() {
            SchemaError::NameConflict {
                existing,
                requested,
                ..
            } => {
                assert_eq!(existing, "2.5.4.3");
                assert_eq!(requested, "2.5.4.4");
            }
            other => panic!("Expected NameConflict error, got: {:?}", other),
        }
        assert_eq!(registry.get_name_set("2.5.4.3").unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_bindings() {
        let mut registry = OidRegistry::new();
        assert!(registry.register("cn", "not-an-oid").is_err());
        assert!(registry.register("  ", "2.5.4.3").is_err());
        assert!(registry.register("2.5.4.4", "2.5.4.3").is_err());
        assert!(registry.get_oid("unknown").unwrap_err().is_not_found());
    }

    #[test]
    fn test_unregister_removes_all_names() {
        let mut registry = OidRegistry::new();
        registry.register("sn", "2.5.4.4").unwrap();
        registry.register("surname", "2.5.4.4").unwrap();
        assert!(registry.unregister("2.5.4.4"));

        assert!(!registry.has_oid("surname"));
        assert!(!registry.has_oid("2.5.4.4"));
        assert!(!registry.unregister("2.5.4.4"));
    }

    #[test]
    fn test_rekey_moves_names() {
        let mut registry = OidRegistry::new();
        registry.register("fooMatch", "1.2.3").unwrap();
        registry.register("1.2.9", "1.2.9").unwrap();
        registry.rekey("1.2.3", "1.2.4").unwrap();
        registry.rekey("1.2.9", "1.2.10").unwrap();

        assert_eq!(registry.get_oid("foomatch").unwrap(), "1.2.4");
        assert!(!registry.has_oid("1.2.3"));
        assert_eq!(registry.get_primary_name("1.2.10").unwrap(), "1.2.10");
        assert!(registry.rekey("1.2.4", "1.2.10").is_err());
    }
}
