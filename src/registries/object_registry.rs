//! Typed registries, one per schema object kind.

use super::monitor::{LoggingMonitor, RegistryMonitor};
use super::{OidNormalizer, Registries};
use crate::error::SchemaResult;
use crate::schema::{AttributeType, Registered, SchemaObject, SchemaObjectKind};
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Storage of one kind of schema object, keyed by numeric OID.
pub struct TypedRegistry<T> {
    objects: BTreeMap<String, Arc<T>>,
    monitor: Arc<dyn RegistryMonitor<T>>,
}

impl<T: Registered> Default for TypedRegistry<T> {
    fn default() -> Self {
        Self {
            objects: BTreeMap::new(),
            monitor: Arc::new(LoggingMonitor),
        }
    }
}

impl<T> Clone for TypedRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            objects: self.objects.clone(),
            monitor: Arc::clone(&self.monitor),
        }
    }
}

impl<T: Registered> fmt::Debug for TypedRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedRegistry")
            .field("kind", &T::KIND)
            .field("len", &self.objects.len())
            .finish()
    }
}

impl<T: Registered> TypedRegistry<T> {
    pub(crate) fn get(&self, oid: &str) -> Option<Arc<T>> {
        self.objects.get(oid).cloned()
    }

    pub(crate) fn insert(&mut self, object: Arc<T>) {
        self.objects.insert(object.oid().to_string(), object);
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &Arc<T>> {
        self.objects.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.objects.len()
    }

    pub(crate) fn monitor(&self) -> Arc<dyn RegistryMonitor<T>> {
        Arc::clone(&self.monitor)
    }
}

/// Kind-erased view over a [`TypedRegistry`], used for scans across all kinds.
pub(crate) trait AnyRegistry {
    fn kind(&self) -> SchemaObjectKind;

    fn contains(&self, oid: &str) -> bool;

    fn get_dyn(&self, oid: &str) -> Option<Arc<dyn SchemaObject>>;

    fn objects(&self) -> Vec<Arc<dyn SchemaObject>>;

    fn remove(&mut self, oid: &str) -> Option<Arc<dyn SchemaObject>>;

    fn rekey(&mut self, from: &str, to: &str) -> bool;

    fn relocate(&mut self, oid: &str, schema_name: &str) -> bool;

    /// Rewrite literal references of `kind` from `from` to `to`; returns the OIDs of the
    /// objects that changed.
    fn rewrite_references(&mut self, kind: SchemaObjectKind, from: &str, to: &str)
    -> Vec<String>;
}

impl<T: Registered> AnyRegistry for TypedRegistry<T> {
    fn kind(&self) -> SchemaObjectKind {
        T::KIND
    }

    fn contains(&self, oid: &str) -> bool {
        self.objects.contains_key(oid)
    }

    fn get_dyn(&self, oid: &str) -> Option<Arc<dyn SchemaObject>> {
        self.objects
            .get(oid)
            .map(|object| Arc::clone(object) as Arc<dyn SchemaObject>)
    }

    fn objects(&self) -> Vec<Arc<dyn SchemaObject>> {
        self.objects
            .values()
            .map(|object| Arc::clone(object) as Arc<dyn SchemaObject>)
            .collect()
    }

    fn remove(&mut self, oid: &str) -> Option<Arc<dyn SchemaObject>> {
        self.objects
            .remove(oid)
            .map(|object| object as Arc<dyn SchemaObject>)
    }

    fn rekey(&mut self, from: &str, to: &str) -> bool {
        let Some(object) = self.objects.remove(from) else {
            return false;
        };
        let mut moved = T::clone(&object);
        moved.info_mut().oid = to.to_string();
        self.objects.insert(to.to_string(), Arc::new(moved));
        true
    }

    fn relocate(&mut self, oid: &str, schema_name: &str) -> bool {
        let Some(object) = self.objects.get_mut(oid) else {
            return false;
        };
        let mut moved = T::clone(object);
        moved.info_mut().schema_name = schema_name.to_string();
        *object = Arc::new(moved);
        true
    }

    fn rewrite_references(
        &mut self,
        kind: SchemaObjectKind,
        from: &str,
        to: &str,
    ) -> Vec<String> {
        let mut changed = Vec::new();
        for (oid, object) in self.objects.iter_mut() {
            let refers = object
                .references()
                .iter()
                .any(|reference| reference.kind == kind && reference.id == from);
            if !refers {
                continue;
            }
            let mut rewritten = T::clone(object);
            if rewritten.rewrite_reference(kind, from, to) {
                *object = Arc::new(rewritten);
                changed.push(oid.clone());
            }
        }
        changed
    }
}

/// Handle on the typed registry of `T` inside a [`Registries`] aggregate.
///
/// Each call takes the catalog lock for its own duration. Monitor callbacks run after the
/// lock is released.
pub struct ObjectRegistry<'a, T> {
    registries: &'a Registries,
    kind: PhantomData<fn() -> T>,
}

impl<T> Clone for ObjectRegistry<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ObjectRegistry<'_, T> {}

impl<T: Registered> fmt::Debug for ObjectRegistry<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRegistry")
            .field("kind", &T::KIND)
            .finish()
    }
}

impl<'a, T: Registered> ObjectRegistry<'a, T> {
    pub(crate) fn new(registries: &'a Registries) -> Self {
        Self {
            registries,
            kind: PhantomData,
        }
    }

    pub fn kind(&self) -> SchemaObjectKind {
        T::KIND
    }

    /// Register an object under its OID and bind its names.
    ///
    /// Fails with `AlreadyRegistered` when the OID is taken by an object of the same kind
    /// or of a kind that may not share it, and with `NameConflict` when a name is bound
    /// to another OID.
    pub fn register(&self, object: T) -> SchemaResult<Arc<T>> {
        let object = Arc::new(object);
        let (result, monitor) = self.registries.write("register", |state| {
            let result = state.register(Arc::clone(&object));
            Ok((result, T::registry(state).monitor()))
        })?;
        match &result {
            Ok(registered) => monitor.registered(registered),
            Err(error) => monitor.register_failed(&object, error),
        }
        result
    }

    /// Look up by OID or, for named kinds, by name.
    pub fn lookup(&self, id: &str) -> SchemaResult<Arc<T>> {
        let (result, monitor) = self.registries.read("lookup", |state| {
            Ok((state.lookup::<T>(id), T::registry(state).monitor()))
        })?;
        match &result {
            Ok(object) => monitor.looked_up(object),
            Err(error) => monitor.lookup_failed(id, error),
        }
        result
    }

    pub fn get_schema_name(&self, id: &str) -> SchemaResult<String> {
        self.registries.read("get schema name", |state| {
            state
                .lookup::<T>(id)
                .map(|object| object.schema_name().to_string())
        })
    }

    /// Whether `id` resolves in this registry. Never fails.
    pub fn has(&self, id: &str) -> bool {
        self.registries
            .read("has", |state| Ok(state.lookup::<T>(id).is_ok()))
            .unwrap_or(false)
    }

    /// All objects, ordered by OID.
    pub fn list(&self) -> SchemaResult<std::vec::IntoIter<Arc<T>>> {
        self.registries
            .read("list", |state| {
                Ok(T::registry(state).values().cloned().collect::<Vec<_>>())
            })
            .map(Vec::into_iter)
    }

    /// Remove an object and release the names no other object of its OID claims.
    ///
    /// No dependency check happens here; objects still referring to the removed one fail
    /// lazily when they resolve it.
    pub fn unregister(&self, id: &str) -> SchemaResult<Arc<T>> {
        self.registries.write("unregister", |state| {
            let object = state.lookup::<T>(id)?;
            state.unregister(T::KIND, object.oid())?;
            debug!("Unregistered {} {}", T::KIND, object.oid());
            Ok(object)
        })
    }

    pub fn len(&self) -> usize {
        self.registries
            .read("len", |state| Ok(T::registry(state).len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the monitor of this registry.
    pub fn set_monitor(&self, monitor: Arc<dyn RegistryMonitor<T>>) -> SchemaResult<()> {
        self.registries.write("set monitor", |state| {
            T::registry_mut(state).monitor = monitor;
            Ok(())
        })
    }

    /// Report registrations made through a catalog transaction.
    pub(crate) fn notify_registered(&self, objects: &[Arc<T>]) {
        if objects.is_empty() {
            return;
        }
        if let Ok(monitor) = self
            .registries
            .read("monitor", |state| Ok(T::registry(state).monitor()))
        {
            for object in objects {
                monitor.registered(object);
            }
        }
    }
}

impl ObjectRegistry<'_, AttributeType> {
    /// Map every attribute type OID and lowercase name to its equality normalizer.
    ///
    /// Attribute types whose equality rule does not resolve are left out.
    pub fn normalizer_mapping(&self) -> SchemaResult<HashMap<String, OidNormalizer>> {
        let mut mapping = HashMap::new();
        for at in self.list()? {
            let normalizer = match self.registries.oid_normalizer(at.oid()) {
                Ok(normalizer) => normalizer,
                Err(error) => {
                    debug!("Skipping {} in normalizer mapping: {}", at.oid(), error);
                    continue;
                }
            };
            for name in at.names() {
                mapping.insert(name.to_lowercase(), normalizer.clone());
            }
            mapping.insert(at.oid().to_string(), normalizer);
        }
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::SchemaError;
    use crate::registries::Registries;
    use crate::schema::{AttributeType, ObjectClass, SchemaObject};
    use crate::value::Value;

    #[test]
    fn test_unregister_releases_names_without_dependency_check() {
        let registries = Registries::bootstrap().unwrap();
        let handle = registries.handle();
        let before = registries.attribute_types().len();
        registries
            .attribute_types()
            .register(
                AttributeType::new("1.3.6.1.4.1.42.1", &handle)
                    .with_names(["shoeSize"])
                    .with_superior("name"),
            )
            .unwrap();
        registries
            .object_classes()
            .register(ObjectClass::new("1.3.6.1.4.1.42.10", &handle).with_may(["shoeSize"]))
            .unwrap();
        assert_eq!(registries.attribute_types().len(), before + 1);

        let removed = registries.attribute_types().unregister("SHOESIZE").unwrap();
        assert_eq!(removed.oid(), "1.3.6.1.4.1.42.1");
        assert!(!registries.oids().has_oid("shoeSize"));
        assert_eq!(registries.attribute_types().len(), before);

        let shopper = registries.object_classes().lookup("1.3.6.1.4.1.42.10").unwrap();
        assert!(matches!(
            shopper.may_attribute_types(),
            Err(SchemaError::NotFound { .. })
        ));
    }

    #[test]
    fn test_list_is_ordered_by_oid() {
        let registries = Registries::bootstrap().unwrap();
        let oids: Vec<String> = registries
            .object_classes()
            .list()
            .unwrap()
            .map(|oc| oc.oid().to_string())
            .collect();
        let mut sorted = oids.clone();
        sorted.sort();
        assert_eq!(oids, sorted);
        assert!(oids.iter().any(|oid| oid == "2.5.6.6"));
    }

    #[test]
    fn test_normalizer_mapping_covers_names_and_oids() {
        let registries = Registries::bootstrap().unwrap();
        let mapping = registries.attribute_types().normalizer_mapping().unwrap();

        let by_name = mapping.get("commonname").expect("cn has an equality rule");
        let by_oid = mapping.get("2.5.4.3").expect("mapped by OID too");
        assert_eq!(by_name.oid(), by_oid.oid());
        assert_eq!(
            by_name.normalize(&"  Alice   Smith ".into()).unwrap(),
            Value::from("alice smith")
        );
    }
}
