//! Catalog state guarded by the registries lock.
//!
//! Everything in here assumes the caller holds the lock; the methods never block and
//! never call back into [`super::Registries`].

use super::object_registry::{AnyRegistry, TypedRegistry};
use super::oid_registry::OidRegistry;
use crate::error::{SchemaError, SchemaResult};
use crate::oid::{Oid, is_oid};
use crate::schema::{
    AttributeType, Comparator, DitContentRule, DitStructureRule, MatchingRule, MatchingRuleUse,
    NameForm, Normalizer, ObjectClass, Registered, SchemaObject, SchemaObjectKind, Syntax,
    SyntaxChecker,
};
use log::debug;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::sync::Arc;

/// A registered object, identified by kind and OID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef {
    pub kind: SchemaObjectKind,
    pub oid: String,
    pub schema_name: String,
}

impl ObjectRef {
    pub fn of(object: &dyn SchemaObject) -> Self {
        Self {
            kind: object.kind(),
            oid: object.oid().to_string(),
            schema_name: object.schema_name().to_string(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.oid)
    }
}

/// Outcome of re-keying an object to a new OID.
#[derive(Debug, Clone, Default)]
pub struct Rekeyed {
    /// Objects of other kinds that shared the old OID and moved along
    pub companions: Vec<ObjectRef>,
    /// Objects whose stored references were rewritten to the new OID
    pub rewritten: Vec<ObjectRef>,
}

/// The identifier registry plus the eleven typed registries.
#[derive(Clone, Default)]
pub struct CatalogState {
    pub(crate) oids: OidRegistry,
    pub(crate) attribute_types: TypedRegistry<AttributeType>,
    pub(crate) object_classes: TypedRegistry<ObjectClass>,
    pub(crate) matching_rules: TypedRegistry<MatchingRule>,
    pub(crate) matching_rule_uses: TypedRegistry<MatchingRuleUse>,
    pub(crate) syntaxes: TypedRegistry<Syntax>,
    pub(crate) syntax_checkers: TypedRegistry<SyntaxChecker>,
    pub(crate) normalizers: TypedRegistry<Normalizer>,
    pub(crate) comparators: TypedRegistry<Comparator>,
    pub(crate) name_forms: TypedRegistry<NameForm>,
    pub(crate) dit_content_rules: TypedRegistry<DitContentRule>,
    pub(crate) dit_structure_rules: TypedRegistry<DitStructureRule>,
}

impl fmt::Debug for CatalogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogState")
            .field("oids", &self.oids.len())
            .field("objects", &self.all().iter().map(|r| r.objects().len()).sum::<usize>())
            .finish()
    }
}

impl CatalogState {
    fn all(&self) -> [&dyn AnyRegistry; 11] {
        [
            &self.attribute_types,
            &self.object_classes,
            &self.matching_rules,
            &self.matching_rule_uses,
            &self.syntaxes,
            &self.syntax_checkers,
            &self.normalizers,
            &self.comparators,
            &self.name_forms,
            &self.dit_content_rules,
            &self.dit_structure_rules,
        ]
    }

    fn all_mut(&mut self) -> [&mut dyn AnyRegistry; 11] {
        [
            &mut self.attribute_types,
            &mut self.object_classes,
            &mut self.matching_rules,
            &mut self.matching_rule_uses,
            &mut self.syntaxes,
            &mut self.syntax_checkers,
            &mut self.normalizers,
            &mut self.comparators,
            &mut self.name_forms,
            &mut self.dit_content_rules,
            &mut self.dit_structure_rules,
        ]
    }

    fn of(&self, kind: SchemaObjectKind) -> &dyn AnyRegistry {
        match kind {
            SchemaObjectKind::AttributeType => &self.attribute_types,
            SchemaObjectKind::ObjectClass => &self.object_classes,
            SchemaObjectKind::MatchingRule => &self.matching_rules,
            SchemaObjectKind::MatchingRuleUse => &self.matching_rule_uses,
            SchemaObjectKind::Syntax => &self.syntaxes,
            SchemaObjectKind::SyntaxChecker => &self.syntax_checkers,
            SchemaObjectKind::Normalizer => &self.normalizers,
            SchemaObjectKind::Comparator => &self.comparators,
            SchemaObjectKind::NameForm => &self.name_forms,
            SchemaObjectKind::DitContentRule => &self.dit_content_rules,
            SchemaObjectKind::DitStructureRule => &self.dit_structure_rules,
        }
    }

    fn of_mut(&mut self, kind: SchemaObjectKind) -> &mut dyn AnyRegistry {
        match kind {
            SchemaObjectKind::AttributeType => &mut self.attribute_types,
            SchemaObjectKind::ObjectClass => &mut self.object_classes,
            SchemaObjectKind::MatchingRule => &mut self.matching_rules,
            SchemaObjectKind::MatchingRuleUse => &mut self.matching_rule_uses,
            SchemaObjectKind::Syntax => &mut self.syntaxes,
            SchemaObjectKind::SyntaxChecker => &mut self.syntax_checkers,
            SchemaObjectKind::Normalizer => &mut self.normalizers,
            SchemaObjectKind::Comparator => &mut self.comparators,
            SchemaObjectKind::NameForm => &mut self.name_forms,
            SchemaObjectKind::DitContentRule => &mut self.dit_content_rules,
            SchemaObjectKind::DitStructureRule => &mut self.dit_structure_rules,
        }
    }

    /// Resolve a reference of `kind` to the OID it designates.
    pub(crate) fn resolve(&self, kind: SchemaObjectKind, id: &str) -> Option<String> {
        let id = id.trim();
        if is_oid(id) {
            Some(id.to_string())
        } else if kind.allows_name_lookup() {
            self.oids.get_oid(id).ok()
        } else {
            None
        }
    }

    pub(crate) fn lookup<T: Registered>(&self, id: &str) -> SchemaResult<Arc<T>> {
        self.resolve(T::KIND, id)
            .and_then(|oid| T::registry(self).get(&oid))
            .ok_or_else(|| SchemaError::not_found(T::KIND.label(), id))
    }

    pub(crate) fn get(&self, kind: SchemaObjectKind, oid: &str) -> Option<Arc<dyn SchemaObject>> {
        self.of(kind).get_dyn(oid)
    }

    pub(crate) fn contains(&self, kind: SchemaObjectKind, oid: &str) -> bool {
        self.of(kind).contains(oid)
    }

    pub(crate) fn register<T: Registered>(&mut self, object: Arc<T>) -> SchemaResult<Arc<T>> {
        let oid = Oid::new(object.oid())?.into_string();
        self.check_oid_available(T::KIND, &oid)?;
        if T::KIND.allows_name_lookup() {
            self.check_names(object.names(), &oid)?;
        }
        T::registry_mut(self).insert(Arc::clone(&object));
        if T::KIND.allows_name_lookup() {
            self.sync_names(&oid)?;
        }
        debug!(
            "Registered {} {} ({}) in schema '{}'",
            T::KIND,
            oid,
            object.name(),
            object.schema_name()
        );
        Ok(object)
    }

    /// Swap an already registered object for a new definition with the same OID.
    ///
    /// Names the new definition drops must not be referenced by any other object.
    pub(crate) fn replace<T: Registered>(&mut self, object: Arc<T>) -> SchemaResult<Arc<T>> {
        let oid = object.oid().to_string();
        if !T::registry(self).contains(&oid) {
            return Err(SchemaError::not_found(T::KIND.label(), oid));
        }
        if T::KIND.allows_name_lookup() {
            self.check_names(object.names(), &oid)?;
            let dropped = self.dropped_names(T::KIND, object.names(), &oid);
            let dependents = self.referring_by_name(T::KIND, &oid, &dropped);
            if !dependents.is_empty() {
                return Err(SchemaError::dependency_violation(
                    T::KIND.label(),
                    oid,
                    dependents,
                ));
            }
        }
        T::registry_mut(self).insert(Arc::clone(&object));
        if T::KIND.allows_name_lookup() {
            self.sync_names(&oid)?;
        }
        debug!("Replaced {} {}", T::KIND, oid);
        Ok(object)
    }

    /// Remove one object without any dependency check.
    pub(crate) fn unregister(
        &mut self,
        kind: SchemaObjectKind,
        oid: &str,
    ) -> SchemaResult<Arc<dyn SchemaObject>> {
        let removed = self
            .of_mut(kind)
            .remove(oid)
            .ok_or_else(|| SchemaError::not_found(kind.label(), oid))?;
        if kind.allows_name_lookup() {
            self.sync_names(oid)?;
        }
        Ok(removed)
    }

    /// Objects directly referring to the object `(kind, oid)`.
    pub(crate) fn dependents(&self, kind: SchemaObjectKind, oid: &str) -> Vec<ObjectRef> {
        let mut found = Vec::new();
        for registry in self.all() {
            for object in registry.objects() {
                if object.kind() == kind && object.oid() == oid {
                    continue;
                }
                let depends = object.references().iter().any(|reference| {
                    reference.kind == kind
                        && self.resolve(kind, &reference.id).as_deref() == Some(oid)
                });
                if depends {
                    found.push(ObjectRef::of(object.as_ref()));
                }
            }
        }
        found
    }

    /// Transitive dependents of `(kind, oid)`, nearest first, the object itself excluded.
    pub(crate) fn dependency_closure(&self, kind: SchemaObjectKind, oid: &str) -> Vec<ObjectRef> {
        let mut seen = BTreeSet::from([(kind, oid.to_string())]);
        let mut queue = VecDeque::from([(kind, oid.to_string())]);
        let mut closure = Vec::new();
        while let Some((kind, oid)) = queue.pop_front() {
            for dependent in self.dependents(kind, &oid) {
                if seen.insert((dependent.kind, dependent.oid.clone())) {
                    queue.push_back((dependent.kind, dependent.oid.clone()));
                    closure.push(dependent);
                }
            }
        }
        closure
    }

    /// Remove `(kind, oid)`, and with `cascade` everything depending on it.
    ///
    /// Without `cascade` any dependent fails the removal. With it, dependents owned by
    /// another schema still fail it unless `cross_schema` is set. Returns the removed
    /// objects, the target first.
    pub(crate) fn remove_cascading(
        &mut self,
        kind: SchemaObjectKind,
        oid: &str,
        cascade: bool,
        cross_schema: bool,
    ) -> SchemaResult<Vec<ObjectRef>> {
        let target = self
            .get(kind, oid)
            .ok_or_else(|| SchemaError::not_found(kind.label(), oid))?;
        let closure = self.dependency_closure(kind, oid);
        if !closure.is_empty() {
            if !cascade {
                return Err(SchemaError::dependency_violation(
                    kind.label(),
                    oid,
                    self.dependents(kind, oid),
                ));
            }
            let foreign: Vec<&ObjectRef> = closure
                .iter()
                .filter(|dependent| dependent.schema_name != target.schema_name())
                .collect();
            if !cross_schema && !foreign.is_empty() {
                return Err(SchemaError::dependency_violation(kind.label(), oid, foreign));
            }
        }

        let mut removed = vec![ObjectRef::of(target.as_ref())];
        for dependent in closure.into_iter().rev() {
            self.unregister(dependent.kind, &dependent.oid)?;
            removed.push(dependent);
        }
        self.unregister(kind, oid)?;
        debug!("Removed {} {} with {} dependents", kind, oid, removed.len() - 1);
        Ok(removed)
    }

    /// Move `(kind, from)` to OID `to`.
    ///
    /// Objects of other kinds sharing `from` move with it, and references stored as the
    /// literal old OID are rewritten. Both only happen with `cascade`; otherwise their
    /// presence fails the operation. References by name keep resolving.
    pub(crate) fn rekey(
        &mut self,
        kind: SchemaObjectKind,
        from: &str,
        to: &str,
        cascade: bool,
    ) -> SchemaResult<Rekeyed> {
        let to = Oid::new(to)?.into_string();
        if !self.contains(kind, from) {
            return Err(SchemaError::not_found(kind.label(), from));
        }
        if from == to {
            return Ok(Rekeyed::default());
        }
        if let Some(taken) = self.all().into_iter().find(|registry| registry.contains(&to)) {
            return Err(SchemaError::already_registered(taken.kind().label(), to));
        }

        let moving: Vec<SchemaObjectKind> = self
            .all()
            .into_iter()
            .filter(|registry| registry.contains(from))
            .map(|registry| registry.kind())
            .collect();
        let companions: Vec<ObjectRef> = moving
            .iter()
            .filter(|moving_kind| **moving_kind != kind)
            .filter_map(|moving_kind| self.get(*moving_kind, from))
            .map(|object| ObjectRef::of(object.as_ref()))
            .collect();
        let mut rewritten = Vec::new();
        for registry in self.all() {
            for object in registry.objects() {
                if moving.contains(&object.kind()) && object.oid() == from {
                    continue;
                }
                let literal = object
                    .references()
                    .iter()
                    .any(|reference| moving.contains(&reference.kind) && reference.id == from);
                if literal {
                    rewritten.push(ObjectRef::of(object.as_ref()));
                }
            }
        }
        if !cascade && (!companions.is_empty() || !rewritten.is_empty()) {
            return Err(SchemaError::dependency_violation(
                kind.label(),
                from,
                companions.iter().chain(rewritten.iter()),
            ));
        }

        for moving_kind in &moving {
            self.of_mut(*moving_kind).rekey(from, &to);
        }
        if moving.iter().any(|moving_kind| moving_kind.allows_name_lookup()) {
            self.oids.rekey(from, &to)?;
        }
        for moving_kind in &moving {
            for registry in self.all_mut() {
                registry.rewrite_references(*moving_kind, from, &to);
            }
        }
        debug!("Re-keyed {} {} to {}", kind, from, to);
        Ok(Rekeyed {
            companions,
            rewritten,
        })
    }

    /// Change the owning schema of `(kind, oid)`.
    pub(crate) fn relocate(
        &mut self,
        kind: SchemaObjectKind,
        oid: &str,
        schema_name: &str,
    ) -> SchemaResult<()> {
        if self.of_mut(kind).relocate(oid, schema_name) {
            Ok(())
        } else {
            Err(SchemaError::not_found(kind.label(), oid))
        }
    }

    /// Objects owned by `schema_name` (case-insensitive), ordered by kind then OID.
    pub(crate) fn objects_in_schema(&self, schema_name: &str) -> Vec<ObjectRef> {
        self.all()
            .into_iter()
            .flat_map(|registry| registry.objects())
            .filter(|object| object.schema_name().eq_ignore_ascii_case(schema_name))
            .map(|object| ObjectRef::of(object.as_ref()))
            .collect()
    }

    /// Names bound to `oid` that would be released if the `kind` holder claimed only `names`.
    fn dropped_names(&self, kind: SchemaObjectKind, names: &[String], oid: &str) -> Vec<String> {
        let mut kept: Vec<String> = names.iter().map(|name| name.trim().to_lowercase()).collect();
        for registry in self.all() {
            let other = registry.kind();
            if other == kind || !other.allows_name_lookup() {
                continue;
            }
            if let Some(holder) = registry.get_dyn(oid) {
                kept.extend(holder.names().iter().map(|name| name.trim().to_lowercase()));
            }
        }
        self.oids
            .get_name_set(oid)
            .unwrap_or_default()
            .into_iter()
            .map(|name| name.to_lowercase())
            .filter(|name| name != oid && !kept.contains(name))
            .collect()
    }

    /// Objects other than `(kind, oid)` holding a reference spelled as one of `names`.
    fn referring_by_name(
        &self,
        kind: SchemaObjectKind,
        oid: &str,
        names: &[String],
    ) -> Vec<ObjectRef> {
        if names.is_empty() {
            return Vec::new();
        }
        let mut found = Vec::new();
        for registry in self.all() {
            for object in registry.objects() {
                if object.kind() == kind && object.oid() == oid {
                    continue;
                }
                let by_name = object.references().iter().any(|reference| {
                    reference.kind.allows_name_lookup()
                        && names.contains(&reference.id.trim().to_lowercase())
                });
                if by_name {
                    found.push(ObjectRef::of(object.as_ref()));
                }
            }
        }
        found
    }

    fn check_oid_available(&self, kind: SchemaObjectKind, oid: &str) -> SchemaResult<()> {
        for registry in self.all() {
            let other = registry.kind();
            if registry.contains(oid) && (other == kind || !kind.may_share_oid_with(other)) {
                return Err(SchemaError::already_registered(other.label(), oid));
            }
        }
        Ok(())
    }

    fn check_names(&self, names: &[String], oid: &str) -> SchemaResult<()> {
        names
            .iter()
            .try_for_each(|name| self.oids.check(name, oid))
    }

    /// Make the names bound to `oid` match the names claimed by the named objects
    /// currently registered under it, keeping the existing order.
    fn sync_names(&mut self, oid: &str) -> SchemaResult<()> {
        let holders: Vec<Arc<dyn SchemaObject>> = self
            .all()
            .into_iter()
            .filter(|registry| registry.kind().allows_name_lookup())
            .filter_map(|registry| registry.get_dyn(oid))
            .collect();
        if holders.is_empty() {
            self.oids.unregister(oid);
            return Ok(());
        }

        let mut claimed: Vec<String> = Vec::new();
        for name in holders.iter().flat_map(|holder| holder.names()) {
            let name = name.trim();
            if !claimed.iter().any(|c| c.eq_ignore_ascii_case(name)) {
                claimed.push(name.to_string());
            }
        }
        if claimed.is_empty() {
            claimed.push(oid.to_string());
        }

        if let Ok(current) = self.oids.get_name_set(oid) {
            for name in current {
                if !claimed.iter().any(|c| c.to_lowercase() == name.to_lowercase()) {
                    self.oids.unregister_name(&name);
                }
            }
        }
        for name in &claimed {
            self.oids.register(name, oid)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registries::RegistriesRef;

    fn at(oid: &str) -> AttributeType {
        AttributeType::new(oid, &RegistriesRef::detached())
    }

    #[test]
    fn test_oid_sharing_rules() {
        let mut state = CatalogState::default();
        let handle = RegistriesRef::detached();
        state
            .register(Arc::new(MatchingRule::new("2.5.13.2", &handle)))
            .unwrap();
        state
            .register(Arc::new(MatchingRuleUse::new("2.5.13.2", &handle)))
            .unwrap();

        let error = state.register(Arc::new(at("2.5.13.2"))).unwrap_err();
        match error {
            SchemaError::AlreadyRegistered { kind, oid } => {
                assert_eq!(kind, "matching rule");
                assert_eq!(oid, "2.5.13.2");
            }
            other => panic!("Expected AlreadyRegistered error, got: {:?}", other),
        }
        assert!(
            state
                .register(Arc::new(MatchingRule::new("2.5.13.2", &handle)))
                .is_err()
        );
    }

    #[test]
    fn test_unnamed_object_binds_its_oid() {
        let mut state = CatalogState::default();
        state.register(Arc::new(at("1.2.3.4"))).unwrap();
        assert_eq!(state.oids.get_primary_name("1.2.3.4").unwrap(), "1.2.3.4");

        state.unregister(SchemaObjectKind::AttributeType, "1.2.3.4").unwrap();
        assert!(!state.oids.has_oid("1.2.3.4"));
    }

    #[test]
    fn test_shared_oid_keeps_names_of_remaining_holder() {
        let mut state = CatalogState::default();
        let handle = RegistriesRef::detached();
        state
            .register(Arc::new(
                MatchingRule::new("2.5.13.2", &handle).with_names(["caseIgnoreMatch"]),
            ))
            .unwrap();
        state
            .register(Arc::new(
                MatchingRuleUse::new("2.5.13.2", &handle)
                    .with_names(["caseIgnoreMatch", "ciMatchUse"]),
            ))
            .unwrap();
        assert_eq!(state.oids.get_oid("ciMatchUse").unwrap(), "2.5.13.2");

        state
            .unregister(SchemaObjectKind::MatchingRuleUse, "2.5.13.2")
            .unwrap();
        assert!(!state.oids.has_oid("ciMatchUse"));
        assert_eq!(state.oids.get_oid("caseIgnoreMatch").unwrap(), "2.5.13.2");
    }

    #[test]
    fn test_name_conflict_leaves_state_untouched() {
        let mut state = CatalogState::default();
        state
            .register(Arc::new(at("2.5.4.3").with_names(["cn"])))
            .unwrap();
        let error = state
            .register(Arc::new(at("2.5.4.4").with_names(["sn", "CN"])))
            .unwrap_err();

        assert!(matches!(error, SchemaError::NameConflict { .. }));
        assert!(!state.contains(SchemaObjectKind::AttributeType, "2.5.4.4"));
        assert!(!state.oids.has_oid("sn"));
    }

    #[test]
    fn test_dependents_resolve_names() {
        let mut state = CatalogState::default();
        state
            .register(Arc::new(at("2.5.4.41").with_names(["name"])))
            .unwrap();
        state
            .register(Arc::new(at("2.5.4.3").with_names(["cn"]).with_superior("NAME")))
            .unwrap();
        state
            .register(Arc::new(at("2.5.4.99").with_superior("2.5.4.3")))
            .unwrap();

        let direct = state.dependents(SchemaObjectKind::AttributeType, "2.5.4.41");
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].oid, "2.5.4.3");

        let closure = state.dependency_closure(SchemaObjectKind::AttributeType, "2.5.4.41");
        let oids: Vec<_> = closure.iter().map(|d| d.oid.as_str()).collect();
        assert_eq!(oids, vec!["2.5.4.3", "2.5.4.99"]);
    }

    #[test]
    fn test_remove_cascading_policies() {
        let mut state = CatalogState::default();
        state
            .register(Arc::new(at("1.1.1").with_names(["base"]).with_schema("s1")))
            .unwrap();
        state
            .register(Arc::new(at("1.1.2").with_superior("base").with_schema("s1")))
            .unwrap();
        state
            .register(Arc::new(at("1.1.3").with_superior("1.1.2").with_schema("s2")))
            .unwrap();

        let kind = SchemaObjectKind::AttributeType;
        assert!(matches!(
            state.remove_cascading(kind, "1.1.1", false, false),
            Err(SchemaError::DependencyViolation { .. })
        ));
        match state.remove_cascading(kind, "1.1.1", true, false).unwrap_err() {
            SchemaError::DependencyViolation { dependents, .. } => {
                assert_eq!(dependents, vec!["attribute type 1.1.3"]);
            }
            other => panic!("Expected DependencyViolation error, got: {:?}", other),
        }
        assert_eq!(state.attribute_types.len(), 3);

        let removed = state.remove_cascading(kind, "1.1.1", true, true).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(state.attribute_types.len(), 0);
        assert!(!state.oids.has_oid("base"));
    }

    #[test]
    fn test_replace_keeps_names_still_referenced() {
        let mut state = CatalogState::default();
        state
            .register(Arc::new(at("1.1.1").with_names(["base", "root"])))
            .unwrap();
        state
            .register(Arc::new(at("1.1.2").with_superior("Base")))
            .unwrap();

        match state
            .replace(Arc::new(at("1.1.1").with_names(["bottom"])))
            .unwrap_err()
        {
            SchemaError::DependencyViolation { dependents, .. } => {
                assert_eq!(dependents, vec!["attribute type 1.1.2"]);
            }
            other => panic!("Expected DependencyViolation error, got: {:?}", other),
        }
        assert_eq!(state.oids.get_oid("base").unwrap(), "1.1.1");
        assert!(!state.oids.has_oid("bottom"));

        state
            .replace(Arc::new(at("1.1.1").with_names(["base", "bottom"])))
            .unwrap();
        assert!(!state.oids.has_oid("root"));
        assert_eq!(state.oids.get_oid("bottom").unwrap(), "1.1.1");
    }

    #[test]
    fn test_rekey_requires_cascade_for_literal_references() {
        let mut state = CatalogState::default();
        state
            .register(Arc::new(at("1.1.1").with_names(["base"])))
            .unwrap();
        state
            .register(Arc::new(at("1.1.2").with_superior("1.1.1")))
            .unwrap();
        state
            .register(Arc::new(at("1.1.3").with_superior("base")))
            .unwrap();

        let kind = SchemaObjectKind::AttributeType;
        assert!(state.rekey(kind, "1.1.1", "1.1.9", false).is_err());
        assert!(state.rekey(kind, "1.1.1", "1.1.2", true).is_err());

        let rekeyed = state.rekey(kind, "1.1.1", "1.1.9", true).unwrap();
        assert_eq!(rekeyed.rewritten.len(), 1);
        let child: Arc<AttributeType> = state.lookup("1.1.2").unwrap();
        assert_eq!(child.superior_oid(), Some("1.1.9"));
        assert_eq!(state.oids.get_oid("base").unwrap(), "1.1.9");
        assert_eq!(state.dependents(kind, "1.1.9").len(), 2);
    }
}
