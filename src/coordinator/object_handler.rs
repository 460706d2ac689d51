//! Change handling for definition entries (`m-oid=...` below a schema).
//!
//! One generic handler serves all eleven kinds; the kind decides only how an entry is
//! decoded ([`FromEntry`]). Definitions of a disabled schema are validated and persisted
//! but never reach the catalog.

use super::{HandlerContext, SchemaChange, SchemaChangeHandler};
use crate::dn::{Dn, Rdn};
use crate::entry::{Entry, EntryKind, FromEntry, attrs, meta_dn, schema_name_from_dn};
use crate::error::{SchemaError, SchemaResult};
use crate::oid::Oid;
use crate::registries::{CatalogState, ObjectRef};
use log::debug;
use std::marker::PhantomData;
use std::sync::Arc;

/// The OID an entry defines.
pub(crate) fn entry_oid(entry: &Entry) -> SchemaResult<String> {
    let raw = entry.first(attrs::OID).ok_or_else(|| {
        SchemaError::invalid_syntax("missing required attribute m-oid", entry.dn().to_string())
    })?;
    Ok(Oid::new(raw.trim())?.into_string())
}

/// Replace every literal occurrence of `from` outside the `m-oid` attribute.
fn rewrite_values(mut entry: Entry, from: &str, to: &str) -> Entry {
    let rewritten: Vec<(String, Vec<String>)> = entry
        .attributes()
        .filter(|attribute| !attribute.id().eq_ignore_ascii_case(attrs::OID))
        .filter(|attribute| attribute.values().iter().any(|value| value == from))
        .map(|attribute| {
            let values = attribute
                .values()
                .iter()
                .map(|value| if value == from { to.to_string() } else { value.clone() })
                .collect();
            (attribute.id().to_string(), values)
        })
        .collect();
    for (id, values) in rewritten {
        entry.put(&id, values);
    }
    entry
}

/// Handler for the definitions of one kind.
pub struct SchemaObjectHandler<T> {
    kind: PhantomData<fn() -> T>,
}

impl<T> Default for SchemaObjectHandler<T> {
    fn default() -> Self {
        Self { kind: PhantomData }
    }
}

impl<T: FromEntry> SchemaObjectHandler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_kind(&self, entry: &Entry) -> SchemaResult<()> {
        match EntryKind::of(entry)? {
            EntryKind::SchemaObject(kind) if kind == T::KIND => Ok(()),
            _ => Err(SchemaError::unsupported(format!(
                "handling {} as a {}",
                entry.dn(),
                T::KIND
            ))),
        }
    }

    /// The DN must be `m-oid=<oid>,ou=<container>,...` when RDN checks are on.
    fn check_dn(&self, ctx: &HandlerContext<'_>, dn: &Dn, oid: &str) -> SchemaResult<()> {
        if !ctx.config.verify_rdn {
            return Ok(());
        }
        let rdn_oid = dn.rdn().and_then(|rdn| rdn.value_of(attrs::OID));
        if rdn_oid.map(str::trim) != Some(oid) {
            return Err(SchemaError::invalid_syntax(
                format!("RDN does not match m-oid {}", oid),
                dn.to_string(),
            ));
        }
        self.check_container(ctx, &dn.parent())
    }

    fn check_container(&self, ctx: &HandlerContext<'_>, parent: &Dn) -> SchemaResult<()> {
        if !ctx.config.verify_rdn {
            return Ok(());
        }
        let container = parent.rdn().and_then(|rdn| rdn.value_of("ou"));
        match container {
            Some(container) if container.eq_ignore_ascii_case(T::KIND.container()) => Ok(()),
            _ => Err(SchemaError::invalid_syntax(
                format!("{} entries belong below ou={}", T::KIND, T::KIND.container()),
                parent.to_string(),
            )),
        }
    }

    fn existing_schema(&self, ctx: &HandlerContext<'_>, dn: &Dn) -> SchemaResult<String> {
        let name = schema_name_from_dn(dn)?;
        match ctx.loader.schema(&name)? {
            Some(info) => Ok(info.name),
            None => Err(SchemaError::not_found("schema", name)),
        }
    }

    /// The registered definition behind `oid` must be owned by the schema named in the DN.
    fn check_owner(&self, state: &CatalogState, oid: &str, schema: &str) -> SchemaResult<()> {
        match state.get(T::KIND, oid) {
            Some(object) if object.schema_name().eq_ignore_ascii_case(schema) => Ok(()),
            _ => Err(SchemaError::not_found(T::KIND.label(), oid)),
        }
    }

    fn decode(&self, ctx: &HandlerContext<'_>, entry: &Entry, schema_name: &str) -> SchemaResult<T> {
        T::from_entry(entry, schema_name, &ctx.handle())
    }

    fn announce(&self, ctx: &HandlerContext<'_>, registered: Option<Arc<T>>) {
        if let Some(object) = registered {
            ctx.registries.registry::<T>().notify_registered(&[object]);
        }
    }

    /// Catalog side of a rename; returns the renamed entry and the changes to persist.
    fn rename_in(
        &self,
        ctx: &HandlerContext<'_>,
        state: &mut CatalogState,
        dn: &Dn,
        entry: &Entry,
        new_rdn: &Rdn,
        cascade: bool,
    ) -> SchemaResult<(Entry, Vec<SchemaChange>)> {
        let schema = self.existing_schema(ctx, dn)?;
        let old_oid = entry_oid(entry)?;
        let new_oid = new_rdn.value_of(attrs::OID).ok_or_else(|| {
            SchemaError::invalid_syntax(
                format!("the RDN of a {} must be m-oid", T::KIND),
                new_rdn.to_string(),
            )
        })?;
        let new_oid = Oid::new(new_oid.trim())?.into_string();

        let mut renamed = entry.clone();
        renamed.put(attrs::OID, [new_oid.as_str()]);
        renamed.set_dn(dn.parent().child(new_rdn.clone()));
        if ctx.loader.entry(renamed.dn())?.is_some() {
            return Err(SchemaError::already_registered(T::KIND.label(), new_oid));
        }
        let mut changes = vec![SchemaChange::rename(dn.clone(), renamed.clone())];

        if !ctx.loader.is_enabled(&schema) {
            if ctx.loader.entry(dn)?.is_none() {
                return Err(SchemaError::not_found(T::KIND.label(), old_oid));
            }
        } else {
            self.check_owner(state, &old_oid, &schema)?;
            let rekeyed = state.rekey(T::KIND, &old_oid, &new_oid, cascade)?;
            for companion in &rekeyed.companions {
                let companion_dn = meta_dn(companion.kind, &companion.schema_name, &old_oid);
                if let Some(mut stored) = ctx.loader.entry(&companion_dn)? {
                    stored.put(attrs::OID, [new_oid.as_str()]);
                    stored.set_dn(meta_dn(companion.kind, &companion.schema_name, &new_oid));
                    changes.push(SchemaChange::rename(companion_dn, stored));
                }
            }
            for dependent in &rekeyed.rewritten {
                let dependent_dn = meta_dn(dependent.kind, &dependent.schema_name, &dependent.oid);
                if let Some(stored) = ctx.loader.entry(&dependent_dn)? {
                    changes.push(SchemaChange::modify(rewrite_values(stored, &old_oid, &new_oid)));
                }
            }
        }
        Ok((renamed, changes))
    }

    /// Catalog side of a move to another schema.
    fn move_in(
        &self,
        ctx: &HandlerContext<'_>,
        state: &mut CatalogState,
        dn: &Dn,
        new_parent: &Dn,
        entry: &Entry,
    ) -> SchemaResult<(Entry, Vec<SchemaChange>)> {
        let from = self.existing_schema(ctx, dn)?;
        let to = self.existing_schema(ctx, new_parent)?;
        self.check_container(ctx, new_parent)?;
        let oid = entry_oid(entry)?;
        let rdn = dn
            .rdn()
            .cloned()
            .ok_or_else(|| SchemaError::invalid_syntax("cannot move the root", dn.to_string()))?;

        let mut moved = entry.clone();
        moved.set_dn(new_parent.child(rdn));
        if ctx.loader.entry(moved.dn())?.is_some() {
            return Err(SchemaError::already_registered(T::KIND.label(), oid));
        }
        if ctx.loader.is_enabled(&from) {
            self.check_owner(state, &oid, &from)?;
        }

        match (ctx.loader.is_enabled(&from), ctx.loader.is_enabled(&to)) {
            (true, true) => state.relocate(T::KIND, &oid, &to)?,
            (true, false) => {
                state.remove_cascading(T::KIND, &oid, false, false)?;
            }
            (false, true) => {
                state.register(Arc::new(self.decode(ctx, &moved, &to)?))?;
            }
            (false, false) => {}
        }
        let change = SchemaChange::rename(dn.clone(), moved.clone());
        Ok((moved, vec![change]))
    }
}

impl<T: FromEntry> SchemaChangeHandler for SchemaObjectHandler<T> {
    fn add(&self, ctx: &HandlerContext<'_>, dn: &Dn, entry: &Entry) -> SchemaResult<()> {
        self.check_kind(entry)?;
        let oid = entry_oid(entry)?;
        self.check_dn(ctx, dn, &oid)?;
        let schema = self.existing_schema(ctx, dn)?;
        if ctx.loader.entry(dn)?.is_some() {
            return Err(SchemaError::already_registered(T::KIND.label(), oid));
        }

        let mut stored = entry.clone();
        stored.set_dn(dn.clone());
        let object = self.decode(ctx, &stored, &schema)?;
        let enabled = ctx.loader.is_enabled(&schema);
        let registered = ctx.commit("add", |state| {
            let registered = if enabled {
                Some(state.register(Arc::new(object))?)
            } else {
                None
            };
            Ok((registered, vec![SchemaChange::add(stored)]))
        })?;
        if registered.is_none() {
            debug!("Stored {} {} for disabled schema '{}'", T::KIND, oid, schema);
        }
        self.announce(ctx, registered);
        Ok(())
    }

    fn delete(
        &self,
        ctx: &HandlerContext<'_>,
        dn: &Dn,
        entry: &Entry,
        cascade: bool,
    ) -> SchemaResult<()> {
        self.check_kind(entry)?;
        let oid = entry_oid(entry)?;
        let schema = self.existing_schema(ctx, dn)?;
        let enabled = ctx.loader.is_enabled(&schema);
        if !enabled && ctx.loader.entry(dn)?.is_none() {
            return Err(SchemaError::not_found(T::KIND.label(), oid));
        }

        let cross_schema = ctx.config.cross_schema_cascade;
        let removed: Vec<ObjectRef> = ctx.commit("delete", |state| {
            let mut changes = vec![SchemaChange::delete(dn.clone())];
            if !enabled {
                return Ok((Vec::new(), changes));
            }
            self.check_owner(state, &oid, &schema)?;
            let removed = state.remove_cascading(T::KIND, &oid, cascade, cross_schema)?;
            for dependent in removed.iter().skip(1) {
                let dependent_dn = meta_dn(dependent.kind, &dependent.schema_name, &dependent.oid);
                if ctx.loader.entry(&dependent_dn)?.is_some() {
                    changes.push(SchemaChange::delete(dependent_dn));
                }
            }
            Ok((removed, changes))
        })?;
        if removed.len() > 1 {
            debug!(
                "Deleting {} {} cascaded to {} dependents",
                T::KIND,
                oid,
                removed.len() - 1
            );
        }
        Ok(())
    }

    fn rename(
        &self,
        ctx: &HandlerContext<'_>,
        dn: &Dn,
        entry: &Entry,
        new_rdn: &Rdn,
        cascade: bool,
    ) -> SchemaResult<()> {
        self.check_kind(entry)?;
        ctx.commit("rename", |state| {
            let (_, changes) = self.rename_in(ctx, state, dn, entry, new_rdn, cascade)?;
            Ok(((), changes))
        })
    }

    /// Moving never cascades: a definition other registered objects depend on cannot
    /// leave the catalog, whatever `cascade` says.
    fn move_entry(
        &self,
        ctx: &HandlerContext<'_>,
        dn: &Dn,
        new_parent: &Dn,
        entry: &Entry,
        _cascade: bool,
    ) -> SchemaResult<()> {
        self.check_kind(entry)?;
        let from = self.existing_schema(ctx, dn)?;
        if !ctx.loader.is_enabled(&from) && ctx.loader.entry(dn)?.is_none() {
            return Err(SchemaError::not_found(T::KIND.label(), entry_oid(entry)?));
        }
        ctx.commit("move", |state| {
            let (_, changes) = self.move_in(ctx, state, dn, new_parent, entry)?;
            Ok(((), changes))
        })
    }

    fn replace(
        &self,
        ctx: &HandlerContext<'_>,
        dn: &Dn,
        new_parent: &Dn,
        new_rdn: &Rdn,
        entry: &Entry,
        cascade: bool,
    ) -> SchemaResult<()> {
        self.check_kind(entry)?;
        ctx.commit("replace", |state| {
            let (renamed, mut changes) = self.rename_in(ctx, state, dn, entry, new_rdn, cascade)?;
            let (_, moved) = self.move_in(ctx, state, renamed.dn(), new_parent, &renamed)?;
            changes.extend(moved);
            Ok(((), changes))
        })
    }

    fn modify(
        &self,
        ctx: &HandlerContext<'_>,
        dn: &Dn,
        entry: &Entry,
        modified: &Entry,
    ) -> SchemaResult<()> {
        self.check_kind(modified)?;
        let oid = entry_oid(entry)?;
        if entry_oid(modified)? != oid {
            return Err(SchemaError::unsupported(format!(
                "changing the OID of {} {} through modify",
                T::KIND,
                oid
            )));
        }
        let schema = self.existing_schema(ctx, dn)?;
        let mut stored = modified.clone();
        stored.set_dn(dn.clone());
        let object = self.decode(ctx, &stored, &schema)?;
        let enabled = ctx.loader.is_enabled(&schema);
        if !enabled && ctx.loader.entry(dn)?.is_none() {
            return Err(SchemaError::not_found(T::KIND.label(), oid));
        }

        let replaced = ctx.commit("modify", |state| {
            let replaced = if enabled {
                self.check_owner(state, &oid, &schema)?;
                Some(state.replace(Arc::new(object))?)
            } else {
                None
            };
            Ok((replaced, vec![SchemaChange::modify(stored)]))
        })?;
        if let Some(object) = replaced {
            debug!("{} {} now named {:?}", T::KIND, object.oid(), object.names());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{InMemorySchemaLoader, SchemaInfo, SchemaLoader, SchemaManagerConfig};
    use crate::registries::Registries;
    use crate::schema::{AttributeType, SchemaObjectKind};

    const SHOE_SIZE: &str = "1.3.6.1.4.1.42.1";

    fn shoe_size(schema: &str) -> Entry {
        Entry::new(meta_dn(SchemaObjectKind::AttributeType, schema, SHOE_SIZE))
            .with_attribute(attrs::OBJECT_CLASS, ["top", "metaAttributeType"])
            .with_attribute(attrs::OID, [SHOE_SIZE])
            .with_attribute(attrs::NAME, ["shoeSize"])
            .with_attribute(attrs::EQUALITY, ["integerMatch"])
            .with_attribute(attrs::SYNTAX, ["1.3.6.1.4.1.1466.115.121.1.27"])
    }

    fn fixture() -> (Arc<Registries>, InMemorySchemaLoader, SchemaManagerConfig) {
        let loader = InMemorySchemaLoader::bootstrap()
            .with_schema(SchemaInfo::new("shop").with_dependencies(["core"]), [])
            .with_schema(SchemaInfo::new("attic").with_disabled(true), []);
        (
            Registries::bootstrap().unwrap(),
            loader,
            SchemaManagerConfig::default(),
        )
    }

    #[test]
    fn test_entry_oid_is_validated() {
        let entry = shoe_size("shop");
        assert_eq!(entry_oid(&entry).unwrap(), SHOE_SIZE);

        let mut broken = entry.clone();
        broken.put(attrs::OID, ["not an oid"]);
        assert!(matches!(
            entry_oid(&broken),
            Err(SchemaError::InvalidSyntax { .. })
        ));
    }

    #[test]
    fn test_rewrite_values_skips_own_oid() {
        let entry = Entry::new(Dn::root())
            .with_attribute(attrs::OID, ["1.2.3"])
            .with_attribute(attrs::MUST, ["1.2.3", "cn"]);
        let rewritten = rewrite_values(entry, "1.2.3", "1.2.4");
        assert_eq!(rewritten.values(attrs::OID), ["1.2.3"]);
        assert_eq!(rewritten.values(attrs::MUST), ["1.2.4", "cn"]);
    }

    #[test]
    fn test_add_checks_rdn_and_container() {
        let (registries, loader, config) = fixture();
        let ctx = HandlerContext {
            registries: &registries,
            loader: &loader,
            config: &config,
        };
        let handler = SchemaObjectHandler::<AttributeType>::new();
        let entry = shoe_size("shop");

        let wrong_rdn = meta_dn(SchemaObjectKind::AttributeType, "shop", "1.3.6.1.4.1.42.9");
        assert!(handler.add(&ctx, &wrong_rdn, &entry).is_err());
        let wrong_container = meta_dn(SchemaObjectKind::ObjectClass, "shop", SHOE_SIZE);
        assert!(handler.add(&ctx, &wrong_container, &entry).is_err());

        handler.add(&ctx, entry.dn(), &entry).unwrap();
        assert_eq!(
            registries.attribute_types().get_schema_name("shoeSize").unwrap(),
            "shop"
        );
        assert!(matches!(
            handler.add(&ctx, entry.dn(), &entry),
            Err(SchemaError::AlreadyRegistered { .. })
        ));
    }

    #[test]
    fn test_disabled_schema_only_persists() {
        let (registries, loader, config) = fixture();
        let ctx = HandlerContext {
            registries: &registries,
            loader: &loader,
            config: &config,
        };
        let handler = SchemaObjectHandler::<AttributeType>::new();
        let entry = shoe_size("attic");

        handler.add(&ctx, entry.dn(), &entry).unwrap();
        assert!(!registries.attribute_types().has(SHOE_SIZE));
        assert_eq!(loader.entries("attic").unwrap().len(), 1);

        handler.delete(&ctx, entry.dn(), &entry, false).unwrap();
        assert!(loader.entries("attic").unwrap().is_empty());
    }

    #[test]
    fn test_wrong_kind_is_unsupported() {
        let (registries, loader, config) = fixture();
        let ctx = HandlerContext {
            registries: &registries,
            loader: &loader,
            config: &config,
        };
        let entry = shoe_size("shop");
        let handler = SchemaObjectHandler::<crate::schema::ObjectClass>::new();
        assert!(matches!(
            handler.add(&ctx, entry.dn(), &entry),
            Err(SchemaError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_modify_keeps_oid() {
        let (registries, loader, config) = fixture();
        let ctx = HandlerContext {
            registries: &registries,
            loader: &loader,
            config: &config,
        };
        let handler = SchemaObjectHandler::<AttributeType>::new();
        let entry = shoe_size("shop");
        handler.add(&ctx, entry.dn(), &entry).unwrap();

        let mut renamed = entry.clone();
        renamed.put(attrs::NAME, ["footSize"]);
        handler.modify(&ctx, entry.dn(), &entry, &renamed).unwrap();
        assert!(registries.attribute_types().has("footSize"));
        assert!(!registries.oids().has_oid("shoeSize"));

        let mut rekeyed = renamed.clone();
        rekeyed.put(attrs::OID, ["1.3.6.1.4.1.42.2"]);
        assert!(matches!(
            handler.modify(&ctx, entry.dn(), &renamed, &rekeyed),
            Err(SchemaError::Unsupported { .. })
        ));
    }
}
