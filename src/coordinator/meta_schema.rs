//! Change handling for schema descriptions (`cn=<schema>,ou=schema`).
//!
//! A schema is a named group of definitions with dependencies on other schemas. Its
//! `m-disabled` flag decides whether the definitions stored for it are part of the
//! catalog: enabling a schema decodes and registers all of them in one step, disabling it
//! unregisters them again.

use super::{HandlerContext, SchemaChange, SchemaChangeHandler, SchemaInfo};
use crate::dn::{Dn, Rdn};
use crate::entry::{Entry, attrs, decode_entry, meta_dn, schema_name_from_dn};
use crate::error::{SchemaError, SchemaResult};
use crate::registries::{CatalogState, ObjectRef};
use log::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetaSchemaHandler;

impl MetaSchemaHandler {
    pub fn new() -> Self {
        Self
    }

    fn stored(&self, ctx: &HandlerContext<'_>, dn: &Dn) -> SchemaResult<SchemaInfo> {
        let name = schema_name_from_dn(dn)?;
        ctx.loader
            .schema(&name)?
            .ok_or_else(|| SchemaError::not_found("schema", name))
    }

    /// Every dependency must exist, and an enabled schema may only depend on enabled ones.
    fn check_dependencies(&self, ctx: &HandlerContext<'_>, info: &SchemaInfo) -> SchemaResult<()> {
        for dependency in &info.dependencies {
            if dependency.eq_ignore_ascii_case(&info.name) {
                return Err(SchemaError::CyclicReference {
                    kind: "schema",
                    oid: info.name.clone(),
                });
            }
            let stored = ctx
                .loader
                .schema(dependency)?
                .ok_or_else(|| SchemaError::not_found("schema", dependency.as_str()))?;
            if !info.disabled && stored.disabled {
                return Err(SchemaError::unsupported(format!(
                    "enabled schema '{}' depending on disabled schema '{}'",
                    info.name, stored.name
                )));
            }
        }
        Ok(())
    }

    /// Names of the schemas depending on `name`, optionally only the enabled ones.
    fn dependent_schemas(
        &self,
        ctx: &HandlerContext<'_>,
        name: &str,
        enabled_only: bool,
    ) -> SchemaResult<Vec<String>> {
        Ok(ctx
            .loader
            .schemas()?
            .into_iter()
            .filter(|other| !other.name.eq_ignore_ascii_case(name))
            .filter(|other| other.depends_on(name))
            .filter(|other| !enabled_only || !other.disabled)
            .map(|other| other.name)
            .collect())
    }

    /// Decode and register every stored definition of `name`.
    fn enable(
        &self,
        ctx: &HandlerContext<'_>,
        state: &mut CatalogState,
        name: &str,
    ) -> SchemaResult<Vec<ObjectRef>> {
        let handle = ctx.handle();
        ctx.loader
            .entries(name)?
            .iter()
            .map(|entry| decode_entry(state, entry, name, &handle))
            .collect()
    }

    /// Unregister every definition of `name`.
    ///
    /// Fails when a definition of another schema depends on one of them, or when a
    /// definition has no stored entry to bring it back from.
    fn disable(
        &self,
        ctx: &HandlerContext<'_>,
        state: &mut CatalogState,
        name: &str,
    ) -> SchemaResult<Vec<ObjectRef>> {
        let objects = state.objects_in_schema(name);
        for object in &objects {
            let foreign: Vec<ObjectRef> = state
                .dependency_closure(object.kind, &object.oid)
                .into_iter()
                .filter(|dependent| !dependent.schema_name.eq_ignore_ascii_case(name))
                .collect();
            if !foreign.is_empty() {
                return Err(SchemaError::dependency_violation(
                    object.kind.label(),
                    object.oid.as_str(),
                    foreign,
                ));
            }
            if ctx
                .loader
                .entry(&meta_dn(object.kind, &object.schema_name, &object.oid))?
                .is_none()
            {
                return Err(SchemaError::unsupported(format!(
                    "disabling schema '{}': {} has no stored entry",
                    name, object
                )));
            }
        }
        for object in &objects {
            state.unregister(object.kind, &object.oid)?;
        }
        Ok(objects)
    }
}

impl SchemaChangeHandler for MetaSchemaHandler {
    fn add(&self, ctx: &HandlerContext<'_>, dn: &Dn, entry: &Entry) -> SchemaResult<()> {
        let info = SchemaInfo::from_entry(entry)?;
        if ctx.config.verify_rdn
            && (dn.len() != 2 || !schema_name_from_dn(dn)?.eq_ignore_ascii_case(&info.name))
        {
            return Err(SchemaError::invalid_syntax(
                format!("schema entries are named cn={},ou=schema", info.name),
                dn.to_string(),
            ));
        }
        if ctx.loader.schema(&info.name)?.is_some() {
            return Err(SchemaError::already_registered("schema", info.name));
        }
        self.check_dependencies(ctx, &info)?;

        let mut stored = entry.clone();
        stored.set_dn(dn.clone());
        ctx.loader.save_schema(info.clone())?;
        ctx.persist(&SchemaChange::add(stored))?;
        info!(
            "Added {} schema '{}'",
            if info.disabled { "disabled" } else { "enabled" },
            info.name
        );
        Ok(())
    }

    fn delete(
        &self,
        ctx: &HandlerContext<'_>,
        dn: &Dn,
        _entry: &Entry,
        cascade: bool,
    ) -> SchemaResult<()> {
        let info = self.stored(ctx, dn)?;
        let dependents = self.dependent_schemas(ctx, &info.name, false)?;
        if !dependents.is_empty() {
            return Err(SchemaError::dependency_violation(
                "schema",
                info.name,
                dependents,
            ));
        }

        let cross_schema = ctx.config.cross_schema_cascade;
        let removed = ctx.commit("delete schema", |state| {
            let objects = state.objects_in_schema(&info.name);
            if !objects.is_empty() && !cascade {
                return Err(SchemaError::dependency_violation(
                    "schema",
                    info.name.as_str(),
                    &objects,
                ));
            }
            for object in &objects {
                if state.contains(object.kind, &object.oid) {
                    state.remove_cascading(object.kind, &object.oid, true, cross_schema)?;
                }
            }

            let mut changes: Vec<SchemaChange> = ctx
                .loader
                .entries(&info.name)?
                .into_iter()
                .map(|entry| SchemaChange::delete(entry.dn().clone()))
                .collect();
            changes.push(SchemaChange::delete(dn.clone()));
            Ok((objects.len(), changes))
        })?;
        ctx.loader.remove_schema(&info.name)?;
        info!("Deleted schema '{}' with {} definitions", info.name, removed);
        Ok(())
    }

    fn rename(
        &self,
        ctx: &HandlerContext<'_>,
        dn: &Dn,
        entry: &Entry,
        new_rdn: &Rdn,
        _cascade: bool,
    ) -> SchemaResult<()> {
        let info = self.stored(ctx, dn)?;
        let new_name = new_rdn.value_of(attrs::CN).ok_or_else(|| {
            SchemaError::invalid_syntax("the RDN of a schema must be cn", new_rdn.to_string())
        })?;
        if ctx.loader.schema(new_name)?.is_some() {
            return Err(SchemaError::already_registered("schema", new_name));
        }

        let mut renamed = entry.clone();
        renamed.put(attrs::CN, [new_name]);
        renamed.set_dn(dn.parent().child(new_rdn.clone()));
        let relocated = ctx.commit("rename schema", |state| {
            let objects = state.objects_in_schema(&info.name);
            for object in &objects {
                state.relocate(object.kind, &object.oid, new_name)?;
            }
            Ok((objects.len(), vec![SchemaChange::rename(dn.clone(), renamed)]))
        })?;
        ctx.loader.rename_schema(&info.name, new_name)?;
        info!(
            "Renamed schema '{}' to '{}', relocating {} definitions",
            info.name, new_name, relocated
        );
        Ok(())
    }

    fn move_entry(
        &self,
        _ctx: &HandlerContext<'_>,
        dn: &Dn,
        _new_parent: &Dn,
        _entry: &Entry,
        _cascade: bool,
    ) -> SchemaResult<()> {
        Err(SchemaError::unsupported(format!("moving schema entry {}", dn)))
    }

    fn replace(
        &self,
        _ctx: &HandlerContext<'_>,
        dn: &Dn,
        _new_parent: &Dn,
        _new_rdn: &Rdn,
        _entry: &Entry,
        _cascade: bool,
    ) -> SchemaResult<()> {
        Err(SchemaError::unsupported(format!("moving schema entry {}", dn)))
    }

    fn modify(
        &self,
        ctx: &HandlerContext<'_>,
        dn: &Dn,
        _entry: &Entry,
        modified: &Entry,
    ) -> SchemaResult<()> {
        let current = self.stored(ctx, dn)?;
        let mut updated = SchemaInfo::from_entry(modified)?;
        if !updated.name.eq_ignore_ascii_case(&current.name) {
            return Err(SchemaError::unsupported(format!(
                "renaming schema '{}' through modify",
                current.name
            )));
        }
        updated.name = current.name.clone();
        self.check_dependencies(ctx, &updated)?;
        if !current.disabled && updated.disabled {
            let dependents = self.dependent_schemas(ctx, &current.name, true)?;
            if !dependents.is_empty() {
                return Err(SchemaError::dependency_violation(
                    "schema",
                    current.name,
                    dependents,
                ));
            }
        }

        let mut stored = modified.clone();
        stored.set_dn(dn.clone());
        let name = current.name.as_str();
        let touched = ctx.commit("modify schema", |state| {
            let touched = match (current.disabled, updated.disabled) {
                (true, false) => self.enable(ctx, state, name)?,
                (false, true) => self.disable(ctx, state, name)?,
                _ => Vec::new(),
            };
            ctx.loader.save_schema(updated.clone())?;
            Ok((touched, vec![SchemaChange::modify(stored)]))
        })?;

        match (current.disabled, updated.disabled) {
            (true, false) => info!("Enabled schema '{}' with {} definitions", name, touched.len()),
            (false, true) => info!(
                "Disabled schema '{}', unregistering {} definitions",
                name,
                touched.len()
            ),
            _ => info!("Updated schema '{}'", name),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{InMemorySchemaLoader, SchemaLoader, SchemaManagerConfig};
    use crate::entry::schema_dn;
    use crate::registries::Registries;

    fn context<'a>(
        registries: &'a Registries,
        loader: &'a InMemorySchemaLoader,
        config: &'a SchemaManagerConfig,
    ) -> HandlerContext<'a> {
        HandlerContext {
            registries,
            loader,
            config,
        }
    }

    #[test]
    fn test_add_requires_existing_enabled_dependencies() {
        let registries = Registries::bootstrap().unwrap();
        let loader = InMemorySchemaLoader::bootstrap()
            .with_schema(SchemaInfo::new("attic").with_disabled(true), []);
        let config = SchemaManagerConfig::default();
        let ctx = context(&registries, &loader, &config);
        let handler = MetaSchemaHandler::new();

        let missing = SchemaInfo::new("shop").with_dependencies(["nowhere"]).to_entry();
        assert!(matches!(
            handler.add(&ctx, missing.dn(), &missing),
            Err(SchemaError::NotFound { .. })
        ));

        let on_disabled = SchemaInfo::new("shop").with_dependencies(["attic"]).to_entry();
        assert!(matches!(
            handler.add(&ctx, on_disabled.dn(), &on_disabled),
            Err(SchemaError::Unsupported { .. })
        ));

        let disabled_too = SchemaInfo::new("shop")
            .with_dependencies(["attic"])
            .with_disabled(true)
            .to_entry();
        handler.add(&ctx, disabled_too.dn(), &disabled_too).unwrap();
        assert!(loader.schema("shop").unwrap().is_some());
        assert!(matches!(
            handler.add(&ctx, disabled_too.dn(), &disabled_too),
            Err(SchemaError::AlreadyRegistered { .. })
        ));
    }

    #[test]
    fn test_self_dependency_is_cyclic() {
        let registries = Registries::bootstrap().unwrap();
        let loader = InMemorySchemaLoader::bootstrap();
        let config = SchemaManagerConfig::default();
        let ctx = context(&registries, &loader, &config);

        let entry = SchemaInfo::new("loop").with_dependencies(["loop"]).to_entry();
        assert!(matches!(
            MetaSchemaHandler::new().add(&ctx, entry.dn(), &entry),
            Err(SchemaError::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_delete_refuses_depended_on_schema() {
        let registries = Registries::bootstrap().unwrap();
        let loader = InMemorySchemaLoader::bootstrap();
        let config = SchemaManagerConfig::default();
        let ctx = context(&registries, &loader, &config);
        let system = loader.schema("system").unwrap().unwrap().to_entry();

        let error = MetaSchemaHandler::new()
            .delete(&ctx, &schema_dn("system"), &system, true)
            .unwrap_err();
        assert!(error.to_string().contains("core"));
        assert!(registries.attribute_types().has("cn"));
    }

    #[test]
    fn test_disable_needs_stored_entries() {
        let registries = Registries::bootstrap().unwrap();
        let loader = InMemorySchemaLoader::bootstrap();
        let config = SchemaManagerConfig::default();
        let ctx = context(&registries, &loader, &config);
        let core = loader.schema("core").unwrap().unwrap();
        let disabled = core.clone().with_disabled(true).to_entry();

        let result =
            MetaSchemaHandler::new().modify(&ctx, &schema_dn("core"), &core.to_entry(), &disabled);
        assert!(matches!(result, Err(SchemaError::Unsupported { .. })));
        assert!(registries.object_classes().has("person"));
        assert!(loader.is_enabled("core"));
    }

    /// Delegates to an in-memory loader but refuses to persist changes.
    struct RejectingLoader(InMemorySchemaLoader);

    impl SchemaLoader for RejectingLoader {
        fn schema(&self, name: &str) -> SchemaResult<Option<SchemaInfo>> {
            self.0.schema(name)
        }

        fn schemas(&self) -> SchemaResult<Vec<SchemaInfo>> {
            self.0.schemas()
        }

        fn entries(&self, schema_name: &str) -> SchemaResult<Vec<Entry>> {
            self.0.entries(schema_name)
        }

        fn entry(&self, dn: &Dn) -> SchemaResult<Option<Entry>> {
            self.0.entry(dn)
        }

        fn save_schema(&self, info: SchemaInfo) -> SchemaResult<()> {
            self.0.save_schema(info)
        }

        fn remove_schema(&self, name: &str) -> SchemaResult<Option<SchemaInfo>> {
            self.0.remove_schema(name)
        }

        fn rename_schema(&self, from: &str, to: &str) -> SchemaResult<()> {
            self.0.rename_schema(from, to)
        }

        fn store(&self, _change: &SchemaChange) -> SchemaResult<()> {
            Err(SchemaError::loader("read-only"))
        }
    }

    #[test]
    fn test_failed_persist_keeps_schema_description() {
        let registries = Registries::bootstrap().unwrap();
        let loader = RejectingLoader(
            InMemorySchemaLoader::bootstrap()
                .with_schema(SchemaInfo::new("shop").with_dependencies(["core"]), []),
        );
        let config = SchemaManagerConfig::default();
        let ctx = HandlerContext {
            registries: &registries,
            loader: &loader,
            config: &config,
        };
        let handler = MetaSchemaHandler::new();
        let shop = loader.schema("shop").unwrap().unwrap().to_entry();

        assert!(matches!(
            handler.delete(&ctx, shop.dn(), &shop, true),
            Err(SchemaError::Loader { .. })
        ));
        assert!(loader.schema("shop").unwrap().is_some());

        let result = handler.rename(&ctx, shop.dn(), &shop, &Rdn::new(attrs::CN, "store"), false);
        assert!(matches!(result, Err(SchemaError::Loader { .. })));
        assert!(loader.schema("shop").unwrap().is_some());
        assert!(loader.schema("store").unwrap().is_none());
    }

    #[test]
    fn test_move_is_unsupported() {
        let registries = Registries::bootstrap().unwrap();
        let loader = InMemorySchemaLoader::bootstrap();
        let config = SchemaManagerConfig::default();
        let ctx = context(&registries, &loader, &config);
        let core = loader.schema("core").unwrap().unwrap().to_entry();

        let result = MetaSchemaHandler::new().move_entry(
            &ctx,
            core.dn(),
            &Dn::parse("ou=elsewhere").unwrap(),
            &core,
            false,
        );
        assert!(matches!(result, Err(SchemaError::Unsupported { .. })));
    }
}
