//! The entry point for directory operations on schema entries.

use super::{
    HandlerContext, MetaSchemaHandler, SchemaChangeHandler, SchemaLoader, SchemaManagerConfig,
    SchemaObjectHandler,
};
use crate::dn::{Dn, Rdn};
use crate::entry::{Attribute, Entry, EntryKind, Modification, ModificationOperation, attrs};
use crate::error::{SchemaError, SchemaResult};
use crate::registries::Registries;
use crate::schema::{
    AttributeType, Comparator, DitContentRule, DitStructureRule, MatchingRule, MatchingRuleUse,
    NameForm, Normalizer, ObjectClass, SchemaObjectKind, Syntax, SyntaxChecker,
};
use log::{info, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Applies directory operations on `ou=schema` entries to the catalog and the loader.
///
/// The manager is `Send + Sync`; concurrent operations serialize on the catalog lock.
pub struct SchemaManager {
    registries: Arc<Registries>,
    loader: Arc<dyn SchemaLoader>,
    config: SchemaManagerConfig,
    meta_schema: MetaSchemaHandler,
    handlers: HashMap<SchemaObjectKind, Box<dyn SchemaChangeHandler>>,
}

fn object_handler(kind: SchemaObjectKind) -> Box<dyn SchemaChangeHandler> {
    match kind {
        SchemaObjectKind::AttributeType => Box::new(SchemaObjectHandler::<AttributeType>::new()),
        SchemaObjectKind::ObjectClass => Box::new(SchemaObjectHandler::<ObjectClass>::new()),
        SchemaObjectKind::MatchingRule => Box::new(SchemaObjectHandler::<MatchingRule>::new()),
        SchemaObjectKind::MatchingRuleUse => {
            Box::new(SchemaObjectHandler::<MatchingRuleUse>::new())
        }
        SchemaObjectKind::Syntax => Box::new(SchemaObjectHandler::<Syntax>::new()),
        SchemaObjectKind::SyntaxChecker => Box::new(SchemaObjectHandler::<SyntaxChecker>::new()),
        SchemaObjectKind::Normalizer => Box::new(SchemaObjectHandler::<Normalizer>::new()),
        SchemaObjectKind::Comparator => Box::new(SchemaObjectHandler::<Comparator>::new()),
        SchemaObjectKind::NameForm => Box::new(SchemaObjectHandler::<NameForm>::new()),
        SchemaObjectKind::DitContentRule => Box::new(SchemaObjectHandler::<DitContentRule>::new()),
        SchemaObjectKind::DitStructureRule => {
            Box::new(SchemaObjectHandler::<DitStructureRule>::new())
        }
    }
}

impl SchemaManager {
    pub fn new(
        registries: Arc<Registries>,
        loader: Arc<dyn SchemaLoader>,
        config: SchemaManagerConfig,
    ) -> Self {
        let handlers = SchemaObjectKind::ALL
            .into_iter()
            .map(|kind| (kind, object_handler(kind)))
            .collect();
        Self {
            registries,
            loader,
            config,
            meta_schema: MetaSchemaHandler::new(),
            handlers,
        }
    }

    pub fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }

    pub fn loader(&self) -> &Arc<dyn SchemaLoader> {
        &self.loader
    }

    pub fn config(&self) -> &SchemaManagerConfig {
        &self.config
    }

    fn context(&self) -> HandlerContext<'_> {
        HandlerContext {
            registries: &self.registries,
            loader: self.loader.as_ref(),
            config: &self.config,
        }
    }

    fn handler_for(&self, entry: &Entry) -> SchemaResult<&dyn SchemaChangeHandler> {
        match EntryKind::of(entry)? {
            EntryKind::MetaSchema => Ok(&self.meta_schema),
            EntryKind::SchemaObject(kind) => self
                .handlers
                .get(&kind)
                .map(|handler| handler.as_ref())
                .ok_or_else(|| SchemaError::unsupported(format!("changes to {} entries", kind))),
        }
    }

    /// Run one operation against the handler of `entry`, logging the outcome.
    fn dispatch(
        &self,
        operation: &str,
        dn: &Dn,
        entry: &Entry,
        f: impl FnOnce(&dyn SchemaChangeHandler, &HandlerContext<'_>) -> SchemaResult<()>,
    ) -> SchemaResult<()> {
        let result = self
            .handler_for(entry)
            .and_then(|handler| f(handler, &self.context()));
        match &result {
            Ok(()) => info!("Schema {} of {} succeeded", operation, dn),
            Err(error) => warn!("Schema {} of {} failed: {}", operation, dn, error),
        }
        result
    }

    pub fn add(&self, dn: &Dn, entry: &Entry) -> SchemaResult<()> {
        self.dispatch("add", dn, entry, |handler, ctx| handler.add(ctx, dn, entry))
    }

    /// Delete an entry; with `cascade` its dependents go with it.
    pub fn delete(&self, dn: &Dn, entry: &Entry, cascade: bool) -> SchemaResult<()> {
        self.dispatch("delete", dn, entry, |handler, ctx| {
            handler.delete(ctx, dn, entry, cascade)
        })
    }

    pub fn rename(&self, dn: &Dn, entry: &Entry, new_rdn: &Rdn, cascade: bool) -> SchemaResult<()> {
        self.dispatch("rename", dn, entry, |handler, ctx| {
            handler.rename(ctx, dn, entry, new_rdn, cascade)
        })
    }

    pub fn move_entry(
        &self,
        dn: &Dn,
        new_parent: &Dn,
        entry: &Entry,
        cascade: bool,
    ) -> SchemaResult<()> {
        self.dispatch("move", dn, entry, |handler, ctx| {
            handler.move_entry(ctx, dn, new_parent, entry, cascade)
        })
    }

    /// Move and rename in one step.
    pub fn replace(
        &self,
        dn: &Dn,
        new_parent: &Dn,
        new_rdn: &Rdn,
        entry: &Entry,
        cascade: bool,
    ) -> SchemaResult<()> {
        self.dispatch("replace", dn, entry, |handler, ctx| {
            handler.replace(ctx, dn, new_parent, new_rdn, entry, cascade)
        })
    }

    /// Apply one operation to a set of attributes. Returns the modified entry.
    pub fn modify(
        &self,
        dn: &Dn,
        entry: &Entry,
        operation: ModificationOperation,
        attributes: &[Attribute],
    ) -> SchemaResult<Entry> {
        let items: Vec<Modification> = attributes
            .iter()
            .map(|attribute| Modification::new(operation, attribute.clone()))
            .collect();
        self.modify_items(dn, entry, &items)
    }

    /// Apply a list of modification items in order. Returns the modified entry.
    pub fn modify_items(
        &self,
        dn: &Dn,
        entry: &Entry,
        modifications: &[Modification],
    ) -> SchemaResult<Entry> {
        let mut modified = entry.clone();
        for modification in modifications {
            modified.apply(modification)?;
        }
        self.dispatch("modify", dn, entry, |handler, ctx| {
            handler.modify(ctx, dn, entry, &modified)
        })?;
        Ok(modified)
    }

    /// Enable or disable a schema by flipping its `m-disabled` flag.
    pub fn set_schema_enabled(&self, name: &str, enabled: bool) -> SchemaResult<()> {
        let info = self
            .loader
            .schema(name)?
            .ok_or_else(|| SchemaError::not_found("schema", name))?;
        let entry = info.to_entry();
        let flag = if enabled { "FALSE" } else { "TRUE" };
        self.modify_items(
            entry.dn(),
            &entry,
            &[Modification::replace(attrs::DISABLED, [flag])],
        )
        .map(|_| ())
    }
}

impl fmt::Debug for SchemaManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaManager")
            .field("config", &self.config)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
