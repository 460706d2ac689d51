//! Schema change coordinator.
//!
//! Directory operations on entries below `ou=schema` are turned into catalog changes here.
//! [`SchemaManager`] classifies the target entry once and hands the operation to the
//! handler for its kind: [`MetaSchemaHandler`] for schema descriptions, a
//! [`SchemaObjectHandler`] for each of the eleven definition kinds.
//!
//! Each operation runs as one catalog transaction. The affected entries are persisted
//! through the [`SchemaLoader`] inside that transaction, so a failure anywhere leaves both
//! the catalog and the loader as they were.
//!
//! # Example Usage
//!
//! ```rust
//! use ldap_schema::coordinator::{InMemorySchemaLoader, SchemaManagerBuilder};
//! use ldap_schema::entry::{Entry, attrs, meta_dn};
//! use ldap_schema::schema::SchemaObjectKind;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = SchemaManagerBuilder::new()
//!     .with_loader(InMemorySchemaLoader::bootstrap())
//!     .build()?;
//!
//! let dn = meta_dn(SchemaObjectKind::AttributeType, "core", "1.3.6.1.4.1.42.1");
//! let entry = Entry::new(dn.clone())
//!     .with_attribute(attrs::OBJECT_CLASS, ["top", "metaAttributeType"])
//!     .with_attribute(attrs::OID, ["1.3.6.1.4.1.42.1"])
//!     .with_attribute(attrs::NAME, ["shoeSize"])
//!     .with_attribute(attrs::SUP_ATTRIBUTE_TYPE, ["name"]);
//! manager.add(&dn, &entry)?;
//!
//! assert!(manager.registries().attribute_types().has("shoeSize"));
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod manager;
pub mod meta_schema;
pub mod object_handler;

pub use loader::{ChangeOperation, InMemorySchemaLoader, SchemaChange, SchemaInfo, SchemaLoader};
pub use manager::SchemaManager;
pub use meta_schema::MetaSchemaHandler;
pub use object_handler::SchemaObjectHandler;

use crate::dn::{Dn, Rdn};
use crate::entry::Entry;
use crate::error::{SchemaError, SchemaResult};
use crate::registries::{CatalogState, Registries, RegistriesRef};
use log::info;
use std::sync::Arc;

/// Schema manager configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaManagerConfig {
    /// Whether a cascading delete may remove dependents owned by other schemas.
    pub cross_schema_cascade: bool,
    /// Whether the `m-oid` RDN of a definition entry must match its `m-oid` attribute.
    pub verify_rdn: bool,
}

impl Default for SchemaManagerConfig {
    fn default() -> Self {
        Self {
            cross_schema_cascade: false,
            verify_rdn: true,
        }
    }
}

/// Builder for [`SchemaManager`].
///
/// The registries default to a fresh bootstrap catalog; a loader is required.
#[derive(Default)]
pub struct SchemaManagerBuilder {
    registries: Option<Arc<Registries>>,
    loader: Option<Arc<dyn SchemaLoader>>,
    config: SchemaManagerConfig,
}

impl SchemaManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registries(mut self, registries: Arc<Registries>) -> Self {
        self.registries = Some(registries);
        self
    }

    pub fn with_loader(mut self, loader: impl SchemaLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Share a loader the caller keeps a handle to.
    pub fn with_shared_loader(mut self, loader: Arc<dyn SchemaLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_config(mut self, config: SchemaManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cross_schema_cascade(mut self, enabled: bool) -> Self {
        self.config.cross_schema_cascade = enabled;
        self
    }

    pub fn build(self) -> SchemaResult<SchemaManager> {
        let loader = self
            .loader
            .ok_or_else(|| SchemaError::loader("no schema loader configured"))?;
        let registries = match self.registries {
            Some(registries) => registries,
            None => Registries::bootstrap()?,
        };
        Ok(SchemaManager::new(registries, loader, self.config))
    }
}

/// What a handler works against.
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    pub registries: &'a Registries,
    pub loader: &'a dyn SchemaLoader,
    pub config: &'a SchemaManagerConfig,
}

impl HandlerContext<'_> {
    pub fn handle(&self) -> RegistriesRef {
        self.registries.handle()
    }

    /// Apply `f` to a draft of the catalog and persist the changes it returns.
    ///
    /// The draft is published only when `f` and every `store` succeed.
    pub(crate) fn commit<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut CatalogState) -> SchemaResult<(R, Vec<SchemaChange>)>,
    ) -> SchemaResult<R> {
        self.registries.transaction(operation, |state| {
            let (result, changes) = f(state)?;
            for change in &changes {
                self.persist(change)?;
            }
            Ok(result)
        })
    }

    /// Hand one change to the loader.
    pub(crate) fn persist(&self, change: &SchemaChange) -> SchemaResult<()> {
        self.loader.store(change)?;
        info!("Stored {} of {} [{}]", change.operation, change.dn, change.id);
        Ok(())
    }
}

/// One kind of entry's reaction to directory operations below `ou=schema`.
pub trait SchemaChangeHandler: Send + Sync {
    fn add(&self, ctx: &HandlerContext<'_>, dn: &Dn, entry: &Entry) -> SchemaResult<()>;

    fn delete(
        &self,
        ctx: &HandlerContext<'_>,
        dn: &Dn,
        entry: &Entry,
        cascade: bool,
    ) -> SchemaResult<()>;

    fn rename(
        &self,
        ctx: &HandlerContext<'_>,
        dn: &Dn,
        entry: &Entry,
        new_rdn: &Rdn,
        cascade: bool,
    ) -> SchemaResult<()>;

    fn move_entry(
        &self,
        ctx: &HandlerContext<'_>,
        dn: &Dn,
        new_parent: &Dn,
        entry: &Entry,
        cascade: bool,
    ) -> SchemaResult<()>;

    /// Rename and move in one step.
    fn replace(
        &self,
        ctx: &HandlerContext<'_>,
        dn: &Dn,
        new_parent: &Dn,
        new_rdn: &Rdn,
        entry: &Entry,
        cascade: bool,
    ) -> SchemaResult<()>;

    /// `entry` is the entry before the change, `modified` after it.
    fn modify(
        &self,
        ctx: &HandlerContext<'_>,
        dn: &Dn,
        entry: &Entry,
        modified: &Entry,
    ) -> SchemaResult<()>;
}
