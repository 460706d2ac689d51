//! Schema loaders: where schema descriptions and their entries are persisted.
//!
//! The coordinator keeps the in-memory catalog and the loader in step. Every accepted
//! change is handed to [`SchemaLoader::store`] as a [`SchemaChange`]; entries of disabled
//! schemas live only in the loader until the schema is enabled.
//!
//! # Example Usage
//!
//! ```rust
//! use ldap_schema::coordinator::{InMemorySchemaLoader, SchemaInfo, SchemaLoader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = InMemorySchemaLoader::bootstrap();
//! loader.save_schema(SchemaInfo::new("shop").with_dependencies(["core"]).with_disabled(true))?;
//!
//! assert!(loader.is_enabled("core"));
//! assert!(!loader.is_enabled("shop"));
//! assert_eq!(loader.schemas()?.len(), 3);
//! # Ok(())
//! # }
//! ```

use crate::dn::{Dn, Rdn};
use crate::entry::{Entry, EntryKind, META_SCHEMA_OC, attrs, schema_dn, schema_name_from_dn};
use crate::error::{SchemaError, SchemaResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;
use uuid::Uuid;

/// Description of a schema grouping, as held by a `metaSchema` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub name: String,
    pub dependencies: Vec<String>,
    pub disabled: bool,
    pub owner: Option<String>,
}

impl SchemaInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            disabled: false,
            owner: None,
        }
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies
            .iter()
            .any(|dependency| dependency.eq_ignore_ascii_case(name))
    }

    /// Read a `metaSchema` entry.
    pub fn from_entry(entry: &Entry) -> SchemaResult<Self> {
        if EntryKind::of(entry)? != EntryKind::MetaSchema {
            return Err(SchemaError::unsupported(format!(
                "entry {} is not a schema description",
                entry.dn()
            )));
        }
        let name = entry.first(attrs::CN).ok_or_else(|| {
            SchemaError::invalid_syntax("missing required attribute cn", entry.dn().to_string())
        })?;
        let disabled = match entry.first(attrs::DISABLED) {
            None => false,
            Some(value) if value.eq_ignore_ascii_case("TRUE") => true,
            Some(value) if value.eq_ignore_ascii_case("FALSE") => false,
            Some(value) => {
                return Err(SchemaError::invalid_syntax(
                    format!("{} must be TRUE or FALSE", attrs::DISABLED),
                    value,
                ));
            }
        };
        Ok(Self {
            name: name.to_string(),
            dependencies: entry.values(attrs::DEPENDENCIES).to_vec(),
            disabled,
            owner: entry.first(attrs::OWNER).map(str::to_string),
        })
    }

    /// The `metaSchema` entry describing this schema.
    pub fn to_entry(&self) -> Entry {
        let mut entry = Entry::new(schema_dn(&self.name))
            .with_attribute(attrs::OBJECT_CLASS, ["top", META_SCHEMA_OC])
            .with_attribute(attrs::CN, [self.name.as_str()])
            .with_attribute(attrs::DEPENDENCIES, self.dependencies.iter().cloned());
        if self.disabled {
            entry.put(attrs::DISABLED, ["TRUE"]);
        }
        if let Some(owner) = &self.owner {
            entry.put(attrs::OWNER, [owner.as_str()]);
        }
        entry
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperation {
    Add,
    Delete,
    Modify,
    Rename,
}

impl fmt::Display for ChangeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operation = match self {
            ChangeOperation::Add => "add",
            ChangeOperation::Delete => "delete",
            ChangeOperation::Modify => "modify",
            ChangeOperation::Rename => "rename",
        };
        f.write_str(operation)
    }
}

/// One persisted change to a schema entry.
///
/// Renames and moves both appear as [`ChangeOperation::Rename`] with `new_dn` set; the
/// carried `entry` is the entry as it is after the change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaChange {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    pub operation: ChangeOperation,
    pub dn: Dn,
    pub new_dn: Option<Dn>,
    pub entry: Option<Entry>,
}

impl SchemaChange {
    fn new(operation: ChangeOperation, dn: Dn, new_dn: Option<Dn>, entry: Option<Entry>) -> Self {
        Self {
            id: Uuid::new_v4(),
            at: Utc::now(),
            operation,
            dn,
            new_dn,
            entry,
        }
    }

    pub fn add(entry: Entry) -> Self {
        Self::new(ChangeOperation::Add, entry.dn().clone(), None, Some(entry))
    }

    pub fn delete(dn: Dn) -> Self {
        Self::new(ChangeOperation::Delete, dn, None, None)
    }

    pub fn modify(entry: Entry) -> Self {
        Self::new(ChangeOperation::Modify, entry.dn().clone(), None, Some(entry))
    }

    /// `entry` must already carry its new DN.
    pub fn rename(dn: Dn, entry: Entry) -> Self {
        let new_dn = entry.dn().clone();
        Self::new(ChangeOperation::Rename, dn, Some(new_dn), Some(entry))
    }
}

/// Persistence for schema descriptions and schema entries.
pub trait SchemaLoader: Send + Sync {
    /// A schema description by name (case-insensitive).
    fn schema(&self, name: &str) -> SchemaResult<Option<SchemaInfo>>;

    fn schemas(&self) -> SchemaResult<Vec<SchemaInfo>>;

    /// Unknown schemas are not enabled.
    fn is_enabled(&self, name: &str) -> bool {
        matches!(self.schema(name), Ok(Some(info)) if !info.disabled)
    }

    /// Stored definition entries of a schema.
    fn entries(&self, schema_name: &str) -> SchemaResult<Vec<Entry>>;

    fn entry(&self, dn: &Dn) -> SchemaResult<Option<Entry>>;

    /// Create or update a schema description.
    fn save_schema(&self, info: SchemaInfo) -> SchemaResult<()>;

    fn remove_schema(&self, name: &str) -> SchemaResult<Option<SchemaInfo>>;

    /// Rename a schema, moving its entries and updating the schemas depending on it.
    fn rename_schema(&self, from: &str, to: &str) -> SchemaResult<()>;

    /// Persist one definition change.
    fn store(&self, change: &SchemaChange) -> SchemaResult<()>;
}

fn entry_key(dn: &Dn) -> String {
    dn.to_string().to_ascii_lowercase()
}

fn poisoned(operation: &str) -> SchemaError {
    SchemaError::loader(format!("lock poisoned during {}", operation))
}

/// Thread-safe in-memory loader.
///
/// Entries are keyed by their lowercased DN. Changes to `metaSchema` entries only reach
/// the journal; descriptions are maintained through `save_schema` and friends.
#[derive(Debug, Default)]
pub struct InMemorySchemaLoader {
    schemas: RwLock<BTreeMap<String, SchemaInfo>>,
    entries: RwLock<BTreeMap<String, Entry>>,
    journal: RwLock<Vec<SchemaChange>>,
}

impl InMemorySchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader describing the built-in `system` and `core` schemas.
    pub fn bootstrap() -> Self {
        let mut schemas = BTreeMap::new();
        schemas.insert("system".to_string(), SchemaInfo::new("system"));
        schemas.insert(
            "core".to_string(),
            SchemaInfo::new("core").with_dependencies(["system"]),
        );
        Self {
            schemas: RwLock::new(schemas),
            ..Self::default()
        }
    }

    /// Seed a schema with stored entries, bypassing the journal.
    pub fn with_schema(self, info: SchemaInfo, entries: impl IntoIterator<Item = Entry>) -> Self {
        if let Ok(mut stored) = self.entries.write() {
            for entry in entries {
                stored.insert(entry_key(entry.dn()), entry);
            }
        }
        if let Ok(mut schemas) = self.schemas.write() {
            schemas.insert(info.name.to_ascii_lowercase(), info);
        }
        self
    }

    /// Every change stored so far, oldest first.
    pub fn journal(&self) -> Vec<SchemaChange> {
        self.journal
            .read()
            .map(|journal| journal.clone())
            .unwrap_or_default()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }
}

impl SchemaLoader for InMemorySchemaLoader {
    fn schema(&self, name: &str) -> SchemaResult<Option<SchemaInfo>> {
        let schemas = self.schemas.read().map_err(|_| poisoned("schema"))?;
        Ok(schemas.get(&name.to_ascii_lowercase()).cloned())
    }

    fn schemas(&self) -> SchemaResult<Vec<SchemaInfo>> {
        let schemas = self.schemas.read().map_err(|_| poisoned("schemas"))?;
        Ok(schemas.values().cloned().collect())
    }

    fn entries(&self, schema_name: &str) -> SchemaResult<Vec<Entry>> {
        let entries = self.entries.read().map_err(|_| poisoned("entries"))?;
        Ok(entries
            .values()
            .filter(|entry| {
                schema_name_from_dn(entry.dn())
                    .is_ok_and(|name| name.eq_ignore_ascii_case(schema_name))
            })
            .cloned()
            .collect())
    }

    fn entry(&self, dn: &Dn) -> SchemaResult<Option<Entry>> {
        let entries = self.entries.read().map_err(|_| poisoned("entry"))?;
        Ok(entries.get(&entry_key(dn)).cloned())
    }

    fn save_schema(&self, info: SchemaInfo) -> SchemaResult<()> {
        let mut schemas = self.schemas.write().map_err(|_| poisoned("save schema"))?;
        schemas.insert(info.name.to_ascii_lowercase(), info);
        Ok(())
    }

    fn remove_schema(&self, name: &str) -> SchemaResult<Option<SchemaInfo>> {
        let removed = self
            .schemas
            .write()
            .map_err(|_| poisoned("remove schema"))?
            .remove(&name.to_ascii_lowercase());
        if removed.is_some() {
            let mut entries = self.entries.write().map_err(|_| poisoned("remove schema"))?;
            entries.retain(|_, entry| {
                !schema_name_from_dn(entry.dn()).is_ok_and(|owner| owner.eq_ignore_ascii_case(name))
            });
        }
        Ok(removed)
    }

    fn rename_schema(&self, from: &str, to: &str) -> SchemaResult<()> {
        let mut schemas = self.schemas.write().map_err(|_| poisoned("rename schema"))?;
        let mut info = schemas
            .remove(&from.to_ascii_lowercase())
            .ok_or_else(|| SchemaError::not_found("schema", from))?;
        info.name = to.to_string();
        schemas.insert(to.to_ascii_lowercase(), info);
        for other in schemas.values_mut() {
            for dependency in other.dependencies.iter_mut() {
                if dependency.eq_ignore_ascii_case(from) {
                    *dependency = to.to_string();
                }
            }
        }

        let mut entries = self.entries.write().map_err(|_| poisoned("rename schema"))?;
        let moving: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| {
                schema_name_from_dn(entry.dn()).is_ok_and(|owner| owner.eq_ignore_ascii_case(from))
            })
            .map(|(key, _)| key.clone())
            .collect();
        for key in moving {
            if let Some(mut entry) = entries.remove(&key) {
                let rdns = entry
                    .dn()
                    .rdns()
                    .iter()
                    .map(|rdn| match rdn.value_of(attrs::CN) {
                        Some(_) => Rdn::new(attrs::CN, to),
                        None => rdn.clone(),
                    })
                    .collect();
                entry.set_dn(Dn::from_rdns(rdns));
                entries.insert(entry_key(entry.dn()), entry);
            }
        }
        Ok(())
    }

    fn store(&self, change: &SchemaChange) -> SchemaResult<()> {
        let definition = change
            .entry
            .as_ref()
            .map_or(true, |entry| !entry.has_object_class(META_SCHEMA_OC));
        if definition {
            let mut entries = self.entries.write().map_err(|_| poisoned("store"))?;
            match change.operation {
                ChangeOperation::Add | ChangeOperation::Modify => {
                    if let Some(entry) = &change.entry {
                        entries.insert(entry_key(&change.dn), entry.clone());
                    }
                }
                ChangeOperation::Delete => {
                    entries.remove(&entry_key(&change.dn));
                }
                ChangeOperation::Rename => {
                    entries.remove(&entry_key(&change.dn));
                    if let (Some(new_dn), Some(entry)) = (&change.new_dn, &change.entry) {
                        entries.insert(entry_key(new_dn), entry.clone());
                    }
                }
            }
        }
        self.journal
            .write()
            .map_err(|_| poisoned("store"))?
            .push(change.clone());
        Ok(())
    }
}
