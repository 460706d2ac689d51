//! The registries aggregate: identifier registry plus one typed registry per kind.
//!
//! All registries live behind a single [`RwLock`], so a bulk change (a cascade, a schema
//! being enabled) is applied against a private copy of the state and published in one
//! step. Readers never observe a half-applied change.
//!
//! # Examples
//!
//! ```rust
//! use ldap_schema::Registries;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registries = Registries::bootstrap()?;
//! assert_eq!(registries.oids().get_oid("commonName")?, "2.5.4.3");
//!
//! let normalizer = registries.oid_normalizer("cn")?;
//! assert_eq!(normalizer.normalize(&" Alice ".into())?.to_string(), "alice");
//! # Ok(())
//! # }
//! ```

pub mod monitor;
pub mod object_registry;
pub mod oid_registry;
pub mod state;

pub use monitor::{LoggingMonitor, RegistryMonitor};
pub use object_registry::{ObjectRegistry, TypedRegistry};
pub use oid_registry::{OidRegistry, OidRegistryHandle};
pub use state::{CatalogState, ObjectRef, Rekeyed};

use crate::error::{SchemaError, SchemaResult};
use crate::schema::{
    AttributeType, Comparator, DitContentRule, DitStructureRule, MatchingRule, MatchingRuleUse,
    NameForm, Normalizer, ObjectClass, Registered, SchemaObject, SchemaObjectKind, Syntax,
    SyntaxChecker,
};
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, RwLock, Weak};

pub type AttributeTypeRegistry<'a> = ObjectRegistry<'a, AttributeType>;
pub type ObjectClassRegistry<'a> = ObjectRegistry<'a, ObjectClass>;
pub type MatchingRuleRegistry<'a> = ObjectRegistry<'a, MatchingRule>;
pub type MatchingRuleUseRegistry<'a> = ObjectRegistry<'a, MatchingRuleUse>;
pub type SyntaxRegistry<'a> = ObjectRegistry<'a, Syntax>;
pub type SyntaxCheckerRegistry<'a> = ObjectRegistry<'a, SyntaxChecker>;
pub type NormalizerRegistry<'a> = ObjectRegistry<'a, Normalizer>;
pub type ComparatorRegistry<'a> = ObjectRegistry<'a, Comparator>;
pub type NameFormRegistry<'a> = ObjectRegistry<'a, NameForm>;
pub type DitContentRuleRegistry<'a> = ObjectRegistry<'a, DitContentRule>;
pub type DitStructureRuleRegistry<'a> = ObjectRegistry<'a, DitStructureRule>;

/// Non-owning handle to a [`Registries`] aggregate, captured by schema objects at
/// construction and used to resolve their references.
#[derive(Clone, Default)]
pub struct RegistriesRef(Weak<Registries>);

impl RegistriesRef {
    /// A handle attached to nothing; resolution through it fails with `Detached`.
    pub fn detached() -> Self {
        Self(Weak::new())
    }

    pub fn upgrade(&self) -> SchemaResult<Arc<Registries>> {
        self.0.upgrade().ok_or(SchemaError::Detached)
    }

    pub fn is_attached(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for RegistriesRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistriesRef")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// An attribute type OID paired with its equality normalizer.
#[derive(Debug, Clone)]
pub struct OidNormalizer {
    oid: String,
    normalizer: Option<Arc<Normalizer>>,
}

impl OidNormalizer {
    pub fn oid(&self) -> &str {
        &self.oid
    }

    /// `None` when the attribute type has no equality rule.
    pub fn normalizer(&self) -> Option<&Arc<Normalizer>> {
        self.normalizer.as_ref()
    }

    pub fn normalize(&self, value: &Value) -> SchemaResult<Value> {
        match &self.normalizer {
            Some(normalizer) => normalizer.normalize(value),
            None => Ok(value.clone()),
        }
    }
}

/// The schema catalog.
pub struct Registries {
    state: RwLock<CatalogState>,
    this: RegistriesRef,
}

impl Registries {
    /// Create an empty catalog.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Registries {
            state: RwLock::new(CatalogState::default()),
            this: RegistriesRef(this.clone()),
        })
    }

    /// Create a catalog holding the built-in `system` and `core` schemas.
    pub fn bootstrap() -> SchemaResult<Arc<Self>> {
        let registries = Self::new();
        crate::builtin::load_bootstrap_schemas(&registries)?;
        Ok(registries)
    }

    /// Handle to pass to schema object constructors.
    pub fn handle(&self) -> RegistriesRef {
        self.this.clone()
    }

    pub fn oids(&self) -> OidRegistryHandle<'_> {
        OidRegistryHandle::new(self)
    }

    pub fn registry<T: Registered>(&self) -> ObjectRegistry<'_, T> {
        ObjectRegistry::new(self)
    }

    pub fn attribute_types(&self) -> AttributeTypeRegistry<'_> {
        self.registry()
    }

    pub fn object_classes(&self) -> ObjectClassRegistry<'_> {
        self.registry()
    }

    pub fn matching_rules(&self) -> MatchingRuleRegistry<'_> {
        self.registry()
    }

    pub fn matching_rule_uses(&self) -> MatchingRuleUseRegistry<'_> {
        self.registry()
    }

    pub fn syntaxes(&self) -> SyntaxRegistry<'_> {
        self.registry()
    }

    pub fn syntax_checkers(&self) -> SyntaxCheckerRegistry<'_> {
        self.registry()
    }

    pub fn normalizers(&self) -> NormalizerRegistry<'_> {
        self.registry()
    }

    pub fn comparators(&self) -> ComparatorRegistry<'_> {
        self.registry()
    }

    pub fn name_forms(&self) -> NameFormRegistry<'_> {
        self.registry()
    }

    pub fn dit_content_rules(&self) -> DitContentRuleRegistry<'_> {
        self.registry()
    }

    pub fn dit_structure_rules(&self) -> DitStructureRuleRegistry<'_> {
        self.registry()
    }

    /// The equality normalizer of an attribute type, looked up by OID or name.
    pub fn oid_normalizer(&self, id: &str) -> SchemaResult<OidNormalizer> {
        let at = self.attribute_types().lookup(id)?;
        let normalizer = match at.equality()? {
            Some(rule) => Some(rule.normalizer()?),
            None => None,
        };
        Ok(OidNormalizer {
            oid: at.oid().to_string(),
            normalizer,
        })
    }

    /// Objects directly referring to `(kind, id)`.
    pub fn dependents_of(&self, kind: SchemaObjectKind, id: &str) -> SchemaResult<Vec<ObjectRef>> {
        self.read("dependents", |state| {
            let oid = state
                .resolve(kind, id)
                .ok_or_else(|| SchemaError::not_found(kind.label(), id))?;
            Ok(state.dependents(kind, &oid))
        })
    }

    /// Registered objects owned by a schema.
    pub fn objects_in_schema(&self, schema_name: &str) -> SchemaResult<Vec<ObjectRef>> {
        self.read("objects in schema", |state| {
            Ok(state.objects_in_schema(schema_name))
        })
    }

    /// Look up any kind of object by kind and OID.
    pub fn lookup_any(
        &self,
        kind: SchemaObjectKind,
        id: &str,
    ) -> SchemaResult<Arc<dyn SchemaObject>> {
        self.read("lookup", |state| {
            state
                .resolve(kind, id)
                .and_then(|oid| state.get(kind, &oid))
                .ok_or_else(|| SchemaError::not_found(kind.label(), id))
        })
    }

    pub(crate) fn read<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&CatalogState) -> SchemaResult<R>,
    ) -> SchemaResult<R> {
        let state = self
            .state
            .read()
            .map_err(|_| SchemaError::LockPoisoned(operation))?;
        f(&state)
    }

    pub(crate) fn write<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut CatalogState) -> SchemaResult<R>,
    ) -> SchemaResult<R> {
        let mut state = self
            .state
            .write()
            .map_err(|_| SchemaError::LockPoisoned(operation))?;
        f(&mut state)
    }

    /// Run `f` against a copy of the state and publish the copy only if `f` succeeds.
    ///
    /// The write lock is held throughout, so `f` must not call back into `self`.
    pub(crate) fn transaction<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut CatalogState) -> SchemaResult<R>,
    ) -> SchemaResult<R> {
        let mut state = self
            .state
            .write()
            .map_err(|_| SchemaError::LockPoisoned(operation))?;
        let mut draft = state.clone();
        let result = f(&mut draft)?;
        *state = draft;
        Ok(result)
    }
}

impl fmt::Debug for Registries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.read() {
            Ok(state) => f.debug_struct("Registries").field("state", &*state).finish(),
            Err(_) => f.write_str("Registries { <poisoned> }"),
        }
    }
}
