//! Schema object model.
//!
//! This module defines the eleven kinds of schema definitions the catalog stores and the
//! traits they share. Every object carries its identity in a [`SchemaObjectInfo`] and keeps
//! its dependencies as OID (or name) strings; accessors such as
//! [`MatchingRule::syntax`] resolve them through the registries on every call, so objects
//! can be built and registered in any order.
//!
//! # Key Types
//!
//! - [`SchemaObject`] - Object-safe view shared by every kind
//! - [`Registered`] - Typed access used by the registries
//! - [`SchemaObjectKind`] - Discriminant of the eleven kinds
//! - [`LazyComparator`] - Serializable comparator handle resolved on first use
//!
//! # Examples
//!
//! ```rust
//! use ldap_schema::Registries;
//! use ldap_schema::schema::{AttributeType, SchemaObject};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registries = Registries::bootstrap()?;
//! let at = AttributeType::new("1.3.6.1.4.1.18060.0.4.1.2.1", &registries.handle())
//!     .with_names(["nickName"])
//!     .with_superior("name");
//! let at = registries.attribute_types().register(at)?;
//!
//! let equality = at.equality()?.expect("inherited from name");
//! assert_eq!(equality.name(), "caseIgnoreMatch");
//! # Ok(())
//! # }
//! ```

pub mod attribute_type;
pub mod comparator;
pub mod dit_content_rule;
pub mod dit_structure_rule;
pub mod lazy_comparator;
pub mod matching_rule;
pub mod matching_rule_use;
pub mod name_form;
pub mod normalizer;
pub mod object_class;
pub mod syntax;
pub mod syntax_checker;

pub use attribute_type::{AttributeType, UsageEnum};
pub use comparator::{Comparator, ValueComparator};
pub use dit_content_rule::DitContentRule;
pub use dit_structure_rule::DitStructureRule;
pub use lazy_comparator::LazyComparator;
pub use matching_rule::MatchingRule;
pub use matching_rule_use::MatchingRuleUse;
pub use name_form::NameForm;
pub use normalizer::{Normalizer, ValueNormalizer};
pub use object_class::{ObjectClass, ObjectClassType};
pub use syntax::Syntax;
pub use syntax_checker::{SyntaxChecker, ValueChecker};

use crate::error::SchemaResult;
use crate::registries::{CatalogState, RegistriesRef, TypedRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Schema grouping used when a definition does not name one.
pub const DEFAULT_SCHEMA_NAME: &str = "other";

/// The eleven kinds of schema definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SchemaObjectKind {
    AttributeType,
    ObjectClass,
    MatchingRule,
    MatchingRuleUse,
    Syntax,
    SyntaxChecker,
    Normalizer,
    Comparator,
    NameForm,
    DitContentRule,
    DitStructureRule,
}

impl SchemaObjectKind {
    pub const ALL: [SchemaObjectKind; 11] = [
        SchemaObjectKind::AttributeType,
        SchemaObjectKind::ObjectClass,
        SchemaObjectKind::MatchingRule,
        SchemaObjectKind::MatchingRuleUse,
        SchemaObjectKind::Syntax,
        SchemaObjectKind::SyntaxChecker,
        SchemaObjectKind::Normalizer,
        SchemaObjectKind::Comparator,
        SchemaObjectKind::NameForm,
        SchemaObjectKind::DitContentRule,
        SchemaObjectKind::DitStructureRule,
    ];

    /// Human readable label used in errors and logs.
    pub fn label(self) -> &'static str {
        match self {
            SchemaObjectKind::AttributeType => "attribute type",
            SchemaObjectKind::ObjectClass => "object class",
            SchemaObjectKind::MatchingRule => "matching rule",
            SchemaObjectKind::MatchingRuleUse => "matching rule use",
            SchemaObjectKind::Syntax => "syntax",
            SchemaObjectKind::SyntaxChecker => "syntax checker",
            SchemaObjectKind::Normalizer => "normalizer",
            SchemaObjectKind::Comparator => "comparator",
            SchemaObjectKind::NameForm => "name form",
            SchemaObjectKind::DitContentRule => "DIT content rule",
            SchemaObjectKind::DitStructureRule => "DIT structure rule",
        }
    }

    /// Object class marking a meta-schema entry of this kind.
    pub fn meta_object_class(self) -> &'static str {
        match self {
            SchemaObjectKind::AttributeType => "metaAttributeType",
            SchemaObjectKind::ObjectClass => "metaObjectClass",
            SchemaObjectKind::MatchingRule => "metaMatchingRule",
            SchemaObjectKind::MatchingRuleUse => "metaMatchingRuleUse",
            SchemaObjectKind::Syntax => "metaSyntax",
            SchemaObjectKind::SyntaxChecker => "metaSyntaxChecker",
            SchemaObjectKind::Normalizer => "metaNormalizer",
            SchemaObjectKind::Comparator => "metaComparator",
            SchemaObjectKind::NameForm => "metaNameForm",
            SchemaObjectKind::DitContentRule => "metaDITContentRule",
            SchemaObjectKind::DitStructureRule => "metaDITStructureRule",
        }
    }

    /// Name of the `ou=` container holding entries of this kind inside a schema.
    pub fn container(self) -> &'static str {
        match self {
            SchemaObjectKind::AttributeType => "attributeTypes",
            SchemaObjectKind::ObjectClass => "objectClasses",
            SchemaObjectKind::MatchingRule => "matchingRules",
            SchemaObjectKind::MatchingRuleUse => "matchingRuleUse",
            SchemaObjectKind::Syntax => "syntaxes",
            SchemaObjectKind::SyntaxChecker => "syntaxCheckers",
            SchemaObjectKind::Normalizer => "normalizers",
            SchemaObjectKind::Comparator => "comparators",
            SchemaObjectKind::NameForm => "nameForms",
            SchemaObjectKind::DitContentRule => "ditContentRules",
            SchemaObjectKind::DitStructureRule => "ditStructureRules",
        }
    }

    /// Kind whose meta object class is `object_class` (case-insensitive).
    pub fn from_meta_object_class(object_class: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.meta_object_class().eq_ignore_ascii_case(object_class))
    }

    /// Whether objects of this kind can be looked up by name through the identifier
    /// registry. Implementations (checkers, normalizers, comparators) are OID-only.
    pub fn allows_name_lookup(self) -> bool {
        !matches!(
            self,
            SchemaObjectKind::SyntaxChecker
                | SchemaObjectKind::Normalizer
                | SchemaObjectKind::Comparator
        )
    }

    /// Whether an object of this kind may use the same OID as one of `other`.
    ///
    /// Matching rules share their OID with their use, comparator and normalizer; syntaxes
    /// with their checker; structural object classes with their content rule.
    pub fn may_share_oid_with(self, other: SchemaObjectKind) -> bool {
        self != other && self.oid_family().is_some() && self.oid_family() == other.oid_family()
    }

    fn oid_family(self) -> Option<u8> {
        match self {
            SchemaObjectKind::MatchingRule
            | SchemaObjectKind::MatchingRuleUse
            | SchemaObjectKind::Comparator
            | SchemaObjectKind::Normalizer => Some(1),
            SchemaObjectKind::Syntax | SchemaObjectKind::SyntaxChecker => Some(2),
            SchemaObjectKind::ObjectClass | SchemaObjectKind::DitContentRule => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Identity and descriptive fields shared by every schema object.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaObjectInfo {
    pub(crate) oid: String,
    pub(crate) names: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) obsolete: bool,
    pub(crate) schema_name: String,
    #[serde(skip)]
    pub(crate) registries: RegistriesRef,
}

impl SchemaObjectInfo {
    pub fn new(oid: impl Into<String>, registries: &RegistriesRef) -> Self {
        Self {
            oid: oid.into(),
            names: Vec::new(),
            description: None,
            obsolete: false,
            schema_name: DEFAULT_SCHEMA_NAME.to_string(),
            registries: registries.clone(),
        }
    }

    pub fn registries(&self) -> &RegistriesRef {
        &self.registries
    }
}

/// A dependency edge: the kind of the referenced object and the OID or name stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: SchemaObjectKind,
    pub id: String,
}

impl Reference {
    pub fn new(kind: SchemaObjectKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// Object-safe view shared by every schema definition.
pub trait SchemaObject: fmt::Debug + Send + Sync + 'static {
    fn info(&self) -> &SchemaObjectInfo;

    fn kind(&self) -> SchemaObjectKind;

    /// Everything this object refers to; used for dependency checks.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }

    /// Replace every stored reference of `kind` that is literally `from` with `to`.
    /// Returns whether anything changed.
    fn rewrite_reference(&mut self, _kind: SchemaObjectKind, _from: &str, _to: &str) -> bool {
        false
    }

    fn oid(&self) -> &str {
        &self.info().oid
    }

    fn names(&self) -> &[String] {
        &self.info().names
    }

    /// Primary name, or the OID for unnamed definitions.
    fn name(&self) -> &str {
        self.info()
            .names
            .first()
            .map(String::as_str)
            .unwrap_or(&self.info().oid)
    }

    fn description(&self) -> Option<&str> {
        self.info().description.as_deref()
    }

    fn is_obsolete(&self) -> bool {
        self.info().obsolete
    }

    fn schema_name(&self) -> &str {
        &self.info().schema_name
    }
}

/// Typed side of a schema object: which registry stores it.
///
/// Implemented for the eleven kinds only; the registry accessors are an implementation
/// detail of [`crate::Registries`].
pub trait Registered: SchemaObject + Clone + Sized {
    const KIND: SchemaObjectKind;

    fn info_mut(&mut self) -> &mut SchemaObjectInfo;

    #[doc(hidden)]
    fn registry(state: &CatalogState) -> &TypedRegistry<Self>;

    #[doc(hidden)]
    fn registry_mut(state: &mut CatalogState) -> &mut TypedRegistry<Self>;
}

/// Implements [`Registered`] and the shared builder methods for a schema object type
/// whose identity lives in a field named `info`.
macro_rules! registered {
    ($ty:ident, $kind:ident, $field:ident) => {
        impl $crate::schema::Registered for $ty {
            const KIND: $crate::schema::SchemaObjectKind = $crate::schema::SchemaObjectKind::$kind;

            fn info_mut(&mut self) -> &mut $crate::schema::SchemaObjectInfo {
                &mut self.info
            }

            fn registry(
                state: &$crate::registries::CatalogState,
            ) -> &$crate::registries::TypedRegistry<Self> {
                &state.$field
            }

            fn registry_mut(
                state: &mut $crate::registries::CatalogState,
            ) -> &mut $crate::registries::TypedRegistry<Self> {
                &mut state.$field
            }
        }

        impl $ty {
            /// Replace the alias names; the first one becomes the primary name.
            pub fn with_names<I, S>(mut self, names: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                self.info.names = names.into_iter().map(Into::into).collect();
                self
            }

            pub fn with_description(mut self, description: impl Into<String>) -> Self {
                self.info.description = Some(description.into());
                self
            }

            pub fn with_obsolete(mut self, obsolete: bool) -> Self {
                self.info.obsolete = obsolete;
                self
            }

            /// Set the owning schema grouping.
            pub fn with_schema(mut self, schema_name: impl Into<String>) -> Self {
                self.info.schema_name = schema_name.into();
                self
            }
        }
    };
}
pub(crate) use registered;

pub(crate) fn resolve<T: Registered>(info: &SchemaObjectInfo, id: &str) -> SchemaResult<Arc<T>> {
    info.registries.upgrade()?.registry::<T>().lookup(id)
}

pub(crate) fn resolve_all<T: Registered>(
    info: &SchemaObjectInfo,
    ids: &[String],
) -> SchemaResult<Vec<Arc<T>>> {
    let registries = info.registries.upgrade()?;
    let registry = registries.registry::<T>();
    ids.iter().map(|id| registry.lookup(id)).collect()
}

pub(crate) fn references_to(kind: SchemaObjectKind, ids: &[String]) -> Vec<Reference> {
    ids.iter().map(|id| Reference::new(kind, id.clone())).collect()
}

pub(crate) fn rewrite_opt(slot: &mut Option<String>, from: &str, to: &str) -> bool {
    match slot {
        Some(id) if id == from => {
            *id = to.to_string();
            true
        }
        _ => false,
    }
}

pub(crate) fn rewrite_all(slots: &mut [String], from: &str, to: &str) -> bool {
    let mut changed = false;
    for slot in slots.iter_mut().filter(|slot| slot.as_str() == from) {
        *slot = to.to_string();
        changed = true;
    }
    changed
}
