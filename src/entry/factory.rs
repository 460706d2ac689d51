//! Building schema objects from meta-schema entries.

use super::{Entry, EntryKind, attrs};
use crate::builtin;
use crate::error::{SchemaError, SchemaResult};
use crate::oid::Oid;
use crate::registries::{CatalogState, ObjectRef, RegistriesRef};
use crate::schema::{
    AttributeType, Comparator, DitContentRule, DitStructureRule, MatchingRule, MatchingRuleUse,
    NameForm, Normalizer, ObjectClass, ObjectClassType, Registered, SchemaObjectKind, Syntax,
    SyntaxChecker, UsageEnum,
};
use std::sync::Arc;

/// A schema object kind that can be decoded from its meta-schema entry.
pub trait FromEntry: Registered {
    /// Decode `entry` into an object owned by `schema_name` and bound to `registries`.
    fn from_entry(entry: &Entry, schema_name: &str, registries: &RegistriesRef)
    -> SchemaResult<Self>;
}

fn invalid(entry: &Entry, message: impl Into<String>) -> SchemaError {
    SchemaError::invalid_syntax(message, entry.dn().to_string())
}

fn required<'a>(entry: &'a Entry, id: &str) -> SchemaResult<&'a str> {
    entry
        .first(id)
        .ok_or_else(|| invalid(entry, format!("missing required attribute {}", id)))
}

fn required_values<'a>(entry: &'a Entry, id: &str) -> SchemaResult<&'a [String]> {
    let values = entry.values(id);
    if values.is_empty() {
        return Err(invalid(entry, format!("missing required attribute {}", id)));
    }
    Ok(values)
}

fn boolean(entry: &Entry, id: &str) -> SchemaResult<bool> {
    match entry.first(id) {
        None => Ok(false),
        Some(value) if value.eq_ignore_ascii_case("TRUE") => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("FALSE") => Ok(false),
        Some(value) => Err(invalid(
            entry,
            format!("{} must be TRUE or FALSE, got '{}'", id, value),
        )),
    }
}

/// Identity fields every kind shares: `(oid, names, description, obsolete)`.
fn identity(entry: &Entry) -> SchemaResult<(String, Vec<String>, Option<String>, bool)> {
    let oid = Oid::new(required(entry, attrs::OID)?.trim())?.into_string();
    Ok((
        oid,
        entry.values(attrs::NAME).to_vec(),
        entry.first(attrs::DESCRIPTION).map(str::to_string),
        boolean(entry, attrs::OBSOLETE)?,
    ))
}

/// Build an object from its OID, then apply the identity fields shared by every kind.
macro_rules! decoded {
    ($entry:expr, $schema:expr, |$oid:ident| $build:expr) => {{
        let (oid, names, description, obsolete) = identity($entry)?;
        let $oid = oid;
        let object = $build
            .with_names(names)
            .with_obsolete(obsolete)
            .with_schema($schema);
        match description {
            Some(description) => object.with_description(description),
            None => object,
        }
    }};
}

/// Implementation objects cannot be loaded from byte code.
fn implementation_name(entry: &Entry) -> SchemaResult<&str> {
    if entry.contains(attrs::BYTECODE) {
        return Err(SchemaError::unsupported(format!(
            "loading byte code for {}",
            entry.dn()
        )));
    }
    required(entry, attrs::FQCN)
}

fn unknown_implementation(kind: SchemaObjectKind, name: &str) -> SchemaError {
    SchemaError::unsupported(format!("unknown {} implementation '{}'", kind, name))
}

impl FromEntry for AttributeType {
    fn from_entry(
        entry: &Entry,
        schema_name: &str,
        registries: &RegistriesRef,
    ) -> SchemaResult<Self> {
        let mut at = decoded!(entry, schema_name, |oid| AttributeType::new(oid, registries))
            .with_single_valued(boolean(entry, attrs::SINGLE_VALUE)?)
            .with_collective(boolean(entry, attrs::COLLECTIVE)?)
            .with_user_modifiable(!boolean(entry, attrs::NO_USER_MODIFICATION)?);
        if let Some(superior) = entry.first(attrs::SUP_ATTRIBUTE_TYPE) {
            at = at.with_superior(superior);
        }
        if let Some(rule) = entry.first(attrs::EQUALITY) {
            at = at.with_equality(rule);
        }
        if let Some(rule) = entry.first(attrs::ORDERING) {
            at = at.with_ordering(rule);
        }
        if let Some(rule) = entry.first(attrs::SUBSTR) {
            at = at.with_substr(rule);
        }
        if let Some(syntax) = entry.first(attrs::SYNTAX) {
            at = at.with_syntax(syntax);
        }
        if let Some(length) = entry.first(attrs::LENGTH) {
            let length = length
                .trim()
                .parse()
                .map_err(|_| invalid(entry, format!("bad {} '{}'", attrs::LENGTH, length)))?;
            at = at.with_syntax_length(length);
        }
        if let Some(usage) = entry.first(attrs::USAGE) {
            at = at.with_usage(UsageEnum::parse(usage)?);
        }
        if at.superior_oid().is_none() && at.syntax_oid().is_none() {
            return Err(invalid(entry, "attribute type needs a superior or a syntax"));
        }
        if at.is_collective() && at.usage().is_operational() {
            return Err(invalid(entry, "collective attribute types must be user attributes"));
        }
        Ok(at)
    }
}

impl FromEntry for ObjectClass {
    fn from_entry(
        entry: &Entry,
        schema_name: &str,
        registries: &RegistriesRef,
    ) -> SchemaResult<Self> {
        let class_type = match entry.first(attrs::TYPE_OBJECT_CLASS) {
            Some(value) => ObjectClassType::parse(value)?,
            None => ObjectClassType::default(),
        };
        Ok(
            decoded!(entry, schema_name, |oid| ObjectClass::new(oid, registries))
                .with_superiors(entry.values(attrs::SUP_OBJECT_CLASS).iter().cloned())
                .with_type(class_type)
                .with_must(entry.values(attrs::MUST).iter().cloned())
                .with_may(entry.values(attrs::MAY).iter().cloned()),
        )
    }
}

impl FromEntry for MatchingRule {
    fn from_entry(
        entry: &Entry,
        schema_name: &str,
        registries: &RegistriesRef,
    ) -> SchemaResult<Self> {
        Ok(
            decoded!(entry, schema_name, |oid| MatchingRule::new(oid, registries))
                .with_syntax(required(entry, attrs::SYNTAX)?),
        )
    }
}

impl FromEntry for MatchingRuleUse {
    fn from_entry(
        entry: &Entry,
        schema_name: &str,
        registries: &RegistriesRef,
    ) -> SchemaResult<Self> {
        Ok(
            decoded!(entry, schema_name, |oid| MatchingRuleUse::new(oid, registries))
                .with_applies(required_values(entry, attrs::APPLIES)?.iter().cloned()),
        )
    }
}

impl FromEntry for Syntax {
    fn from_entry(
        entry: &Entry,
        schema_name: &str,
        registries: &RegistriesRef,
    ) -> SchemaResult<Self> {
        Ok(
            decoded!(entry, schema_name, |oid| Syntax::new(oid, registries))
                .with_human_readable(!boolean(entry, attrs::NOT_HUMAN_READABLE)?),
        )
    }
}

impl FromEntry for SyntaxChecker {
    fn from_entry(
        entry: &Entry,
        schema_name: &str,
        registries: &RegistriesRef,
    ) -> SchemaResult<Self> {
        let name = implementation_name(entry)?;
        let checker = builtin::syntax_checker(name)
            .ok_or_else(|| unknown_implementation(Self::KIND, name))?;
        Ok(decoded!(entry, schema_name, |oid| SyntaxChecker::new(oid, name, checker, registries)))
    }
}

impl FromEntry for Normalizer {
    fn from_entry(
        entry: &Entry,
        schema_name: &str,
        registries: &RegistriesRef,
    ) -> SchemaResult<Self> {
        let name = implementation_name(entry)?;
        let normalizer = builtin::normalizer(name, registries)
            .ok_or_else(|| unknown_implementation(Self::KIND, name))?;
        Ok(decoded!(entry, schema_name, |oid| Normalizer::new(oid, name, normalizer, registries)))
    }
}

impl FromEntry for Comparator {
    fn from_entry(
        entry: &Entry,
        schema_name: &str,
        registries: &RegistriesRef,
    ) -> SchemaResult<Self> {
        let name = implementation_name(entry)?;
        let comparator = builtin::comparator(name, registries)
            .ok_or_else(|| unknown_implementation(Self::KIND, name))?;
        Ok(decoded!(entry, schema_name, |oid| Comparator::new(oid, name, comparator, registries)))
    }
}

impl FromEntry for NameForm {
    fn from_entry(
        entry: &Entry,
        schema_name: &str,
        registries: &RegistriesRef,
    ) -> SchemaResult<Self> {
        Ok(
            decoded!(entry, schema_name, |oid| NameForm::new(oid, registries))
                .with_structural_class(required(entry, attrs::OC)?)
                .with_must(required_values(entry, attrs::MUST)?.iter().cloned())
                .with_may(entry.values(attrs::MAY).iter().cloned()),
        )
    }
}

impl FromEntry for DitContentRule {
    fn from_entry(
        entry: &Entry,
        schema_name: &str,
        registries: &RegistriesRef,
    ) -> SchemaResult<Self> {
        Ok(
            decoded!(entry, schema_name, |oid| DitContentRule::new(oid, registries))
                .with_aux(entry.values(attrs::AUX).iter().cloned())
                .with_must(entry.values(attrs::MUST).iter().cloned())
                .with_may(entry.values(attrs::MAY).iter().cloned())
                .with_not(entry.values(attrs::NOT).iter().cloned()),
        )
    }
}

impl FromEntry for DitStructureRule {
    fn from_entry(
        entry: &Entry,
        schema_name: &str,
        registries: &RegistriesRef,
    ) -> SchemaResult<Self> {
        Ok(
            decoded!(entry, schema_name, |oid| DitStructureRule::new(oid, registries))
                .with_name_form(required(entry, attrs::FORM)?)
                .with_superior_rules(
                    entry.values(attrs::SUP_DIT_STRUCTURE_RULE).iter().cloned(),
                ),
        )
    }
}

fn register<T: FromEntry>(
    state: &mut CatalogState,
    entry: &Entry,
    schema_name: &str,
    registries: &RegistriesRef,
) -> SchemaResult<ObjectRef> {
    let object = state.register(Arc::new(T::from_entry(entry, schema_name, registries)?))?;
    Ok(ObjectRef::of(object.as_ref()))
}

/// Decode a meta-schema entry of any kind and register it in `state`.
pub fn decode_entry(
    state: &mut CatalogState,
    entry: &Entry,
    schema_name: &str,
    registries: &RegistriesRef,
) -> SchemaResult<ObjectRef> {
    let kind = match EntryKind::of(entry)? {
        EntryKind::SchemaObject(kind) => kind,
        EntryKind::MetaSchema => {
            return Err(SchemaError::unsupported(format!(
                "registering schema entry {} as a definition",
                entry.dn()
            )));
        }
    };
    match kind {
        SchemaObjectKind::AttributeType => {
            register::<AttributeType>(state, entry, schema_name, registries)
        }
        SchemaObjectKind::ObjectClass => register::<ObjectClass>(state, entry, schema_name, registries),
        SchemaObjectKind::MatchingRule => {
            register::<MatchingRule>(state, entry, schema_name, registries)
        }
        SchemaObjectKind::MatchingRuleUse => {
            register::<MatchingRuleUse>(state, entry, schema_name, registries)
        }
        SchemaObjectKind::Syntax => register::<Syntax>(state, entry, schema_name, registries),
        SchemaObjectKind::SyntaxChecker => {
            register::<SyntaxChecker>(state, entry, schema_name, registries)
        }
        SchemaObjectKind::Normalizer => register::<Normalizer>(state, entry, schema_name, registries),
        SchemaObjectKind::Comparator => register::<Comparator>(state, entry, schema_name, registries),
        SchemaObjectKind::NameForm => register::<NameForm>(state, entry, schema_name, registries),
        SchemaObjectKind::DitContentRule => {
            register::<DitContentRule>(state, entry, schema_name, registries)
        }
        SchemaObjectKind::DitStructureRule => {
            register::<DitStructureRule>(state, entry, schema_name, registries)
        }
    }
}
