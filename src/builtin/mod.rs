//! Built-in behaviour and the bootstrap schemas.
//!
//! Syntax checkers, normalizers and comparators are registered by implementation name,
//! the value meta-schema entries carry in `m-fqcn`. The factories here map such a name to
//! an implementation; only the last path segment is significant, so
//! `org.example.DeepTrimToLowerNormalizer` and `DeepTrimToLowerNormalizer` both resolve.

pub mod checkers;
pub mod comparators;
pub mod embedded;
pub mod normalizers;

pub use embedded::{core_schema, system_schema};

use crate::decoder::{SchemaDecoder, parse_document};
use crate::dn::{DnComparator, DnNormalizer};
use crate::error::{SchemaError, SchemaResult};
use crate::registries::{CatalogState, ObjectRef, Registries, RegistriesRef};
use crate::schema::{
    Comparator, Normalizer, SyntaxChecker, ValueChecker, ValueComparator, ValueNormalizer,
};
use checkers::*;
use comparators::*;
use log::{debug, info};
use normalizers::*;
use std::sync::Arc;

const SYSTEM_SCHEMA: &str = "system";

/// Syntax OID and the checker validating it.
const SYNTAX_CHECKERS: &[(&str, &str)] = &[
    ("1.3.6.1.4.1.1466.115.121.1.7", "BooleanSyntaxChecker"),
    ("1.3.6.1.4.1.1466.115.121.1.12", "DnSyntaxChecker"),
    ("1.3.6.1.4.1.1466.115.121.1.15", "DirectoryStringSyntaxChecker"),
    ("1.3.6.1.4.1.1466.115.121.1.26", "Ia5StringSyntaxChecker"),
    ("1.3.6.1.4.1.1466.115.121.1.27", "IntegerSyntaxChecker"),
    ("1.3.6.1.4.1.1466.115.121.1.36", "NumericStringSyntaxChecker"),
    ("1.3.6.1.4.1.1466.115.121.1.38", "OidSyntaxChecker"),
    ("1.3.6.1.4.1.1466.115.121.1.40", "AcceptAllSyntaxChecker"),
    ("1.3.6.1.4.1.1466.115.121.1.44", "PrintableStringSyntaxChecker"),
    ("1.3.6.1.4.1.1466.115.121.1.58", "AcceptAllSyntaxChecker"),
];

/// Matching rule OID with its normalizer and comparator.
const MATCHING_RULE_IMPLEMENTATIONS: &[(&str, &str, &str)] = &[
    ("2.5.13.0", "ObjectIdentifierNormalizer", "StringComparator"),
    ("2.5.13.1", "DnNormalizer", "DnComparator"),
    ("2.5.13.2", "DeepTrimToLowerNormalizer", "StringComparator"),
    ("2.5.13.3", "DeepTrimToLowerNormalizer", "StringComparator"),
    ("2.5.13.4", "DeepTrimToLowerNormalizer", "StringComparator"),
    ("2.5.13.5", "DeepTrimNormalizer", "StringComparator"),
    ("2.5.13.8", "NumericNormalizer", "StringComparator"),
    ("2.5.13.13", "BooleanNormalizer", "BooleanComparator"),
    ("2.5.13.14", "NumericNormalizer", "IntegerComparator"),
    ("2.5.13.15", "NumericNormalizer", "IntegerComparator"),
    ("2.5.13.17", "NoOpNormalizer", "ByteArrayComparator"),
    ("1.3.6.1.4.1.1466.109.114.1", "DeepTrimNormalizer", "StringComparator"),
    ("1.3.6.1.4.1.1466.109.114.2", "DeepTrimToLowerNormalizer", "StringComparator"),
];

fn short_name(implementation: &str) -> &str {
    implementation
        .rsplit(['.', ':'])
        .next()
        .unwrap_or(implementation)
        .trim()
}

/// Normalizer implementation for a name; schema-aware ones bind to `registries`.
pub fn normalizer(
    implementation: &str,
    registries: &RegistriesRef,
) -> Option<Arc<dyn ValueNormalizer>> {
    let normalizer: Arc<dyn ValueNormalizer> = match short_name(implementation) {
        "NoOpNormalizer" => Arc::new(NoOpNormalizer),
        "DeepTrimNormalizer" => Arc::new(DeepTrimNormalizer),
        "DeepTrimToLowerNormalizer" => Arc::new(DeepTrimToLowerNormalizer),
        "NumericNormalizer" => Arc::new(NumericNormalizer),
        "BooleanNormalizer" => Arc::new(BooleanNormalizer),
        "ObjectIdentifierNormalizer" => Arc::new(ObjectIdentifierNormalizer),
        "DnNormalizer" => Arc::new(DnNormalizer::new(registries.clone())),
        _ => return None,
    };
    Some(normalizer)
}

pub fn comparator(
    implementation: &str,
    registries: &RegistriesRef,
) -> Option<Arc<dyn ValueComparator>> {
    let comparator: Arc<dyn ValueComparator> = match short_name(implementation) {
        "StringComparator" => Arc::new(StringComparator),
        "ByteArrayComparator" => Arc::new(ByteArrayComparator),
        "IntegerComparator" => Arc::new(IntegerComparator),
        "BooleanComparator" => Arc::new(BooleanComparator),
        "DnComparator" => Arc::new(DnComparator::new(registries.clone())),
        _ => return None,
    };
    Some(comparator)
}

pub fn syntax_checker(implementation: &str) -> Option<Arc<dyn ValueChecker>> {
    let checker: Arc<dyn ValueChecker> = match short_name(implementation) {
        "AcceptAllSyntaxChecker" => Arc::new(AcceptAllSyntaxChecker),
        "BooleanSyntaxChecker" => Arc::new(BooleanSyntaxChecker),
        "IntegerSyntaxChecker" => Arc::new(IntegerSyntaxChecker),
        "OidSyntaxChecker" => Arc::new(OidSyntaxChecker),
        "DirectoryStringSyntaxChecker" => Arc::new(DirectoryStringSyntaxChecker),
        "Ia5StringSyntaxChecker" => Arc::new(Ia5StringSyntaxChecker),
        "PrintableStringSyntaxChecker" => Arc::new(PrintableStringSyntaxChecker),
        "NumericStringSyntaxChecker" => Arc::new(NumericStringSyntaxChecker),
        "DnSyntaxChecker" => Arc::new(DnSyntaxChecker),
        _ => return None,
    };
    Some(checker)
}

fn unknown_implementation(kind: &str, implementation: &str) -> SchemaError {
    SchemaError::unsupported(format!("unknown {} implementation '{}'", kind, implementation))
}

/// Decode every definition of a schema document into `state`.
pub(crate) fn register_document(
    state: &mut CatalogState,
    decoder: &SchemaDecoder,
    text: &str,
) -> SchemaResult<Vec<ObjectRef>> {
    let mut registered = Vec::new();
    for entry in parse_document(text)? {
        let definition = decoder.decode(entry.kind, &entry.description)?;
        registered.push(definition.register_in(state)?);
    }
    Ok(registered)
}

fn register_implementations(
    state: &mut CatalogState,
    handle: &RegistriesRef,
) -> SchemaResult<usize> {
    let mut count = 0;
    for (oid, implementation) in SYNTAX_CHECKERS {
        let checker = syntax_checker(implementation)
            .ok_or_else(|| unknown_implementation("syntax checker", implementation))?;
        let checker = SyntaxChecker::new(*oid, *implementation, checker, handle)
            .with_schema(SYSTEM_SCHEMA);
        state.register(Arc::new(checker))?;
        count += 1;
    }
    for (oid, normalizer_name, comparator_name) in MATCHING_RULE_IMPLEMENTATIONS {
        let behaviour = normalizer(normalizer_name, handle)
            .ok_or_else(|| unknown_implementation("normalizer", normalizer_name))?;
        state.register(Arc::new(
            Normalizer::new(*oid, *normalizer_name, behaviour, handle).with_schema(SYSTEM_SCHEMA),
        ))?;

        let behaviour = comparator(comparator_name, handle)
            .ok_or_else(|| unknown_implementation("comparator", comparator_name))?;
        state.register(Arc::new(
            Comparator::new(*oid, *comparator_name, behaviour, handle).with_schema(SYSTEM_SCHEMA),
        ))?;
        count += 2;
    }
    Ok(count)
}

/// Load `system` then `core` into `registries` in one step.
pub(crate) fn load_bootstrap_schemas(registries: &Registries) -> SchemaResult<()> {
    let handle = registries.handle();
    let decoder = SchemaDecoder::with_handle(handle.clone());
    let (definitions, implementations) = registries.transaction("bootstrap", |state| {
        let mut definitions = register_document(state, &decoder, system_schema())?.len();
        let implementations = register_implementations(state, &handle)?;
        definitions += register_document(state, &decoder, core_schema())?.len();
        Ok((definitions, implementations))
    })?;
    debug!("Bootstrap registered {} implementations", implementations);
    info!(
        "Loaded bootstrap schemas with {} definitions",
        definitions + implementations
    );
    Ok(())
}

/// Decode a schema document and register all of its definitions in one step.
///
/// Either every definition is registered or none is.
pub fn load_schema_document(registries: &Registries, text: &str) -> SchemaResult<Vec<ObjectRef>> {
    let decoder = SchemaDecoder::new(registries);
    let registered =
        registries.transaction("load document", |state| register_document(state, &decoder, text))?;
    info!("Loaded {} definitions from schema document", registered.len());
    Ok(registered)
}
