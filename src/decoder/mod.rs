//! Decoding RFC 4512 schema descriptions into schema objects.
//!
//! [`SchemaDecoder`] maps parsed descriptions onto the object model, capturing the
//! registries handle every decoded object needs. The `X-SCHEMA` extension names the owning
//! schema; without it objects belong to `other`.
//!
//! DIT structure rules are keyed by OID in this catalog, so they have no textual form
//! here and are only created from meta-schema entries.
//!
//! # Examples
//!
//! ```rust
//! use ldap_schema::{Registries, SchemaDecoder};
//! use ldap_schema::schema::SchemaObject;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registries = Registries::bootstrap()?;
//! let decoder = SchemaDecoder::new(&registries);
//! let at = decoder.parse_attribute_type(
//!     "( 1.3.6.1.4.1.42.2.27.4.1.6 NAME 'javaClassName' EQUALITY caseExactMatch \
//!      SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 SINGLE-VALUE X-SCHEMA 'java' )",
//! )?;
//! assert_eq!(at.schema_name(), "java");
//! assert!(at.is_single_valued());
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod parser;

pub use document::{Definition, DefinitionKind, parse_document};
pub use parser::RawDescription;

use crate::error::SchemaResult;
use crate::registries::{Registries, RegistriesRef};
use crate::schema::{
    AttributeType, DEFAULT_SCHEMA_NAME, DitContentRule, MatchingRule, MatchingRuleUse, NameForm,
    ObjectClass, ObjectClassType, Syntax, UsageEnum,
};

const FLAGS: &[&str] = &[
    "OBSOLETE",
    "SINGLE-VALUE",
    "COLLECTIVE",
    "NO-USER-MODIFICATION",
    "ABSTRACT",
    "STRUCTURAL",
    "AUXILIARY",
];

const ATTRIBUTE_TYPE_KEYWORDS: &[&str] = &[
    "NAME",
    "DESC",
    "OBSOLETE",
    "SUP",
    "EQUALITY",
    "ORDERING",
    "SUBSTR",
    "SYNTAX",
    "SINGLE-VALUE",
    "COLLECTIVE",
    "NO-USER-MODIFICATION",
    "USAGE",
];

const OBJECT_CLASS_KEYWORDS: &[&str] = &[
    "NAME",
    "DESC",
    "OBSOLETE",
    "SUP",
    "ABSTRACT",
    "STRUCTURAL",
    "AUXILIARY",
    "MUST",
    "MAY",
];

const MATCHING_RULE_KEYWORDS: &[&str] = &["NAME", "DESC", "OBSOLETE", "SYNTAX"];

const MATCHING_RULE_USE_KEYWORDS: &[&str] = &["NAME", "DESC", "OBSOLETE", "APPLIES"];

const SYNTAX_KEYWORDS: &[&str] = &["DESC"];

const NAME_FORM_KEYWORDS: &[&str] = &["NAME", "DESC", "OBSOLETE", "OC", "MUST", "MAY"];

const DIT_CONTENT_RULE_KEYWORDS: &[&str] =
    &["NAME", "DESC", "OBSOLETE", "AUX", "MUST", "MAY", "NOT"];

/// Decodes textual descriptions into schema objects bound to one registries aggregate.
#[derive(Debug, Clone)]
pub struct SchemaDecoder {
    registries: RegistriesRef,
}

impl SchemaDecoder {
    pub fn new(registries: &Registries) -> Self {
        Self {
            registries: registries.handle(),
        }
    }

    /// A decoder for objects bound to an arbitrary handle.
    pub fn with_handle(registries: RegistriesRef) -> Self {
        Self { registries }
    }

    pub fn parse_attribute_type(&self, raw: &str) -> SchemaResult<AttributeType> {
        let description = RawDescription::parse(raw, ATTRIBUTE_TYPE_KEYWORDS, FLAGS)?;
        let mut at = AttributeType::new(description.oid(), &self.registries)
            .with_names(description.list("NAME"))
            .with_obsolete(description.flag("OBSOLETE"))
            .with_schema(schema_name(&description))
            .with_single_valued(description.flag("SINGLE-VALUE"))
            .with_collective(description.flag("COLLECTIVE"))
            .with_user_modifiable(!description.flag("NO-USER-MODIFICATION"));
        if let Some(text) = description.single("DESC")? {
            at = at.with_description(text);
        }
        if let Some(superior) = description.single("SUP")? {
            at = at.with_superior(superior);
        }
        if let Some(rule) = description.single("EQUALITY")? {
            at = at.with_equality(rule);
        }
        if let Some(rule) = description.single("ORDERING")? {
            at = at.with_ordering(rule);
        }
        if let Some(rule) = description.single("SUBSTR")? {
            at = at.with_substr(rule);
        }
        if let Some(syntax) = description.single("SYNTAX")? {
            let (oid, length) = split_syntax_length(&description, &syntax)?;
            at = at.with_syntax(oid);
            if let Some(length) = length {
                at = at.with_syntax_length(length);
            }
        }
        if let Some(usage) = description.single("USAGE")? {
            at = at.with_usage(UsageEnum::parse(&usage).map_err(|_| {
                description.error(format!("unknown USAGE {}", usage))
            })?);
        }

        if at.superior_oid().is_none() && at.syntax_oid().is_none() {
            return Err(description.error("attribute type needs SUP or SYNTAX"));
        }
        if at.is_collective() && at.usage().is_operational() {
            return Err(description.error("collective attribute types must be user attributes"));
        }
        if !at.is_user_modifiable() && !at.usage().is_operational() {
            return Err(description.error("NO-USER-MODIFICATION requires an operational usage"));
        }
        Ok(at)
    }

    pub fn parse_object_class(&self, raw: &str) -> SchemaResult<ObjectClass> {
        let description = RawDescription::parse(raw, OBJECT_CLASS_KEYWORDS, FLAGS)?;
        let kinds: Vec<ObjectClassType> = [
            ("ABSTRACT", ObjectClassType::Abstract),
            ("STRUCTURAL", ObjectClassType::Structural),
            ("AUXILIARY", ObjectClassType::Auxiliary),
        ]
        .into_iter()
        .filter(|(flag, _)| description.flag(flag))
        .map(|(_, kind)| kind)
        .collect();
        if kinds.len() > 1 {
            return Err(description.error("object class has more than one kind"));
        }

        let mut oc = ObjectClass::new(description.oid(), &self.registries)
            .with_names(description.list("NAME"))
            .with_obsolete(description.flag("OBSOLETE"))
            .with_schema(schema_name(&description))
            .with_superiors(description.list("SUP"))
            .with_type(kinds.first().copied().unwrap_or_default())
            .with_must(description.list("MUST"))
            .with_may(description.list("MAY"));
        if let Some(text) = description.single("DESC")? {
            oc = oc.with_description(text);
        }
        Ok(oc)
    }

    pub fn parse_matching_rule(&self, raw: &str) -> SchemaResult<MatchingRule> {
        let description = RawDescription::parse(raw, MATCHING_RULE_KEYWORDS, FLAGS)?;
        let mut rule = MatchingRule::new(description.oid(), &self.registries)
            .with_names(description.list("NAME"))
            .with_obsolete(description.flag("OBSOLETE"))
            .with_schema(schema_name(&description))
            .with_syntax(description.required("SYNTAX")?);
        if let Some(text) = description.single("DESC")? {
            rule = rule.with_description(text);
        }
        Ok(rule)
    }

    pub fn parse_syntax(&self, raw: &str) -> SchemaResult<Syntax> {
        let description = RawDescription::parse(raw, SYNTAX_KEYWORDS, FLAGS)?;
        let human_readable = !description
            .extension("X-NOT-HUMAN-READABLE")
            .is_some_and(|value| value.eq_ignore_ascii_case("TRUE"));
        let mut syntax = Syntax::new(description.oid(), &self.registries)
            .with_schema(schema_name(&description))
            .with_human_readable(human_readable);
        if let Some(text) = description.single("DESC")? {
            syntax = syntax.with_description(text);
        }
        Ok(syntax)
    }

    pub fn parse_matching_rule_use(&self, raw: &str) -> SchemaResult<MatchingRuleUse> {
        let description = RawDescription::parse(raw, MATCHING_RULE_USE_KEYWORDS, FLAGS)?;
        let mut mru = MatchingRuleUse::new(description.oid(), &self.registries)
            .with_names(description.list("NAME"))
            .with_obsolete(description.flag("OBSOLETE"))
            .with_schema(schema_name(&description))
            .with_applies(description.required_list("APPLIES")?);
        if let Some(text) = description.single("DESC")? {
            mru = mru.with_description(text);
        }
        Ok(mru)
    }

    pub fn parse_name_form(&self, raw: &str) -> SchemaResult<NameForm> {
        let description = RawDescription::parse(raw, NAME_FORM_KEYWORDS, FLAGS)?;
        let mut nf = NameForm::new(description.oid(), &self.registries)
            .with_names(description.list("NAME"))
            .with_obsolete(description.flag("OBSOLETE"))
            .with_schema(schema_name(&description))
            .with_structural_class(description.required("OC")?)
            .with_must(description.required_list("MUST")?)
            .with_may(description.list("MAY"));
        if let Some(text) = description.single("DESC")? {
            nf = nf.with_description(text);
        }
        Ok(nf)
    }

    pub fn parse_dit_content_rule(&self, raw: &str) -> SchemaResult<DitContentRule> {
        let description = RawDescription::parse(raw, DIT_CONTENT_RULE_KEYWORDS, FLAGS)?;
        let mut dcr = DitContentRule::new(description.oid(), &self.registries)
            .with_names(description.list("NAME"))
            .with_obsolete(description.flag("OBSOLETE"))
            .with_schema(schema_name(&description))
            .with_aux(description.list("AUX"))
            .with_must(description.list("MUST"))
            .with_may(description.list("MAY"))
            .with_not(description.list("NOT"));
        if let Some(text) = description.single("DESC")? {
            dcr = dcr.with_description(text);
        }
        Ok(dcr)
    }

    /// Decode a description of the given kind.
    pub fn decode(&self, kind: DefinitionKind, raw: &str) -> SchemaResult<Definition> {
        Ok(match kind {
            DefinitionKind::AttributeType => {
                Definition::AttributeType(self.parse_attribute_type(raw)?)
            }
            DefinitionKind::ObjectClass => Definition::ObjectClass(self.parse_object_class(raw)?),
            DefinitionKind::MatchingRule => {
                Definition::MatchingRule(self.parse_matching_rule(raw)?)
            }
            DefinitionKind::MatchingRuleUse => {
                Definition::MatchingRuleUse(self.parse_matching_rule_use(raw)?)
            }
            DefinitionKind::Syntax => Definition::Syntax(self.parse_syntax(raw)?),
            DefinitionKind::NameForm => Definition::NameForm(self.parse_name_form(raw)?),
            DefinitionKind::DitContentRule => {
                Definition::DitContentRule(self.parse_dit_content_rule(raw)?)
            }
        })
    }
}

fn schema_name(description: &RawDescription) -> String {
    description
        .extension("X-SCHEMA")
        .unwrap_or(DEFAULT_SCHEMA_NAME)
        .to_string()
}

/// Split `1.3.6.1.4.1.1466.115.121.1.15{32768}` into the OID and the length bound.
fn split_syntax_length(
    description: &RawDescription,
    syntax: &str,
) -> SchemaResult<(String, Option<u32>)> {
    let Some((oid, rest)) = syntax.split_once('{') else {
        return Ok((syntax.to_string(), None));
    };
    let length = rest
        .strip_suffix('}')
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| description.error(format!("bad syntax length in {}", syntax)))?;
    Ok((oid.to_string(), Some(length)))
}
