//! Schema documents: sequences of keyword-prefixed descriptions.
//!
//! A document holds definitions such as
//!
//! ```text
//! # comment
//! attributetype ( 2.5.4.3 NAME 'cn' SUP name )
//! objectClasses: ( 2.5.6.6 NAME 'person'
//!     SUP top STRUCTURAL MUST ( sn $ cn ) )
//! ```
//!
//! in either the slapd keyword style or the subschema attribute style. A definition may
//! span several lines; it ends when its parentheses balance.

use crate::error::{SchemaError, SchemaResult};
use crate::registries::{CatalogState, ObjectRef};
use crate::schema::{
    AttributeType, DitContentRule, MatchingRule, MatchingRuleUse, NameForm, ObjectClass,
    Registered, SchemaObject, SchemaObjectKind, Syntax,
};
use std::sync::Arc;

/// Kinds that have a textual description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    AttributeType,
    ObjectClass,
    MatchingRule,
    MatchingRuleUse,
    Syntax,
    NameForm,
    DitContentRule,
}

impl DefinitionKind {
    /// Recognize a document keyword (case-insensitive, trailing `:` ignored).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim_end_matches(':').to_ascii_lowercase();
        match keyword.as_str() {
            "attributetype" | "attributetypes" => Some(DefinitionKind::AttributeType),
            "objectclass" | "objectclasses" => Some(DefinitionKind::ObjectClass),
            "matchingrule" | "matchingrules" => Some(DefinitionKind::MatchingRule),
            "matchingruleuse" => Some(DefinitionKind::MatchingRuleUse),
            "ldapsyntax" | "ldapsyntaxes" => Some(DefinitionKind::Syntax),
            "nameform" | "nameforms" => Some(DefinitionKind::NameForm),
            "ditcontentrule" | "ditcontentrules" => Some(DefinitionKind::DitContentRule),
            _ => None,
        }
    }

    pub fn object_kind(self) -> SchemaObjectKind {
        match self {
            DefinitionKind::AttributeType => SchemaObjectKind::AttributeType,
            DefinitionKind::ObjectClass => SchemaObjectKind::ObjectClass,
            DefinitionKind::MatchingRule => SchemaObjectKind::MatchingRule,
            DefinitionKind::MatchingRuleUse => SchemaObjectKind::MatchingRuleUse,
            DefinitionKind::Syntax => SchemaObjectKind::Syntax,
            DefinitionKind::NameForm => SchemaObjectKind::NameForm,
            DefinitionKind::DitContentRule => SchemaObjectKind::DitContentRule,
        }
    }
}

/// A decoded schema object of any describable kind.
#[derive(Debug, Clone)]
pub enum Definition {
    AttributeType(AttributeType),
    ObjectClass(ObjectClass),
    MatchingRule(MatchingRule),
    MatchingRuleUse(MatchingRuleUse),
    Syntax(Syntax),
    NameForm(NameForm),
    DitContentRule(DitContentRule),
}

impl Definition {
    pub fn as_object(&self) -> &dyn SchemaObject {
        match self {
            Definition::AttributeType(object) => object,
            Definition::ObjectClass(object) => object,
            Definition::MatchingRule(object) => object,
            Definition::MatchingRuleUse(object) => object,
            Definition::Syntax(object) => object,
            Definition::NameForm(object) => object,
            Definition::DitContentRule(object) => object,
        }
    }

    pub(crate) fn register_in(self, state: &mut CatalogState) -> SchemaResult<ObjectRef> {
        fn add<T: Registered>(state: &mut CatalogState, object: T) -> SchemaResult<ObjectRef> {
            let registered = state.register(Arc::new(object))?;
            Ok(ObjectRef::of(registered.as_ref()))
        }

        match self {
            Definition::AttributeType(object) => add(state, object),
            Definition::ObjectClass(object) => add(state, object),
            Definition::MatchingRule(object) => add(state, object),
            Definition::MatchingRuleUse(object) => add(state, object),
            Definition::Syntax(object) => add(state, object),
            Definition::NameForm(object) => add(state, object),
            Definition::DitContentRule(object) => add(state, object),
        }
    }
}

/// One raw definition found in a document, with the line it starts on (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub kind: DefinitionKind,
    pub line: usize,
    pub description: String,
}

/// Split a schema document into raw definitions.
pub fn parse_document(text: &str) -> SchemaResult<Vec<DocumentEntry>> {
    let mut entries = Vec::new();
    let mut current: Option<(DefinitionKind, usize, String, i32)> = None;

    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if current.is_none() && (trimmed.is_empty() || trimmed.starts_with('#')) {
            continue;
        }

        let (kind, start, mut description, mut depth) = match current.take() {
            Some(open) => open,
            None => {
                let (keyword, rest) = trimmed
                    .split_once(|c: char| c.is_whitespace() || c == '(')
                    .map(|(keyword, _)| (keyword, &trimmed[keyword.len()..]))
                    .unwrap_or((trimmed, ""));
                let kind = DefinitionKind::from_keyword(keyword).ok_or_else(|| {
                    SchemaError::invalid_syntax(
                        format!("line {}: unknown definition keyword '{}'", index + 1, keyword),
                        line,
                    )
                })?;
                (kind, index + 1, rest.trim().to_string(), 0)
            }
        };

        if depth > 0 {
            description.push(' ');
            description.push_str(trimmed);
        }
        depth += paren_balance(if depth > 0 { trimmed } else { &description });

        if depth <= 0 && description.contains('(') {
            entries.push(DocumentEntry {
                kind,
                line: start,
                description,
            });
        } else {
            current = Some((kind, start, description, depth.max(1)));
        }
    }

    if let Some((_, start, description, _)) = current {
        return Err(SchemaError::invalid_syntax(
            format!("line {}: unterminated definition", start),
            description,
        ));
    }
    Ok(entries)
}

/// Net parenthesis depth of a line, ignoring parentheses inside quotes.
fn paren_balance(line: &str) -> i32 {
    let mut depth = 0;
    let mut quoted = false;
    for c in line.chars() {
        match c {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth -= 1,
            _ => {}
        }
    }
    depth
}
