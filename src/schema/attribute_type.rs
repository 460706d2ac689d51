//! Attribute type definitions.

use super::{
    MatchingRule, Reference, Registered, SchemaObject, SchemaObjectInfo, SchemaObjectKind, Syntax,
    registered, resolve, rewrite_opt,
};
use crate::error::{SchemaError, SchemaResult};
use crate::registries::RegistriesRef;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Attribute usage as defined by RFC 4512.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UsageEnum {
    #[default]
    UserApplications,
    DirectoryOperation,
    DistributedOperation,
    DsaOperation,
}

impl UsageEnum {
    /// Parse the textual usage keyword (case-insensitive).
    pub fn parse(value: &str) -> SchemaResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "userapplications" => Ok(UsageEnum::UserApplications),
            "directoryoperation" => Ok(UsageEnum::DirectoryOperation),
            "distributedoperation" => Ok(UsageEnum::DistributedOperation),
            "dsaoperation" => Ok(UsageEnum::DsaOperation),
            _ => Err(SchemaError::invalid_syntax("unknown attribute usage", value)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UsageEnum::UserApplications => "userApplications",
            UsageEnum::DirectoryOperation => "directoryOperation",
            UsageEnum::DistributedOperation => "distributedOperation",
            UsageEnum::DsaOperation => "dSAOperation",
        }
    }

    pub fn is_operational(&self) -> bool {
        *self != UsageEnum::UserApplications
    }
}

/// An attribute type.
///
/// Syntax and matching rules not set on the type itself are inherited from the chain of
/// superiors; the first ancestor defining one wins.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeType {
    #[serde(flatten)]
    info: SchemaObjectInfo,
    superior_oid: Option<String>,
    syntax_oid: Option<String>,
    syntax_length: Option<u32>,
    equality_oid: Option<String>,
    ordering_oid: Option<String>,
    substr_oid: Option<String>,
    single_valued: bool,
    collective: bool,
    user_modifiable: bool,
    usage: UsageEnum,
}

registered!(AttributeType, AttributeType, attribute_types);

impl AttributeType {
    pub fn new(oid: impl Into<String>, registries: &RegistriesRef) -> Self {
        Self {
            info: SchemaObjectInfo::new(oid, registries),
            superior_oid: None,
            syntax_oid: None,
            syntax_length: None,
            equality_oid: None,
            ordering_oid: None,
            substr_oid: None,
            single_valued: false,
            collective: false,
            user_modifiable: true,
            usage: UsageEnum::UserApplications,
        }
    }

    pub fn with_superior(mut self, id: impl Into<String>) -> Self {
        self.superior_oid = Some(id.into());
        self
    }

    pub fn with_syntax(mut self, id: impl Into<String>) -> Self {
        self.syntax_oid = Some(id.into());
        self
    }

    pub fn with_syntax_length(mut self, length: u32) -> Self {
        self.syntax_length = Some(length);
        self
    }

    pub fn with_equality(mut self, id: impl Into<String>) -> Self {
        self.equality_oid = Some(id.into());
        self
    }

    pub fn with_ordering(mut self, id: impl Into<String>) -> Self {
        self.ordering_oid = Some(id.into());
        self
    }

    pub fn with_substr(mut self, id: impl Into<String>) -> Self {
        self.substr_oid = Some(id.into());
        self
    }

    pub fn with_single_valued(mut self, single_valued: bool) -> Self {
        self.single_valued = single_valued;
        self
    }

    pub fn with_collective(mut self, collective: bool) -> Self {
        self.collective = collective;
        self
    }

    pub fn with_user_modifiable(mut self, user_modifiable: bool) -> Self {
        self.user_modifiable = user_modifiable;
        self
    }

    pub fn with_usage(mut self, usage: UsageEnum) -> Self {
        self.usage = usage;
        self
    }

    pub fn superior_oid(&self) -> Option<&str> {
        self.superior_oid.as_deref()
    }

    pub fn syntax_oid(&self) -> Option<&str> {
        self.syntax_oid.as_deref()
    }

    pub fn syntax_length(&self) -> Option<u32> {
        self.syntax_length
    }

    pub fn equality_oid(&self) -> Option<&str> {
        self.equality_oid.as_deref()
    }

    pub fn ordering_oid(&self) -> Option<&str> {
        self.ordering_oid.as_deref()
    }

    pub fn substr_oid(&self) -> Option<&str> {
        self.substr_oid.as_deref()
    }

    pub fn is_single_valued(&self) -> bool {
        self.single_valued
    }

    pub fn is_collective(&self) -> bool {
        self.collective
    }

    pub fn is_user_modifiable(&self) -> bool {
        self.user_modifiable
    }

    pub fn usage(&self) -> UsageEnum {
        self.usage
    }

    /// Resolve the direct superior, if any.
    pub fn superior(&self) -> SchemaResult<Option<Arc<AttributeType>>> {
        self.superior_oid
            .as_deref()
            .map(|id| resolve::<AttributeType>(&self.info, id))
            .transpose()
    }

    /// Resolve the effective syntax, walking the superior chain.
    pub fn syntax(&self) -> SchemaResult<Option<Arc<Syntax>>> {
        self.inherited(AttributeType::syntax_oid)
    }

    /// Resolve the effective equality matching rule, walking the superior chain.
    pub fn equality(&self) -> SchemaResult<Option<Arc<MatchingRule>>> {
        self.inherited(AttributeType::equality_oid)
    }

    /// Resolve the effective ordering matching rule, walking the superior chain.
    pub fn ordering(&self) -> SchemaResult<Option<Arc<MatchingRule>>> {
        self.inherited(AttributeType::ordering_oid)
    }

    /// Resolve the effective substring matching rule, walking the superior chain.
    pub fn substring(&self) -> SchemaResult<Option<Arc<MatchingRule>>> {
        self.inherited(AttributeType::substr_oid)
    }

    /// Whether `ancestor` (OID or name) appears in the superior chain.
    pub fn is_descendant_of(&self, ancestor: &str) -> SchemaResult<bool> {
        let target = resolve::<AttributeType>(&self.info, ancestor)?;
        let mut seen = HashSet::from([self.oid().to_string()]);
        let mut current = self.superior()?;
        while let Some(at) = current {
            if at.oid() == target.oid() {
                return Ok(true);
            }
            if !seen.insert(at.oid().to_string()) {
                return Err(self.cycle());
            }
            current = at.superior()?;
        }
        Ok(false)
    }

    /// Normalize a value with the effective equality rule; values of types without one
    /// are returned unchanged.
    pub fn normalize(&self, value: &Value) -> SchemaResult<Value> {
        match self.equality()? {
            Some(rule) => rule.normalize(value),
            None => Ok(value.clone()),
        }
    }

    /// Check a value against the effective syntax.
    pub fn is_valid(&self, value: &Value) -> SchemaResult<bool> {
        match self.syntax()? {
            Some(syntax) => syntax.is_valid(value),
            None => Ok(true),
        }
    }

    fn inherited<R: Registered>(
        &self,
        pick: fn(&AttributeType) -> Option<&str>,
    ) -> SchemaResult<Option<Arc<R>>> {
        if let Some(id) = pick(self) {
            return resolve::<R>(&self.info, id).map(Some);
        }
        let mut seen = HashSet::from([self.oid().to_string()]);
        let mut current = self.superior()?;
        while let Some(at) = current {
            if !seen.insert(at.oid().to_string()) {
                return Err(self.cycle());
            }
            if let Some(id) = pick(at.as_ref()) {
                return resolve::<R>(&self.info, id).map(Some);
            }
            current = at.superior()?;
        }
        Ok(None)
    }

    fn cycle(&self) -> SchemaError {
        SchemaError::CyclicReference {
            kind: SchemaObjectKind::AttributeType.label(),
            oid: self.oid().to_string(),
        }
    }
}

impl SchemaObject for AttributeType {
    fn info(&self) -> &SchemaObjectInfo {
        &self.info
    }

    fn kind(&self) -> SchemaObjectKind {
        SchemaObjectKind::AttributeType
    }

    fn references(&self) -> Vec<Reference> {
        let mut references = Vec::new();
        if let Some(id) = &self.superior_oid {
            references.push(Reference::new(SchemaObjectKind::AttributeType, id.clone()));
        }
        if let Some(id) = &self.syntax_oid {
            references.push(Reference::new(SchemaObjectKind::Syntax, id.clone()));
        }
        for id in [&self.equality_oid, &self.ordering_oid, &self.substr_oid]
            .into_iter()
            .flatten()
        {
            references.push(Reference::new(SchemaObjectKind::MatchingRule, id.clone()));
        }
        references
    }

    fn rewrite_reference(&mut self, kind: SchemaObjectKind, from: &str, to: &str) -> bool {
        match kind {
            SchemaObjectKind::AttributeType => rewrite_opt(&mut self.superior_oid, from, to),
            SchemaObjectKind::Syntax => rewrite_opt(&mut self.syntax_oid, from, to),
            SchemaObjectKind::MatchingRule => {
                let equality = rewrite_opt(&mut self.equality_oid, from, to);
                let ordering = rewrite_opt(&mut self.ordering_oid, from, to);
                let substr = rewrite_opt(&mut self.substr_oid, from, to);
                equality || ordering || substr
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registries::Registries;

    #[test]
    fn test_inherits_matching_rules_from_superior() {
        let registries = Registries::bootstrap().unwrap();
        let cn = registries.attribute_types().lookup("cn").unwrap();

        assert_eq!(cn.equality_oid(), None);
        let equality = cn.equality().unwrap().unwrap();
        assert_eq!(equality.oid(), "2.5.13.2");
        let syntax = cn.syntax().unwrap().unwrap();
        assert_eq!(syntax.oid(), "1.3.6.1.4.1.1466.115.121.1.15");
        assert!(cn.ordering().unwrap().is_none());
        assert!(cn.is_descendant_of("name").unwrap());
    }

    #[test]
    fn test_superior_cycle_is_reported() {
        let registries = Registries::new();
        let handle = registries.handle();
        let types = registries.attribute_types();
        types
            .register(AttributeType::new("1.2.3.1", &handle).with_superior("1.2.3.2"))
            .unwrap();
        let second = types
            .register(AttributeType::new("1.2.3.2", &handle).with_superior("1.2.3.1"))
            .unwrap();

        match second.equality().unwrap_err() {
            SchemaError::CyclicReference { oid, .. } => assert_eq!(oid, "1.2.3.2"),
            other => panic!("Expected CyclicReference error, got: {:?}", other),
        }
    }

    #[test]
    fn test_unresolved_reference_fails_lazily() {
        let registries = Registries::new();
        let at = AttributeType::new("1.2.3.4", &registries.handle()).with_equality("9.9.9");
        let at = registries.attribute_types().register(at).unwrap();

        assert!(at.equality().unwrap_err().is_not_found());
    }

    #[test]
    fn test_detached_object() {
        let at = AttributeType::new("1.2.3.4", &RegistriesRef::detached()).with_syntax("1.1");
        assert!(matches!(at.syntax(), Err(SchemaError::Detached)));
    }

    #[test]
    fn test_normalize_uses_equality_rule() {
        let registries = Registries::bootstrap().unwrap();
        let cn = registries.attribute_types().lookup("commonName").unwrap();
        let normalized = cn.normalize(&Value::from("  John   SMITH ")).unwrap();
        assert_eq!(normalized, Value::from("john smith"));
    }

    #[test]
    fn test_usage_parse() {
        assert_eq!(
            UsageEnum::parse("dSAOperation").unwrap(),
            UsageEnum::DsaOperation
        );
        assert!(UsageEnum::parse("sometimes").is_err());
        assert!(UsageEnum::DirectoryOperation.is_operational());
    }
}
