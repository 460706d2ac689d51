//! Matching rule use definitions.

use super::{
    AttributeType, MatchingRule, Reference, SchemaObject, SchemaObjectInfo, SchemaObjectKind,
    references_to, registered, resolve, resolve_all, rewrite_all,
};
use crate::error::SchemaResult;
use crate::registries::RegistriesRef;
use serde::Serialize;
use std::sync::Arc;

/// The attribute types a matching rule applies to. Shares the rule's OID.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingRuleUse {
    #[serde(flatten)]
    info: SchemaObjectInfo,
    applies_oids: Vec<String>,
}

registered!(MatchingRuleUse, MatchingRuleUse, matching_rule_uses);

impl MatchingRuleUse {
    pub fn new(oid: impl Into<String>, registries: &RegistriesRef) -> Self {
        Self {
            info: SchemaObjectInfo::new(oid, registries),
            applies_oids: Vec::new(),
        }
    }

    pub fn with_applies<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.applies_oids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn applies_oids(&self) -> &[String] {
        &self.applies_oids
    }

    pub fn matching_rule(&self) -> SchemaResult<Arc<MatchingRule>> {
        resolve(&self.info, self.oid())
    }

    pub fn applicable_attribute_types(&self) -> SchemaResult<Vec<Arc<AttributeType>>> {
        resolve_all(&self.info, &self.applies_oids)
    }
}

impl SchemaObject for MatchingRuleUse {
    fn info(&self) -> &SchemaObjectInfo {
        &self.info
    }

    fn kind(&self) -> SchemaObjectKind {
        SchemaObjectKind::MatchingRuleUse
    }

    fn references(&self) -> Vec<Reference> {
        let mut references = vec![Reference::new(SchemaObjectKind::MatchingRule, self.oid())];
        references.extend(references_to(
            SchemaObjectKind::AttributeType,
            &self.applies_oids,
        ));
        references
    }

    fn rewrite_reference(&mut self, kind: SchemaObjectKind, from: &str, to: &str) -> bool {
        kind == SchemaObjectKind::AttributeType && rewrite_all(&mut self.applies_oids, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registries::Registries;

    #[test]
    fn test_resolves_rule_and_attributes() {
        let registries = Registries::bootstrap().unwrap();
        let mru = MatchingRuleUse::new("2.5.13.2", &registries.handle())
            .with_names(["caseIgnoreMatch"])
            .with_applies(["cn", "sn"]);
        let mru = registries.matching_rule_uses().register(mru).unwrap();

        assert_eq!(mru.matching_rule().unwrap().name(), "caseIgnoreMatch");
        let applies = mru.applicable_attribute_types().unwrap();
        assert_eq!(applies.len(), 2);
        assert_eq!(applies[1].oid(), "2.5.4.4");
    }
}
