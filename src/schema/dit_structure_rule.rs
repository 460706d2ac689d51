//! DIT structure rule definitions.

use super::{
    NameForm, Reference, SchemaObject, SchemaObjectInfo, SchemaObjectKind, references_to,
    registered, resolve, resolve_all, rewrite_all, rewrite_opt,
};
use crate::error::{SchemaError, SchemaResult};
use crate::registries::RegistriesRef;
use serde::Serialize;
use std::sync::Arc;

/// A DIT structure rule, tying a name form to the rules allowed above it.
///
/// Structure rules are keyed by OID in this catalog like every other kind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DitStructureRule {
    #[serde(flatten)]
    info: SchemaObjectInfo,
    name_form_oid: Option<String>,
    superior_rule_oids: Vec<String>,
}

registered!(DitStructureRule, DitStructureRule, dit_structure_rules);

impl DitStructureRule {
    pub fn new(oid: impl Into<String>, registries: &RegistriesRef) -> Self {
        Self {
            info: SchemaObjectInfo::new(oid, registries),
            name_form_oid: None,
            superior_rule_oids: Vec::new(),
        }
    }

    pub fn with_name_form(mut self, id: impl Into<String>) -> Self {
        self.name_form_oid = Some(id.into());
        self
    }

    pub fn with_superior_rules<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.superior_rule_oids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn name_form_oid(&self) -> Option<&str> {
        self.name_form_oid.as_deref()
    }

    pub fn superior_rule_oids(&self) -> &[String] {
        &self.superior_rule_oids
    }

    pub fn name_form(&self) -> SchemaResult<Arc<NameForm>> {
        match &self.name_form_oid {
            Some(id) => resolve(&self.info, id),
            None => Err(SchemaError::not_found(
                SchemaObjectKind::NameForm.label(),
                format!("(unset on DIT structure rule {})", self.oid()),
            )),
        }
    }

    /// Resolve the superior rules. Rebuilt from the stored OIDs on every call.
    pub fn superior_rules(&self) -> SchemaResult<Vec<Arc<DitStructureRule>>> {
        resolve_all(&self.info, &self.superior_rule_oids)
    }
}

impl SchemaObject for DitStructureRule {
    fn info(&self) -> &SchemaObjectInfo {
        &self.info
    }

    fn kind(&self) -> SchemaObjectKind {
        SchemaObjectKind::DitStructureRule
    }

    fn references(&self) -> Vec<Reference> {
        let mut references = Vec::new();
        if let Some(id) = &self.name_form_oid {
            references.push(Reference::new(SchemaObjectKind::NameForm, id.clone()));
        }
        references.extend(references_to(
            SchemaObjectKind::DitStructureRule,
            &self.superior_rule_oids,
        ));
        references
    }

    fn rewrite_reference(&mut self, kind: SchemaObjectKind, from: &str, to: &str) -> bool {
        match kind {
            SchemaObjectKind::NameForm => rewrite_opt(&mut self.name_form_oid, from, to),
            SchemaObjectKind::DitStructureRule => {
                rewrite_all(&mut self.superior_rule_oids, from, to)
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
    fn test_superior_rules_follow_registry_changes() {
        let registries = Registries::bootstrap().unwrap();
        let handle = registries.handle();
        registries
            .name_forms()
            .register(
                NameForm::new("1.2.3.10", &handle)
                    .with_structural_class("organizationalUnit")
                    .with_must(["ou"]),
            )
            .unwrap();
        let rules = registries.dit_structure_rules();
        rules
            .register(DitStructureRule::new("1.2.3.20", &handle).with_name_form("1.2.3.10"))
            .unwrap();
        let child = rules
            .register(
                DitStructureRule::new("1.2.3.21", &handle)
                    .with_name_form("1.2.3.10")
                    .with_superior_rules(["1.2.3.20"]),
            )
            .unwrap();

        assert_eq!(child.superior_rules().unwrap()[0].oid(), "1.2.3.20");
        assert_eq!(child.name_form().unwrap().oid(), "1.2.3.10");

        rules.unregister("1.2.3.20").unwrap();
        assert!(child.superior_rules().unwrap_err().is_not_found());
    }
}
