//! LDAP syntax definitions.

use super::{
    Reference, SchemaObject, SchemaObjectInfo, SchemaObjectKind, SyntaxChecker, registered,
    resolve,
};
use crate::error::SchemaResult;
use crate::registries::RegistriesRef;
use crate::value::Value;
use serde::Serialize;
use std::sync::Arc;

/// An LDAP syntax. Its checker is the syntax checker registered under the same OID.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Syntax {
    #[serde(flatten)]
    info: SchemaObjectInfo,
    human_readable: bool,
}

registered!(Syntax, Syntax, syntaxes);

impl Syntax {
    pub fn new(oid: impl Into<String>, registries: &RegistriesRef) -> Self {
        Self {
            info: SchemaObjectInfo::new(oid, registries),
            human_readable: true,
        }
    }

    pub fn with_human_readable(mut self, human_readable: bool) -> Self {
        self.human_readable = human_readable;
        self
    }

    pub fn is_human_readable(&self) -> bool {
        self.human_readable
    }

    pub fn syntax_checker(&self) -> SchemaResult<Arc<SyntaxChecker>> {
        resolve(&self.info, self.oid())
    }

    pub fn is_valid(&self, value: &Value) -> SchemaResult<bool> {
        Ok(self.syntax_checker()?.is_valid(value))
    }
}

impl SchemaObject for Syntax {
    fn info(&self) -> &SchemaObjectInfo {
        &self.info
    }

    fn kind(&self) -> SchemaObjectKind {
        SchemaObjectKind::Syntax
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new(SchemaObjectKind::SyntaxChecker, self.oid())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registries::Registries;

    #[test]
    fn test_boolean_syntax_validation() {
        let registries = Registries::bootstrap().unwrap();
        let boolean = registries
            .syntaxes()
            .lookup("1.3.6.1.4.1.1466.115.121.1.7")
            .unwrap();

        assert!(boolean.is_valid(&"TRUE".into()).unwrap());
        assert!(!boolean.is_valid(&"yes".into()).unwrap());
    }

    #[test]
    fn test_octet_string_is_not_human_readable() {
        let registries = Registries::bootstrap().unwrap();
        let octets = registries
            .syntaxes()
            .lookup("1.3.6.1.4.1.1466.115.121.1.40")
            .unwrap();
        assert!(!octets.is_human_readable());
        assert!(octets.is_valid(&Value::Binary(vec![0, 159])).unwrap());
    }
}
