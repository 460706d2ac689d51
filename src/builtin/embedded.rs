//! Embedded bootstrap schemas.
//!
//! The `system` and `core` schemas are stored as schema documents so they go through the
//! same decoder as any loaded schema. `core` depends on `system`.

/// Syntaxes, matching rules and the attribute types and object classes every directory
/// needs (RFC 4512, RFC 4517).
pub fn system_schema() -> &'static str {
    r#"# system schema

ldapSyntax ( 1.3.6.1.4.1.1466.115.121.1.7 DESC 'Boolean' X-SCHEMA 'system' )
ldapSyntax ( 1.3.6.1.4.1.1466.115.121.1.12 DESC 'DN' X-SCHEMA 'system' )
ldapSyntax ( 1.3.6.1.4.1.1466.115.121.1.15 DESC 'Directory String' X-SCHEMA 'system' )
ldapSyntax ( 1.3.6.1.4.1.1466.115.121.1.26 DESC 'IA5 String' X-SCHEMA 'system' )
ldapSyntax ( 1.3.6.1.4.1.1466.115.121.1.27 DESC 'INTEGER' X-SCHEMA 'system' )
ldapSyntax ( 1.3.6.1.4.1.1466.115.121.1.36 DESC 'Numeric String' X-SCHEMA 'system' )
ldapSyntax ( 1.3.6.1.4.1.1466.115.121.1.38 DESC 'OID' X-SCHEMA 'system' )
ldapSyntax ( 1.3.6.1.4.1.1466.115.121.1.40 DESC 'Octet String'
    X-NOT-HUMAN-READABLE 'TRUE' X-SCHEMA 'system' )
ldapSyntax ( 1.3.6.1.4.1.1466.115.121.1.44 DESC 'Printable String' X-SCHEMA 'system' )
ldapSyntax ( 1.3.6.1.4.1.1466.115.121.1.58 DESC 'Substring Assertion' X-SCHEMA 'system' )

matchingRule ( 2.5.13.0 NAME 'objectIdentifierMatch'
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.38 X-SCHEMA 'system' )
matchingRule ( 2.5.13.1 NAME 'distinguishedNameMatch'
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.12 X-SCHEMA 'system' )
matchingRule ( 2.5.13.2 NAME 'caseIgnoreMatch'
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 X-SCHEMA 'system' )
matchingRule ( 2.5.13.3 NAME 'caseIgnoreOrderingMatch'
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 X-SCHEMA 'system' )
matchingRule ( 2.5.13.4 NAME 'caseIgnoreSubstringsMatch'
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.58 X-SCHEMA 'system' )
matchingRule ( 2.5.13.5 NAME 'caseExactMatch'
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 X-SCHEMA 'system' )
matchingRule ( 2.5.13.8 NAME 'numericStringMatch'
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.36 X-SCHEMA 'system' )
matchingRule ( 2.5.13.13 NAME 'booleanMatch'
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.7 X-SCHEMA 'system' )
matchingRule ( 2.5.13.14 NAME 'integerMatch'
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.27 X-SCHEMA 'system' )
matchingRule ( 2.5.13.15 NAME 'integerOrderingMatch'
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.27 X-SCHEMA 'system' )
matchingRule ( 2.5.13.17 NAME 'octetStringMatch'
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.40 X-SCHEMA 'system' )
matchingRule ( 1.3.6.1.4.1.1466.109.114.1 NAME 'caseExactIA5Match'
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.26 X-SCHEMA 'system' )
matchingRule ( 1.3.6.1.4.1.1466.109.114.2 NAME 'caseIgnoreIA5Match'
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.26 X-SCHEMA 'system' )

attributeType ( 2.5.4.0 NAME 'objectClass'
    EQUALITY objectIdentifierMatch
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.38 X-SCHEMA 'system' )
attributeType ( 2.5.4.1 NAME 'aliasedObjectName'
    EQUALITY distinguishedNameMatch
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.12 SINGLE-VALUE X-SCHEMA 'system' )
attributeType ( 2.5.4.41 NAME 'name'
    EQUALITY caseIgnoreMatch SUBSTR caseIgnoreSubstringsMatch
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{32768} X-SCHEMA 'system' )
attributeType ( 2.5.4.3 NAME ( 'cn' 'commonName' ) SUP name X-SCHEMA 'system' )
attributeType ( 2.5.4.11 NAME ( 'ou' 'organizationalUnitName' ) SUP name X-SCHEMA 'system' )
attributeType ( 2.5.4.10 NAME ( 'o' 'organizationName' ) SUP name X-SCHEMA 'system' )
attributeType ( 2.5.4.49 NAME 'distinguishedName'
    EQUALITY distinguishedNameMatch
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.12 X-SCHEMA 'system' )
attributeType ( 2.5.4.35 NAME 'userPassword'
    EQUALITY octetStringMatch
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.40{128} X-SCHEMA 'system' )
attributeType ( 2.5.4.13 NAME 'description'
    EQUALITY caseIgnoreMatch SUBSTR caseIgnoreSubstringsMatch
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{1024} X-SCHEMA 'system' )

objectClass ( 2.5.6.0 NAME 'top' ABSTRACT MUST objectClass X-SCHEMA 'system' )
objectClass ( 2.5.6.1 NAME 'alias' SUP top STRUCTURAL
    MUST aliasedObjectName X-SCHEMA 'system' )
"#
}

/// Person and organization vocabulary (RFC 4519).
pub fn core_schema() -> &'static str {
    r#"# core schema

attributeType ( 2.5.4.4 NAME ( 'sn' 'surname' ) SUP name X-SCHEMA 'core' )
attributeType ( 0.9.2342.19200300.100.1.25 NAME ( 'dc' 'domainComponent' )
    EQUALITY caseIgnoreIA5Match
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.26 SINGLE-VALUE X-SCHEMA 'core' )
attributeType ( 0.9.2342.19200300.100.1.1 NAME ( 'uid' 'userid' )
    EQUALITY caseIgnoreMatch SUBSTR caseIgnoreSubstringsMatch
    SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{256} X-SCHEMA 'core' )
attributeType ( 2.5.4.31 NAME 'member' SUP distinguishedName X-SCHEMA 'core' )

objectClass ( 2.5.6.6 NAME 'person' SUP top STRUCTURAL
    MUST ( sn $ cn )
    MAY ( userPassword $ description ) X-SCHEMA 'core' )
objectClass ( 2.5.6.4 NAME 'organization' SUP top STRUCTURAL
    MUST o MAY ( userPassword $ description ) X-SCHEMA 'core' )
objectClass ( 2.5.6.5 NAME 'organizationalUnit' SUP top STRUCTURAL
    MUST ou MAY ( userPassword $ description ) X-SCHEMA 'core' )
objectClass ( 1.3.6.1.4.1.1466.344 NAME 'dcObject' SUP top AUXILIARY
    MUST dc X-SCHEMA 'core' )
objectClass ( 2.5.6.9 NAME 'groupOfNames' SUP top STRUCTURAL
    MUST ( member $ cn ) MAY ( o $ ou $ description ) X-SCHEMA 'core' )
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{DefinitionKind, parse_document};

    #[test]
    fn test_embedded_documents_split_cleanly() {
        let system = parse_document(system_schema()).unwrap();
        assert!(system.iter().any(|e| e.kind == DefinitionKind::Syntax));
        assert!(system.iter().all(|e| e.description.contains("X-SCHEMA 'system'")));

        let core = parse_document(core_schema()).unwrap();
        assert_eq!(
            core.iter()
                .filter(|e| e.kind == DefinitionKind::ObjectClass)
                .count(),
            5
        );
    }
}
