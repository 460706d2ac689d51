//! Distinguished names.
//!
//! This module provides the structured [`Dn`] / [`Rdn`] / [`Ava`] model with an RFC 4514
//! string parser, plus the schema-aware [`DnNormalizer`] and [`DnComparator`] that give DNs
//! their catalog-driven matching semantics.
//!
//! RDNs are kept in string order: index 0 is the leaf, the last RDN is closest to the root.
//!
//! # Examples
//!
//! ```rust
//! use ldap_schema::dn::Dn;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dn = Dn::parse("m-oid=2.5.4.3, ou=attributeTypes, cn=core, ou=schema")?;
//! assert_eq!(dn.len(), 4);
//! assert_eq!(dn.rdn().unwrap().value_of("m-oid"), Some("2.5.4.3"));
//! assert_eq!(dn.to_string(), "m-oid=2.5.4.3,ou=attributeTypes,cn=core,ou=schema");
//! # Ok(())
//! # }
//! ```

pub mod comparator;
pub mod normalizer;

pub use comparator::DnComparator;
pub use normalizer::DnNormalizer;

use crate::error::{SchemaError, SchemaResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// An attribute type and value assertion, the `type=value` pair inside an RDN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ava {
    attr_type: String,
    value: String,
}

impl Ava {
    pub fn new(attr_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attr_type: attr_type.into(),
            value: value.into(),
        }
    }

    pub fn attr_type(&self) -> &str {
        &self.attr_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Ava {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.attr_type)?;
        write_escaped(f, &self.value)
    }
}

/// A relative distinguished name: one or more AVAs joined with `+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rdn {
    avas: Vec<Ava>,
}

impl Rdn {
    /// Create a single-valued RDN.
    pub fn new(attr_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            avas: vec![Ava::new(attr_type, value)],
        }
    }

    /// Create a (possibly multi-valued) RDN from its assertions.
    pub fn from_avas(avas: Vec<Ava>) -> SchemaResult<Self> {
        if avas.is_empty() {
            return Err(SchemaError::invalid_syntax("RDN without assertions", ""));
        }
        Ok(Self { avas })
    }

    /// Parse a single RDN such as `m-oid=2.5.4.3`.
    pub fn parse(raw: &str) -> SchemaResult<Self> {
        let mut rdns = Dn::parse(raw)?.rdns;
        if rdns.len() != 1 {
            return Err(SchemaError::invalid_syntax("expected exactly one RDN", raw));
        }
        Ok(rdns.remove(0))
    }

    pub fn avas(&self) -> &[Ava] {
        &self.avas
    }

    /// Value of the first assertion whose type matches `attr_type` case-insensitively.
    pub fn value_of(&self, attr_type: &str) -> Option<&str> {
        self.avas
            .iter()
            .find(|ava| ava.attr_type.eq_ignore_ascii_case(attr_type))
            .map(|ava| ava.value.as_str())
    }

    /// Type of the first assertion.
    pub fn attr_type(&self) -> &str {
        &self.avas[0].attr_type
    }

    /// Value of the first assertion.
    pub fn value(&self) -> &str {
        &self.avas[0].value
    }

    /// Sort multi-valued assertions into canonical order.
    pub(crate) fn sort(&mut self) {
        self.avas.sort();
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ava) in self.avas.iter().enumerate() {
            if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{}", ava)?;
        }
        Ok(())
    }
}

/// A distinguished name.
///
/// Equality is structural on the stored (possibly unnormalized) text; use
/// [`DnNormalizer`] or [`DnComparator`] for schema-aware matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Dn {
    rdns: Vec<Rdn>,
}

impl Dn {
    /// The empty (root) DN.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_rdns(rdns: Vec<Rdn>) -> Self {
        Self { rdns }
    }

    /// Parse an RFC 4514 string representation.
    ///
    /// Unescaped spaces around types and values are dropped; `\` escapes (special
    /// characters or two hex digits) and double-quoted values are honoured.
    pub fn parse(raw: &str) -> SchemaResult<Self> {
        Parser::new(raw).parse()
    }

    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// The leaf RDN.
    pub fn rdn(&self) -> Option<&Rdn> {
        self.rdns.first()
    }

    /// The DN of the parent entry; the root is its own parent.
    pub fn parent(&self) -> Dn {
        Dn {
            rdns: self.rdns.iter().skip(1).cloned().collect(),
        }
    }

    /// A child of this DN with the given leaf RDN.
    pub fn child(&self, rdn: Rdn) -> Dn {
        let mut rdns = Vec::with_capacity(self.rdns.len() + 1);
        rdns.push(rdn);
        rdns.extend(self.rdns.iter().cloned());
        Dn { rdns }
    }

    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Value of the first RDN (from the leaf) whose type matches `attr_type`.
    pub fn value_of(&self, attr_type: &str) -> Option<&str> {
        self.rdns.iter().find_map(|rdn| rdn.value_of(attr_type))
    }
}

/// Structural ordering: RDNs are compared from the root towards the leaf; when one DN
/// is an ancestor of the other, the ancestor sorts first.
impl Ord for Dn {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.rdns.iter().rev().zip(other.rdns.iter().rev()) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        self.rdns.len().cmp(&other.rdns.len())
    }
}

impl PartialOrd for Dn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdn) in self.rdns.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", rdn)?;
        }
        Ok(())
    }
}

impl Serialize for Dn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Dn::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl FromStr for Dn {
    type Err = SchemaError;

    fn from_str(s: &str) -> SchemaResult<Self> {
        Dn::parse(s)
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        let needs_escape = matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=')
            || (i == 0 && (c == ' ' || c == '#'))
            || (i == last && c == ' ');
        if needs_escape {
            write!(f, "\\")?;
        }
        write!(f, "{}", c)?;
    }
    Ok(())
}

struct Parser<'a> {
    raw: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            chars: raw.char_indices().peekable(),
        }
    }

    fn error(&self, message: impl Into<String>) -> SchemaError {
        SchemaError::invalid_syntax(message, self.raw)
    }

    fn parse(mut self) -> SchemaResult<Dn> {
        let mut rdns = Vec::new();
        if self.raw.trim().is_empty() {
            return Ok(Dn { rdns });
        }

        let mut avas = Vec::new();
        loop {
            let attr_type = self.parse_type()?;
            let (value, terminator) = self.parse_value()?;
            avas.push(Ava { attr_type, value });
            match terminator {
                Some('+') => continue,
                Some(',') | Some(';') => rdns.push(Rdn {
                    avas: std::mem::take(&mut avas),
                }),
                None => {
                    rdns.push(Rdn { avas });
                    break;
                }
                Some(other) => return Err(self.error(format!("unexpected '{}'", other))),
            }
        }
        Ok(Dn { rdns })
    }

    fn skip_spaces(&mut self) {
        while matches!(self.chars.peek(), Some((_, ' '))) {
            self.chars.next();
        }
    }

    fn parse_type(&mut self) -> SchemaResult<String> {
        self.skip_spaces();
        let mut attr_type = String::new();
        loop {
            match self.chars.next() {
                Some((_, '=')) => break,
                Some((_, c)) if c.is_ascii_alphanumeric() || c == '-' || c == '.' => {
                    attr_type.push(c)
                }
                Some((_, ' ')) => {
                    self.skip_spaces();
                    match self.chars.next() {
                        Some((_, '=')) => break,
                        _ => return Err(self.error("attribute type followed by garbage")),
                    }
                }
                Some((_, c)) => {
                    return Err(self.error(format!("invalid character '{}' in attribute type", c)));
                }
                None => return Err(self.error("missing '=' after attribute type")),
            }
        }
        let is_descr = attr_type
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && !attr_type.contains('.');
        let valid = is_descr || crate::oid::is_oid(&attr_type);
        if !valid {
            return Err(self.error(format!("invalid attribute type '{}'", attr_type)));
        }
        Ok(attr_type)
    }

    /// Returns the unescaped value and the separator that ended it.
    fn parse_value(&mut self) -> SchemaResult<(String, Option<char>)> {
        self.skip_spaces();
        if matches!(self.chars.peek(), Some((_, '"'))) {
            return self.parse_quoted_value();
        }

        let mut bytes: Vec<u8> = Vec::new();
        let mut keep = 0;
        let terminator = loop {
            match self.chars.next() {
                None => break None,
                Some((_, c @ (',' | '+' | ';'))) => break Some(c),
                Some((_, '\\')) => {
                    self.parse_escape(&mut bytes)?;
                    keep = bytes.len();
                }
                Some((_, c)) => {
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    if c != ' ' {
                        keep = bytes.len();
                    }
                }
            }
        };
        bytes.truncate(keep);
        let value =
            String::from_utf8(bytes).map_err(|_| self.error("escaped value is not UTF-8"))?;
        Ok((value, terminator))
    }

    fn parse_quoted_value(&mut self) -> SchemaResult<(String, Option<char>)> {
        self.chars.next();
        let mut bytes: Vec<u8> = Vec::new();
        loop {
            match self.chars.next() {
                None => return Err(self.error("unterminated quoted value")),
                Some((_, '"')) => break,
                Some((_, '\\')) => self.parse_escape(&mut bytes)?,
                Some((_, c)) => {
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
            }
        }
        self.skip_spaces();
        let terminator = match self.chars.next() {
            None => None,
            Some((_, c @ (',' | '+' | ';'))) => Some(c),
            Some(_) => return Err(self.error("garbage after quoted value")),
        };
        let value =
            String::from_utf8(bytes).map_err(|_| self.error("escaped value is not UTF-8"))?;
        Ok((value, terminator))
    }

    fn parse_escape(&mut self, bytes: &mut Vec<u8>) -> SchemaResult<()> {
        let first = match self.chars.next() {
            Some((_, c)) => c,
            None => return Err(self.error("dangling escape")),
        };
        if first.is_ascii_hexdigit() {
            let second = match self.chars.next() {
                Some((_, c)) if c.is_ascii_hexdigit() => c,
                _ => return Err(self.error("incomplete hex escape")),
            };
            let hex = [first, second].iter().collect::<String>();
            let byte = u8::from_str_radix(&hex, 16).map_err(|_| self.error("bad hex escape"))?;
            bytes.push(byte);
            return Ok(());
        }
        let mut buf = [0u8; 4];
        bytes.extend_from_slice(first.encode_utf8(&mut buf).as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_simple_dn() {
        let dn = Dn::parse("cn=Alice,dc=example").unwrap();
        assert_eq!(dn.len(), 2);
        assert_eq!(dn.rdn().unwrap().attr_type(), "cn");
        assert_eq!(dn.rdn().unwrap().value(), "Alice");
        assert_eq!(dn.parent().to_string(), "dc=example");
    }

    #[test]
    fn test_parse_trims_unescaped_spaces() {
        let dn = Dn::parse("  CN = alice ,  DC=Example ").unwrap();
        assert_eq!(dn.to_string(), "CN=alice,DC=Example");
    }

    #[test]
    fn test_parse_escapes() {
        let dn = Dn::parse(r"cn=Smith\, John,o=ACME\2C Inc.").unwrap();
        assert_eq!(dn.rdns()[0].value(), "Smith, John");
        assert_eq!(dn.rdns()[1].value(), "ACME, Inc.");
        assert_eq!(dn.to_string(), r"cn=Smith\, John,o=ACME\, Inc.");
    }

    #[test]
    fn test_escaped_trailing_space_is_kept() {
        let dn = Dn::parse(r"cn=trailing\ ").unwrap();
        assert_eq!(dn.rdns()[0].value(), "trailing ");
    }

    #[test]
    fn test_parse_multi_valued_rdn() {
        let dn = Dn::parse("cn=a+sn=b,dc=example").unwrap();
        assert_eq!(dn.rdns()[0].avas().len(), 2);
        assert_eq!(dn.rdns()[0].value_of("SN"), Some("b"));
    }

    #[test]
    fn test_parse_quoted_value() {
        let dn = Dn::parse(r#"cn="a, b" , dc=x"#).unwrap();
        assert_eq!(dn.rdns()[0].value(), "a, b");
    }

    #[test]
    fn test_parse_numeric_type() {
        let dn = Dn::parse("2.5.4.3=x").unwrap();
        assert_eq!(dn.rdns()[0].attr_type(), "2.5.4.3");
    }

    #[test]
    fn test_parse_errors() {
        assert!(Dn::parse("cn").is_err());
        assert!(Dn::parse("=x").is_err());
        assert!(Dn::parse("1cn=x").is_err());
        assert!(Dn::parse(r"cn=x\").is_err());
        assert!(Dn::parse(r#"cn="open"#).is_err());
    }

    #[test]
    fn test_empty_dn_is_root() {
        assert!(Dn::parse("").unwrap().is_empty());
        assert_eq!(Dn::root().parent(), Dn::root());
    }

    #[test]
    fn test_structural_ordering() {
        let parent = Dn::parse("dc=example").unwrap();
        let child = Dn::parse("cn=a,dc=example").unwrap();
        let sibling = Dn::parse("cn=b,dc=example").unwrap();
        assert!(parent < child);
        assert!(child < sibling);
        assert_eq!(child.cmp(&child.clone()), Ordering::Equal);
    }

    #[test]
    fn test_child_and_value_of() {
        let schema = Dn::parse("cn=core,ou=schema").unwrap();
        let dn = schema.child(Rdn::new("ou", "attributeTypes"));
        assert_eq!(dn.to_string(), "ou=attributeTypes,cn=core,ou=schema");
        assert_eq!(dn.value_of("CN"), Some("core"));
    }

    proptest! {
        #[test]
        fn prop_display_then_parse_is_identity(
            values in proptest::collection::vec("[ -~]{1,12}", 1..5)
        ) {
            let rdns = values.iter().map(|v| Rdn::new("cn", v.clone())).collect();
            let dn = Dn::from_rdns(rdns);
            let reparsed = Dn::parse(&dn.to_string()).unwrap();
            prop_assert_eq!(reparsed, dn);
        }
    }
}
