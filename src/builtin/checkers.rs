//! Built-in syntax checker implementations.

use crate::dn::Dn;
use crate::oid::is_oid;
use crate::schema::ValueChecker;
use crate::value::Value;

fn text(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Binary(bytes) => std::str::from_utf8(bytes).ok(),
        Value::Dn(_) => None,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllSyntaxChecker;

impl ValueChecker for AcceptAllSyntaxChecker {
    fn is_valid(&self, _value: &Value) -> bool {
        true
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanSyntaxChecker;

impl ValueChecker for BooleanSyntaxChecker {
    fn is_valid(&self, value: &Value) -> bool {
        matches!(text(value), Some("TRUE") | Some("FALSE"))
    }
}

/// Decimal integers without leading zeros; `-0` is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntegerSyntaxChecker;

impl ValueChecker for IntegerSyntaxChecker {
    fn is_valid(&self, value: &Value) -> bool {
        let Some(text) = text(value) else {
            return false;
        };
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return false;
        }
        !(negative && digits == "0")
    }
}

/// Numeric OIDs or descriptors.
#[derive(Debug, Default, Clone, Copy)]
pub struct OidSyntaxChecker;

impl ValueChecker for OidSyntaxChecker {
    fn is_valid(&self, value: &Value) -> bool {
        let Some(text) = text(value) else {
            return false;
        };
        if is_oid(text) {
            return true;
        }
        let mut chars = text.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

/// Any non-empty UTF-8 string.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryStringSyntaxChecker;

impl ValueChecker for DirectoryStringSyntaxChecker {
    fn is_valid(&self, value: &Value) -> bool {
        text(value).is_some_and(|text| !text.is_empty())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Ia5StringSyntaxChecker;

impl ValueChecker for Ia5StringSyntaxChecker {
    fn is_valid(&self, value: &Value) -> bool {
        text(value).is_some_and(|text| text.is_ascii())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PrintableStringSyntaxChecker;

impl ValueChecker for PrintableStringSyntaxChecker {
    fn is_valid(&self, value: &Value) -> bool {
        text(value).is_some_and(|text| {
            !text.is_empty()
                && text
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || " '()+,-./:?=".contains(c))
        })
    }
}

/// Digits and spaces, at least one character.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumericStringSyntaxChecker;

impl ValueChecker for NumericStringSyntaxChecker {
    fn is_valid(&self, value: &Value) -> bool {
        text(value).is_some_and(|text| {
            !text.is_empty() && text.chars().all(|c| c.is_ascii_digit() || c == ' ')
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DnSyntaxChecker;

impl ValueChecker for DnSyntaxChecker {
    fn is_valid(&self, value: &Value) -> bool {
        match value {
            Value::Dn(_) => true,
            other => text(other).is_some_and(|text| Dn::parse(text).is_ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_checker() {
        for valid in ["0", "42", "-17"] {
            assert!(IntegerSyntaxChecker.is_valid(&valid.into()), "{}", valid);
        }
        for invalid in ["", "-", "007", "-0", "1.5", " 1"] {
            assert!(!IntegerSyntaxChecker.is_valid(&invalid.into()), "{}", invalid);
        }
    }

    #[test]
    fn test_oid_checker_accepts_descriptors() {
        assert!(OidSyntaxChecker.is_valid(&"2.5.4.3".into()));
        assert!(OidSyntaxChecker.is_valid(&"cn".into()));
        assert!(OidSyntaxChecker.is_valid(&"x-my-attr".into()));
        assert!(!OidSyntaxChecker.is_valid(&"1cn".into()));
        assert!(!OidSyntaxChecker.is_valid(&"".into()));
    }

    #[test]
    fn test_string_checkers() {
        assert!(PrintableStringSyntaxChecker.is_valid(&"Hello (World)".into()));
        assert!(!PrintableStringSyntaxChecker.is_valid(&"hello!".into()));
        assert!(Ia5StringSyntaxChecker.is_valid(&"user@example.com".into()));
        assert!(!Ia5StringSyntaxChecker.is_valid(&"caf\u{e9}".into()));
        assert!(NumericStringSyntaxChecker.is_valid(&"12 34".into()));
        assert!(!DirectoryStringSyntaxChecker.is_valid(&"".into()));
        assert!(DirectoryStringSyntaxChecker.is_valid(&Value::Binary(b"ok".to_vec())));
    }

    #[test]
    fn test_dn_checker() {
        assert!(DnSyntaxChecker.is_valid(&"cn=a,dc=example".into()));
        assert!(!DnSyntaxChecker.is_valid(&"no equals sign".into()));
        assert!(DnSyntaxChecker.is_valid(&Value::Dn(Dn::root())));
    }
}
