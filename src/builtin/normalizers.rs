//! Built-in normalizer implementations.

use crate::error::{SchemaError, SchemaResult};
use crate::schema::ValueNormalizer;
use crate::value::Value;

/// Collapse inner whitespace runs to one space and trim both ends.
pub(crate) fn deep_trim(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the value unchanged, whatever its shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNormalizer;

impl ValueNormalizer for NoOpNormalizer {
    fn normalize(&self, value: &Value) -> SchemaResult<Value> {
        Ok(value.clone())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DeepTrimNormalizer;

impl ValueNormalizer for DeepTrimNormalizer {
    fn normalize(&self, value: &Value) -> SchemaResult<Value> {
        let text = value.require_str("DeepTrimNormalizer")?;
        Ok(Value::String(deep_trim(text)))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DeepTrimToLowerNormalizer;

impl ValueNormalizer for DeepTrimToLowerNormalizer {
    fn normalize(&self, value: &Value) -> SchemaResult<Value> {
        let text = value.require_str("DeepTrimToLowerNormalizer")?;
        Ok(Value::String(deep_trim(text).to_lowercase()))
    }
}

/// Drops every space from numeric strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumericNormalizer;

impl ValueNormalizer for NumericNormalizer {
    fn normalize(&self, value: &Value) -> SchemaResult<Value> {
        let text = value.require_str("NumericNormalizer")?;
        Ok(Value::String(
            text.chars().filter(|c| !c.is_whitespace()).collect(),
        ))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanNormalizer;

impl ValueNormalizer for BooleanNormalizer {
    fn normalize(&self, value: &Value) -> SchemaResult<Value> {
        let text = value.require_str("BooleanNormalizer")?;
        Ok(Value::String(text.trim().to_ascii_uppercase()))
    }
}

/// Trims OIDs and lowercases descriptors.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectIdentifierNormalizer;

impl ValueNormalizer for ObjectIdentifierNormalizer {
    fn normalize(&self, value: &Value) -> SchemaResult<Value> {
        let text = value.require_str("ObjectIdentifierNormalizer")?.trim();
        if text.is_empty() {
            return Err(SchemaError::invalid_syntax("empty object identifier", text));
        }
        Ok(Value::String(text.to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_trim_to_lower() {
        let normalized = DeepTrimToLowerNormalizer
            .normalize(&"  Hello \t  WORLD  ".into())
            .unwrap();
        assert_eq!(normalized, Value::from("hello world"));
    }

    #[test]
    fn test_string_normalizers_reject_binary() {
        let binary = Value::Binary(vec![0x41]);
        assert!(DeepTrimNormalizer.normalize(&binary).is_err());
        assert!(NumericNormalizer.normalize(&binary).is_err());
        assert_eq!(NoOpNormalizer.normalize(&binary).unwrap(), binary);
    }

    #[test]
    fn test_numeric_and_boolean() {
        assert_eq!(
            NumericNormalizer.normalize(&" 12 34 ".into()).unwrap(),
            Value::from("1234")
        );
        assert_eq!(
            BooleanNormalizer.normalize(&" true".into()).unwrap(),
            Value::from("TRUE")
        );
        assert!(ObjectIdentifierNormalizer.normalize(&"  ".into()).is_err());
    }
}
