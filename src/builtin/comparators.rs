//! Built-in comparator implementations.

use crate::error::{SchemaError, SchemaResult};
use crate::schema::ValueComparator;
use crate::value::Value;
use std::cmp::Ordering;

/// Code point order of string values.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringComparator;

impl ValueComparator for StringComparator {
    fn compare(&self, left: &Value, right: &Value) -> SchemaResult<Ordering> {
        let left = left.require_str("StringComparator")?;
        let right = right.require_str("StringComparator")?;
        Ok(left.cmp(right))
    }
}

/// Lexicographic byte order; accepts string and binary values.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteArrayComparator;

impl ValueComparator for ByteArrayComparator {
    fn compare(&self, left: &Value, right: &Value) -> SchemaResult<Ordering> {
        let left_bytes = left
            .as_bytes()
            .ok_or_else(|| left.unsupported_shape("ByteArrayComparator"))?;
        let right_bytes = right
            .as_bytes()
            .ok_or_else(|| right.unsupported_shape("ByteArrayComparator"))?;
        Ok(left_bytes.cmp(right_bytes))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IntegerComparator;

impl IntegerComparator {
    fn parse(value: &Value) -> SchemaResult<i128> {
        let text = value.require_str("IntegerComparator")?;
        text.trim()
            .parse()
            .map_err(|_| SchemaError::invalid_syntax("not an integer", text))
    }
}

impl ValueComparator for IntegerComparator {
    fn compare(&self, left: &Value, right: &Value) -> SchemaResult<Ordering> {
        Ok(Self::parse(left)?.cmp(&Self::parse(right)?))
    }
}

/// `FALSE` sorts before `TRUE`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanComparator;

impl BooleanComparator {
    fn parse(value: &Value) -> SchemaResult<bool> {
        let text = value.require_str("BooleanComparator")?;
        match text.trim().to_ascii_uppercase().as_str() {
            "TRUE" => Ok(true),
            "FALSE" => Ok(false),
            _ => Err(SchemaError::invalid_syntax("not a boolean", text)),
        }
    }
}

impl ValueComparator for BooleanComparator {
    fn compare(&self, left: &Value, right: &Value) -> SchemaResult<Ordering> {
        Ok(Self::parse(left)?.cmp(&Self::parse(right)?))
    }
}
