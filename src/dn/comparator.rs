//! Schema-aware DN comparison.

use super::DnNormalizer;
use crate::error::SchemaResult;
use crate::registries::RegistriesRef;
use crate::schema::ValueComparator;
use crate::value::Value;
use std::cmp::Ordering;

/// Compares DNs after normalizing both sides with a [`DnNormalizer`].
#[derive(Debug, Clone)]
pub struct DnComparator {
    normalizer: DnNormalizer,
}

impl DnComparator {
    pub fn new(registries: RegistriesRef) -> Self {
        Self {
            normalizer: DnNormalizer::new(registries),
        }
    }
}

impl ValueComparator for DnComparator {
    fn compare(&self, left: &Value, right: &Value) -> SchemaResult<Ordering> {
        let left = self.normalizer.normalize_value(left)?;
        let right = self.normalizer.normalize_value(right)?;
        Ok(left.cmp(&right))
    }
}
