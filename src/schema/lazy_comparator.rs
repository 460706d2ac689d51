//! Serializable comparator handle.

use super::Comparator;
use crate::error::SchemaResult;
use crate::registries::Registries;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::{Arc, OnceLock};

/// A comparator reference that serializes as its OID alone.
///
/// The comparator is looked up on first use and cached together with the identity of the
/// registries it came from. Resolving against other registries looks the comparator up
/// there instead. A failed lookup is not cached, so a later call retries once the
/// comparator has been registered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LazyComparator {
    oid: String,
    #[serde(skip)]
    resolved: OnceLock<(usize, Arc<Comparator>)>,
}

impl LazyComparator {
    pub fn new(oid: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            resolved: OnceLock::new(),
        }
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    pub fn resolve(&self, registries: &Registries) -> SchemaResult<Arc<Comparator>> {
        let owner = std::ptr::from_ref(registries) as usize;
        if let Some((cached_owner, comparator)) = self.resolved.get() {
            if *cached_owner == owner {
                return Ok(Arc::clone(comparator));
            }
        }
        let comparator = registries.comparators().lookup(&self.oid)?;
        self.resolved.get_or_init(|| (owner, Arc::clone(&comparator)));
        Ok(comparator)
    }

    pub fn compare(
        &self,
        registries: &Registries,
        left: &Value,
        right: &Value,
    ) -> SchemaResult<Ordering> {
        self.resolve(registries)?.compare(left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_oid_only_and_resolves_after_deserialization() {
        let registries = Registries::bootstrap().unwrap();
        let lazy = LazyComparator::new("2.5.13.14");
        lazy.resolve(&registries).unwrap();

        let json = serde_json::to_string(&lazy).unwrap();
        assert_eq!(json, r#"{"oid":"2.5.13.14"}"#);

        let restored: LazyComparator = serde_json::from_str(&json).unwrap();
        assert!(!restored.is_resolved());
        let ordering = restored
            .compare(&registries, &"9".into(), &"10".into())
            .unwrap();
        assert_eq!(ordering, Ordering::Less);
        assert!(restored.is_resolved());
    }

    #[test]
    fn test_other_registries_are_not_served_from_cache() {
        let registries = Registries::bootstrap().unwrap();
        let lazy = LazyComparator::new("2.5.13.14");
        lazy.resolve(&registries).unwrap();

        let empty = Registries::new();
        assert!(lazy.resolve(&empty).unwrap_err().is_not_found());
        assert!(lazy.resolve(&registries).is_ok());
    }

    #[test]
    fn test_failed_lookup_is_retried() {
        let registries = Registries::new();
        let lazy = LazyComparator::new("2.5.13.14");
        assert!(lazy.resolve(&registries).unwrap_err().is_not_found());
        assert!(!lazy.is_resolved());
    }
}
