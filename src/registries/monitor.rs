//! Registry observation hooks.

use crate::error::SchemaError;
use crate::schema::Registered;
use log::{debug, warn};

/// Observer notified of registration and lookup outcomes of one typed registry.
///
/// Callbacks run after the catalog lock has been released and must not fail; a monitor
/// can observe an error but never change the result of the operation.
pub trait RegistryMonitor<T>: Send + Sync {
    fn registered(&self, _object: &T) {}

    fn register_failed(&self, _object: &T, _error: &SchemaError) {}

    fn looked_up(&self, _object: &T) {}

    fn lookup_failed(&self, _id: &str, _error: &SchemaError) {}
}

/// Default monitor: logs failures and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMonitor;

impl<T: Registered> RegistryMonitor<T> for LoggingMonitor {
    fn register_failed(&self, object: &T, error: &SchemaError) {
        warn!("Failed to register {} {}: {}", T::KIND, object.oid(), error);
    }

    fn lookup_failed(&self, id: &str, error: &SchemaError) {
        debug!("{} lookup for '{}' failed: {}", T::KIND, id, error);
    }
}
