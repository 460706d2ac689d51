//! Common test utilities for schema catalog integration testing.
//!
//! This module provides logging setup, manager construction over an in-memory loader,
//! builders for meta-schema entries and schema document fixtures.

#![allow(dead_code)]

pub mod builders;
pub mod fixtures;

use ldap_schema::coordinator::{InMemorySchemaLoader, SchemaInfo, SchemaLoader};
use ldap_schema::{SchemaManager, SchemaManagerBuilder, SchemaManagerConfig};
use std::sync::Arc;

/// Route `log` output through the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A manager over a bootstrap catalog whose loader also knows `schemas`.
///
/// The loader is returned as well so tests can inspect entries and the journal.
pub fn manager_with(schemas: &[SchemaInfo]) -> (SchemaManager, Arc<InMemorySchemaLoader>) {
    manager_with_config(schemas, SchemaManagerConfig::default())
}

pub fn manager_with_config(
    schemas: &[SchemaInfo],
    config: SchemaManagerConfig,
) -> (SchemaManager, Arc<InMemorySchemaLoader>) {
    init_logging();
    let loader = schemas
        .iter()
        .cloned()
        .fold(InMemorySchemaLoader::bootstrap(), |loader, info| {
            loader.with_schema(info, [])
        });
    let loader = Arc::new(loader);
    let shared: Arc<dyn SchemaLoader> = loader.clone();
    let manager = SchemaManagerBuilder::new()
        .with_shared_loader(shared)
        .with_config(config)
        .build()
        .expect("manager builds");
    (manager, loader)
}

/// The usual test layout: enabled `shop` on top of `core`, and a disabled `attic`.
pub fn shop_manager() -> (SchemaManager, Arc<InMemorySchemaLoader>) {
    manager_with(&[
        SchemaInfo::new("shop").with_dependencies(["core"]),
        SchemaInfo::new("attic")
            .with_dependencies(["core"])
            .with_disabled(true),
    ])
}
