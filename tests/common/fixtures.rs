//! Schema document fixtures.
//!
//! Documents live under `tests/fixtures/` and are read once per process.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

static FIXTURE_CACHE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();

/// Load a schema document from the fixtures directory with caching
pub fn load_document(name: &str) -> String {
    let cache = FIXTURE_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock().expect("fixture cache");
    if let Some(cached) = cache.get(name) {
        return cached.clone();
    }

    let fixture_path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    let content = std::fs::read_to_string(&fixture_path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", fixture_path));
    cache.insert(name.to_string(), content.clone());
    content
}

/// The `shop` schema: two attribute types, an object class and a matching rule use.
pub fn shop_schema() -> String {
    load_document("shop.schema")
}
