//! LDAP schema catalog and metadata-resolution engine.
//!
//! Holds the schema definitions of a directory server (attribute types, object classes,
//! matching rules, syntaxes and the rest of RFC 4512) and answers the questions the
//! server asks about them: which OID a name designates, how values of an attribute are
//! normalized and compared, which object classes an entry may use.
//!
//! # Core Components
//!
//! - [`Registries`] - The catalog: an identifier registry plus one typed registry per kind
//! - [`SchemaDecoder`] - RFC 4512 descriptions to schema objects
//! - [`SchemaManager`] - Applies directory operations on `ou=schema` entries to the catalog
//! - [`LazyComparator`](schema::LazyComparator) - Serializable comparator handle
//!
//! Schema objects refer to each other by OID or name and resolve those references on
//! access, so definitions can be registered in any order.
//!
//! # Quick Start
//!
//! ```rust
//! use ldap_schema::{Registries, load_schema_document};
//! use ldap_schema::schema::SchemaObject;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registries = Registries::bootstrap()?;
//! load_schema_document(
//!     &registries,
//!     "attributetype ( 1.3.6.1.4.1.42.1 NAME 'shoeSize' EQUALITY integerMatch \
//!      SYNTAX 1.3.6.1.4.1.1466.115.121.1.27 X-SCHEMA 'shop' )",
//! )?;
//!
//! let shoe_size = registries.attribute_types().lookup("shoesize")?;
//! assert_eq!(shoe_size.schema_name(), "shop");
//! let equality = shoe_size.equality()?.expect("shoeSize has an equality rule");
//! assert_eq!(equality.name(), "integerMatch");
//! # Ok(())
//! # }
//! ```

pub mod builtin;
pub mod coordinator;
pub mod decoder;
pub mod dn;
pub mod entry;
pub mod error;
pub mod oid;
pub mod registries;
pub mod schema;
pub mod value;

// Re-export commonly used types for convenience
pub use builtin::load_schema_document;
pub use coordinator::{
    InMemorySchemaLoader, SchemaLoader, SchemaManager, SchemaManagerBuilder, SchemaManagerConfig,
};
pub use decoder::SchemaDecoder;
pub use dn::{Dn, Rdn};
pub use entry::{Entry, Modification};
pub use error::{SchemaError, SchemaResult};
pub use oid::Oid;
pub use registries::{Registries, RegistriesRef};
pub use value::Value;
