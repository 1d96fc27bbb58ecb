//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Connection pool management
//! - Query execution
//! - Schema introspection
//! - Type mappings
//! - Statement helpers (identifier quoting, result-set classification)

pub mod catalog;
pub mod executor;
pub mod pool;
pub mod schema;
pub mod statement;
pub mod types;

pub use catalog::{Catalog, MySqlCatalog};
pub use executor::QueryExecutor;
pub use pool::ConnectionPool;
pub use schema::{MetadataSource, SchemaInspector, load_schema};
