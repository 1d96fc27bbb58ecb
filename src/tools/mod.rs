//! MCP tool implementations.
//!
//! This module contains the database tool handlers:
//! - `executeQuery`: Run a SQL statement against a chosen database

pub mod query;

pub use query::{ExecuteQueryInput, QueryToolHandler};
