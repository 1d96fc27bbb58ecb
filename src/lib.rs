//! MySQL MCP Server Library
//!
//! This library exposes a MySQL server to AI assistants over MCP (Model
//! Context Protocol): database listing and per-database schema as resources,
//! and arbitrary SQL execution as the `executeQuery` tool.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod resources;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::DbError;
pub use mcp::MySqlService;
