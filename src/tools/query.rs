//! Query execution tool.
//!
//! This module implements the `executeQuery` MCP tool. The statement runs
//! verbatim against the requested database; every statement is allowed.
//! Unlike the resource handlers, failures are reported inside the tool result
//! (`isError: true`) rather than as protocol errors.

use crate::db::Catalog;
use crate::error::DbError;
use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Prefix of every failure message returned by `executeQuery`.
pub const ERROR_PREFIX: &str = "Error executing query";

/// Input for the executeQuery tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteQueryInput {
    /// SQL statement to execute, sent to the server verbatim
    pub query: String,
    /// Database to select before running the statement
    pub database: String,
}

/// Handler for the executeQuery tool.
#[derive(Clone)]
pub struct QueryToolHandler {
    catalog: Arc<dyn Catalog>,
}

impl QueryToolHandler {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    /// Run the query and wrap the outcome in a tool result.
    pub async fn execute(&self, input: ExecuteQueryInput) -> CallToolResult {
        info!(database = %input.database, "Executing query tool");

        let outcome = match self
            .catalog
            .execute_sql(&input.query, &input.database)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(database = %input.database, error = %e, "Query failed");
                return CallToolResult::error(vec![Content::text(error_text(&e))]);
            }
        };

        match serde_json::to_string_pretty(&outcome) {
            Ok(text) => CallToolResult::success(vec![Content::text(text)]),
            Err(e) => {
                let err = DbError::internal(format!("Failed to serialize result: {}", e));
                CallToolResult::error(vec![Content::text(error_text(&err))])
            }
        }
    }
}

/// The text reported to the client for a failed query.
pub fn error_text(err: &DbError) -> String {
    format!("{}: {}", ERROR_PREFIX, err.message())
}
