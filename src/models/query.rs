//! Query-related data models.

use serde::Serialize;
use serde_json::Value as JsonValue;

/// A result row keyed by column name, in column order.
pub type JsonRow = serde_json::Map<String, JsonValue>;

/// Result of a passthrough SQL statement.
///
/// Serializes untagged: a row set becomes a JSON array of objects, a
/// statement without a result set becomes its execution summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Rows(Vec<JsonRow>),
    Affected(ExecutionSummary),
}

impl QueryOutcome {
    /// Number of rows in a row set, zero for an execution summary.
    pub fn row_count(&self) -> usize {
        match self {
            QueryOutcome::Rows(rows) => rows.len(),
            QueryOutcome::Affected(_) => 0,
        }
    }
}

/// Summary of a statement that returned no rows (INSERT, UPDATE, DDL, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    pub affected_rows: u64,
    pub insert_id: u64,
}
