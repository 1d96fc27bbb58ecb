//! Schema-related data models.
//!
//! These are the descriptors served by the `readDatabaseSchema` resource.
//! Field names on the wire follow the headers of MySQL's `SHOW FULL COLUMNS`.

use serde::{Deserialize, Serialize};

/// One table of a database together with its columns, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Create a new table schema.
    pub fn new(table: impl Into<String>, columns: Vec<ColumnSchema>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }
}

/// The subset of column metadata exposed to clients.
///
/// Nullability, keys, defaults and privileges are intentionally not carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    #[serde(rename = "Field")]
    pub field: String,
    /// Declared type, e.g. "varchar(255)" or "int unsigned"
    #[serde(rename = "Type")]
    pub column_type: String,
    /// Empty when the column has no comment
    #[serde(rename = "Comment")]
    pub comment: String,
}

impl ColumnSchema {
    /// Create a new column schema. A missing comment becomes an empty string.
    pub fn new(
        field: impl Into<String>,
        column_type: impl Into<String>,
        comment: Option<String>,
    ) -> Self {
        Self {
            field: field.into(),
            column_type: column_type.into(),
            comment: comment.unwrap_or_default(),
        }
    }
}
