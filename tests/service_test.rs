//! Handler tests against an in-memory catalog.
//!
//! These cover the resource and tool envelopes without a MySQL server.

use async_trait::async_trait;
use mysql_mcp_server::db::Catalog;
use mysql_mcp_server::error::{DbError, DbResult};
use mysql_mcp_server::mcp::MySqlService;
use mysql_mcp_server::models::{ColumnSchema, JsonRow, QueryOutcome, TableSchema};
use mysql_mcp_server::resources::ResourceHandler;
use mysql_mcp_server::tools::{ExecuteQueryInput, QueryToolHandler};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, RawContent, ResourceContents};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct FakeCatalog {
    schema_calls: AtomicUsize,
    query_calls: AtomicUsize,
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_databases(&self) -> DbResult<Vec<String>> {
        Ok(vec!["app_db".to_string(), "test_db".to_string()])
    }

    async fn database_schema(&self, database: &str) -> DbResult<Vec<TableSchema>> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        match database {
            "app_db" => Ok(vec![TableSchema::new(
                "users",
                vec![
                    ColumnSchema::new("id", "int", Some("primary key".to_string())),
                    ColumnSchema::new("name", "varchar(255)", None),
                ],
            )]),
            "empty_db" => Ok(Vec::new()),
            other => Err(DbError::database(
                format!("Unknown database '{}'", other),
                Some("42000".to_string()),
                "Check the SQL syntax and referenced objects",
            )),
        }
    }

    async fn execute_sql(&self, sql: &str, _database: &str) -> DbResult<QueryOutcome> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if sql.starts_with("SELECT x") {
            return Err(DbError::database(
                "Unknown column 'x'",
                Some("42S22".to_string()),
                "Check the SQL syntax and referenced objects",
            ));
        }
        let mut row = JsonRow::new();
        row.insert("id".to_string(), json!(1));
        row.insert("name".to_string(), json!("alice"));
        row.insert("score".to_string(), json!("12.50"));
        row.insert("deleted_at".to_string(), json!(null));
        Ok(QueryOutcome::Rows(vec![row]))
    }
}

/// Catalog whose database names need escaping inside a URI.
#[derive(Default)]
struct ReservedNamesCatalog {
    requested: std::sync::Mutex<Vec<String>>,
}

const RESERVED_NAMES: [&str; 4] = ["a#b", "c?d", "x%41y", "my db"];

#[async_trait]
impl Catalog for ReservedNamesCatalog {
    async fn list_databases(&self) -> DbResult<Vec<String>> {
        Ok(RESERVED_NAMES.iter().map(|n| n.to_string()).collect())
    }

    async fn database_schema(&self, database: &str) -> DbResult<Vec<TableSchema>> {
        self.requested.lock().unwrap().push(database.to_string());
        Ok(Vec::new())
    }

    async fn execute_sql(&self, _sql: &str, _database: &str) -> DbResult<QueryOutcome> {
        Ok(QueryOutcome::Rows(Vec::new()))
    }
}

fn text_of(contents: &ResourceContents) -> (&str, Option<&str>, &str) {
    match contents {
        ResourceContents::TextResourceContents {
            uri,
            mime_type,
            text,
            ..
        } => (uri.as_str(), mime_type.as_deref(), text.as_str()),
        other => panic!("expected text contents, got {other:?}"),
    }
}

fn tool_text(result: &CallToolResult) -> String {
    assert_eq!(result.content.len(), 1);
    match &result.content[0].raw {
        RawContent::Text(t) => t.text.clone(),
        other => panic!("expected text content, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_databases_resource() {
    let handler = ResourceHandler::new(Arc::new(FakeCatalog::default()));
    let result = handler.read("mysql://databases").await.unwrap();

    assert_eq!(result.contents.len(), 2);
    let (uri, mime, text) = text_of(&result.contents[0]);
    assert_eq!(uri, "mysql://databases/app_db");
    assert_eq!(mime, Some("application/json"));
    assert_eq!(text, "app_db");

    let (uri, _, text) = text_of(&result.contents[1]);
    assert_eq!(uri, "mysql://databases/test_db");
    assert_eq!(text, "test_db");
}

#[tokio::test]
async fn test_listed_uris_read_back_the_same_database() {
    let catalog = Arc::new(ReservedNamesCatalog::default());
    let handler = ResourceHandler::new(catalog.clone());
    let listing = handler.read("mysql://databases").await.unwrap();

    let mut uris = Vec::new();
    for (contents, name) in listing.contents.iter().zip(RESERVED_NAMES) {
        let (uri, _, text) = text_of(contents);
        assert_eq!(text, name);
        uris.push(uri.to_string());
    }
    assert_eq!(uris[0], "mysql://databases/a%23b");
    assert_eq!(uris[1], "mysql://databases/c%3Fd");
    assert_eq!(uris[2], "mysql://databases/x%2541y");

    for uri in &uris {
        handler.read(uri).await.unwrap();
    }
    assert_eq!(*catalog.requested.lock().unwrap(), RESERVED_NAMES.to_vec());
}

#[tokio::test]
async fn test_schema_resource_returns_pretty_json() {
    let catalog = Arc::new(FakeCatalog::default());
    let handler = ResourceHandler::new(catalog.clone());
    let result = handler.read("mysql://databases/app_db").await.unwrap();

    assert_eq!(result.contents.len(), 1);
    let (uri, mime, text) = text_of(&result.contents[0]);
    assert_eq!(uri, "mysql://databases/app_db");
    assert_eq!(mime, Some("application/json"));
    assert!(text.contains('\n'), "schema JSON should be pretty-printed");

    let parsed: serde_json::Value = serde_json::from_str(text).unwrap();
    assert_eq!(
        parsed,
        json!([{
            "table": "users",
            "columns": [
                { "Field": "id", "Type": "int", "Comment": "primary key" },
                { "Field": "name", "Type": "varchar(255)", "Comment": "" }
            ]
        }])
    );
    assert_eq!(catalog.schema_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_schema_resource_for_empty_database() {
    let handler = ResourceHandler::new(Arc::new(FakeCatalog::default()));
    let result = handler.read("mysql://databases/empty_db").await.unwrap();
    let (_, _, text) = text_of(&result.contents[0]);
    assert_eq!(serde_json::from_str::<serde_json::Value>(text).unwrap(), json!([]));
}

#[tokio::test]
async fn test_missing_database_name_skips_schema_query() {
    let catalog = Arc::new(FakeCatalog::default());
    let handler = ResourceHandler::new(catalog.clone());

    let err = handler.read("mysql://databases/").await.unwrap_err();
    assert!(matches!(err, DbError::InvalidResource { .. }));
    assert!(err.to_string().starts_with("Invalid resource"));
    assert_eq!(catalog.schema_calls.load(Ordering::SeqCst), 0);

    let mcp_err: rmcp::ErrorData = err.into();
    assert_eq!(mcp_err.code.0, -32602);
}

#[tokio::test]
async fn test_unknown_resource_is_not_found() {
    let handler = ResourceHandler::new(Arc::new(FakeCatalog::default()));
    let err = handler.read("mysql://tables/users").await.unwrap_err();
    let mcp_err: rmcp::ErrorData = err.into();
    assert_eq!(mcp_err.code.0, -32002);
}

#[tokio::test]
async fn test_schema_failure_propagates_unwrapped() {
    let handler = ResourceHandler::new(Arc::new(FakeCatalog::default()));
    let err = handler.read("mysql://databases/missing").await.unwrap_err();
    assert_eq!(err.message(), "Unknown database 'missing'");

    let mcp_err: rmcp::ErrorData = err.into();
    assert!(mcp_err.message.contains("Unknown database 'missing'"));
}

#[tokio::test]
async fn test_execute_query_success_round_trips() {
    let catalog = Arc::new(FakeCatalog::default());
    let handler = QueryToolHandler::new(catalog.clone());
    let result = handler
        .execute(ExecuteQueryInput {
            query: "SELECT id, name, score, deleted_at FROM users".to_string(),
            database: "app_db".to_string(),
        })
        .await;

    assert_eq!(result.is_error, Some(false));
    let parsed: serde_json::Value = serde_json::from_str(&tool_text(&result)).unwrap();
    assert_eq!(
        parsed,
        json!([{ "id": 1, "name": "alice", "score": "12.50", "deleted_at": null }])
    );
    assert_eq!(catalog.query_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_execute_query_error_envelope() {
    let handler = QueryToolHandler::new(Arc::new(FakeCatalog::default()));
    let result = handler
        .execute(ExecuteQueryInput {
            query: "SELECT x FROM users".to_string(),
            database: "app_db".to_string(),
        })
        .await;

    assert_eq!(result.is_error, Some(true));
    assert_eq!(tool_text(&result), "Error executing query: Unknown column 'x'");
}

#[tokio::test]
async fn test_service_tool_method_wraps_handler() {
    let service = MySqlService::new(Arc::new(FakeCatalog::default()));
    let result = service
        .execute_query(Parameters(ExecuteQueryInput {
            query: "SELECT x".to_string(),
            database: "app_db".to_string(),
        }))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(tool_text(&result).starts_with("Error executing query: "));
}
