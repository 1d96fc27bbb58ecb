//! MCP resource handlers.
//!
//! Two resources are served:
//! - `mysql://databases` (`listDatabases`): one entry per database
//! - `mysql://databases/{databaseName}` (`readDatabaseSchema`): the schema of
//!   one database as pretty-printed JSON
//!
//! Failures are returned as [`DbError`] and reach the client as JSON-RPC
//! errors; nothing here builds an error envelope.

use crate::db::Catalog;
use crate::error::{DbError, DbResult};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use rmcp::model::{
    AnnotateAble, RawResource, RawResourceTemplate, ReadResourceResult, Resource,
    ResourceContents, ResourceTemplate,
};
use std::sync::Arc;
use tracing::debug;
use url::Url;

pub const DATABASES_URI: &str = "mysql://databases";
pub const DATABASE_SCHEMA_TEMPLATE: &str = "mysql://databases/{databaseName}";

pub const LIST_DATABASES_NAME: &str = "listDatabases";
pub const READ_DATABASE_SCHEMA_NAME: &str = "readDatabaseSchema";

pub const JSON_MIME_TYPE: &str = "application/json";

/// Characters escaped when a database name becomes a URI path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const SCHEME: &str = "mysql";
const DATABASES_HOST: &str = "databases";

/// A resource URI resolved to the operation it addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRequest {
    /// `mysql://databases`
    Databases,
    /// `mysql://databases/<name>`; `None` when the name segment is empty.
    DatabaseSchema { database: Option<String> },
}

/// Resolve `uri` against the two served resources.
///
/// Anything that is not `mysql://databases[/<name>]` is not found. The
/// database name is percent-decoded.
pub fn parse_resource_uri(uri: &str) -> DbResult<ResourceRequest> {
    let url = Url::parse(uri).map_err(|_| DbError::resource_not_found(uri))?;

    if url.scheme() != SCHEME || url.host_str() != Some(DATABASES_HOST) {
        return Err(DbError::resource_not_found(uri));
    }

    let path = url.path();
    if path.is_empty() {
        return Ok(ResourceRequest::Databases);
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    match segments.as_slice() {
        [""] => Ok(ResourceRequest::DatabaseSchema { database: None }),
        [name] => {
            let database = percent_decode_str(name)
                .decode_utf8()
                .map_err(|_| DbError::invalid_resource(uri, "databaseName is not valid UTF-8"))?
                .into_owned();
            Ok(ResourceRequest::DatabaseSchema {
                database: Some(database),
            })
        }
        _ => Err(DbError::resource_not_found(uri)),
    }
}

/// The `readDatabaseSchema` URI of one database.
pub fn database_uri(base: &str, database: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        utf8_percent_encode(database, PATH_SEGMENT)
    )
}

/// Serves the database listing and schema resources from a [`Catalog`].
#[derive(Clone)]
pub struct ResourceHandler {
    catalog: Arc<dyn Catalog>,
}

impl ResourceHandler {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    /// Static resources, as returned by `resources/list`.
    pub fn resources(&self) -> Vec<Resource> {
        let mut databases = RawResource::new(DATABASES_URI, LIST_DATABASES_NAME);
        databases.description = Some("Names of all databases on the MySQL server".to_string());
        databases.mime_type = Some(JSON_MIME_TYPE.to_string());
        vec![databases.no_annotation()]
    }

    /// Resource templates, as returned by `resources/templates/list`.
    pub fn templates(&self) -> Vec<ResourceTemplate> {
        vec![
            RawResourceTemplate {
                uri_template: DATABASE_SCHEMA_TEMPLATE.to_string(),
                name: READ_DATABASE_SCHEMA_NAME.to_string(),
                title: Some("MySQL Database Schema".to_string()),
                description: Some(
                    "Tables of one database with the Field, Type and Comment of every column"
                        .to_string(),
                ),
                mime_type: Some(JSON_MIME_TYPE.to_string()),
            }
            .no_annotation(),
        ]
    }

    /// Read one resource by URI.
    pub async fn read(&self, uri: &str) -> DbResult<ReadResourceResult> {
        match parse_resource_uri(uri)? {
            ResourceRequest::Databases => self.read_databases(uri).await,
            ResourceRequest::DatabaseSchema { database: None } => Err(DbError::invalid_resource(
                uri,
                "missing databaseName in mysql://databases/{databaseName}",
            )),
            ResourceRequest::DatabaseSchema {
                database: Some(database),
            } => self.read_schema(uri, &database).await,
        }
    }

    async fn read_databases(&self, uri: &str) -> DbResult<ReadResourceResult> {
        let databases = self.catalog.list_databases().await?;
        debug!(count = databases.len(), "Serving database list");

        let contents = databases
            .into_iter()
            .map(|name| {
                let entry_uri = database_uri(uri, &name);
                json_contents(name, entry_uri)
            })
            .collect();
        Ok(ReadResourceResult { contents })
    }

    async fn read_schema(&self, uri: &str, database: &str) -> DbResult<ReadResourceResult> {
        let schema = self.catalog.database_schema(database).await?;
        debug!(database, tables = schema.len(), "Serving database schema");

        let text = serde_json::to_string_pretty(&schema)
            .map_err(|e| DbError::internal(format!("Failed to serialize schema: {}", e)))?;
        Ok(ReadResourceResult {
            contents: vec![json_contents(text, uri)],
        })
    }
}

fn json_contents(text: impl Into<String>, uri: impl Into<String>) -> ResourceContents {
    let mut contents = ResourceContents::text(text, uri);
    if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
        *mime_type = Some(JSON_MIME_TYPE.to_string());
    }
    contents
}
