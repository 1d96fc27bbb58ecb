//! MCP service implementation using rmcp.
//!
//! This module defines the MySqlService struct exposing the database
//! resources and the `executeQuery` tool via the MCP protocol using the
//! rmcp framework's macros.

use crate::db::Catalog;
use crate::resources::ResourceHandler;
use crate::tools::query::{ExecuteQueryInput, QueryToolHandler};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        CallToolResult, Implementation, ListResourceTemplatesResult, ListResourcesResult,
        PaginatedRequestParam, ProtocolVersion, ReadResourceRequestParam, ReadResourceResult,
        ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct MySqlService {
    /// Resource handler for `mysql://databases[/{databaseName}]`
    resources: ResourceHandler,
    /// Handler behind the executeQuery tool
    queries: QueryToolHandler,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl MySqlService {
    /// Create a new MySqlService serving everything from `catalog`.
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            resources: ResourceHandler::new(catalog.clone()),
            queries: QueryToolHandler::new(catalog),
            tool_router: Self::tool_router(),
        }
    }

    /// Resource handler shared with the protocol methods.
    pub fn resource_handler(&self) -> &ResourceHandler {
        &self.resources
    }
}

#[tool_router]
impl MySqlService {
    #[tool(
        name = "executeQuery",
        description = "Execute a SQL query against a MySQL database.\nThe query runs verbatim after selecting `database`.\nReturns rows as a JSON array of objects, or {affectedRows, insertId} for statements without a result set."
    )]
    pub async fn execute_query(
        &self,
        Parameters(input): Parameters<ExecuteQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.queries.execute(input).await)
    }
}

#[tool_handler]
impl ServerHandler for MySqlService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "mysql-mcp-server".to_owned(),
                title: Some("MySQL MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "MySQL databases, schemas and queries.\n\
                \n\
                ## Workflow\n\
                1. Read `mysql://databases` to list the databases on the server\n\
                2. Read `mysql://databases/{databaseName}` to get its tables and columns\n\
                3. Call `executeQuery` with `query` and `database` to run SQL\n\
                \n\
                ## Notes\n\
                - Statements are not restricted: writes and DDL execute as sent\n\
                - Query failures are returned as text starting with \"Error executing query:\""
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(
            self.resources.resources(),
        ))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult::with_all_items(
            self.resources.templates(),
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        debug!(uri = %request.uri, "Reading resource");
        self.resources
            .read(&request.uri)
            .await
            .map_err(McpError::from)
    }
}
