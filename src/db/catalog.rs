//! The query surface consumed by the MCP handlers.

use crate::db::executor::QueryExecutor;
use crate::db::pool::ConnectionPool;
use crate::db::schema::SchemaInspector;
use crate::error::DbResult;
use crate::models::{QueryOutcome, TableSchema};
use async_trait::async_trait;

/// Database operations exposed through resources and tools.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Names of all databases, in server order.
    async fn list_databases(&self) -> DbResult<Vec<String>>;

    /// Table and column descriptors of one database.
    async fn database_schema(&self, database: &str) -> DbResult<Vec<TableSchema>>;

    /// Run arbitrary SQL with `database` selected.
    async fn execute_sql(&self, sql: &str, database: &str) -> DbResult<QueryOutcome>;
}

/// [`Catalog`] backed by a live MySQL connection pool.
#[derive(Debug, Clone)]
pub struct MySqlCatalog {
    pool: ConnectionPool,
}

impl MySqlCatalog {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

#[async_trait]
impl Catalog for MySqlCatalog {
    async fn list_databases(&self) -> DbResult<Vec<String>> {
        SchemaInspector::list_databases(&self.pool).await
    }

    async fn database_schema(&self, database: &str) -> DbResult<Vec<TableSchema>> {
        SchemaInspector::database_schema(&self.pool, database).await
    }

    async fn execute_sql(&self, sql: &str, database: &str) -> DbResult<QueryOutcome> {
        QueryExecutor::execute_sql(&self.pool, sql, database).await
    }
}
