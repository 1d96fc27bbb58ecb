//! Schema introspection module.
//!
//! Database listing runs straight on the pool. Schema description needs a
//! session (`USE` followed by `SHOW` statements), so it borrows one connection
//! for the whole sequence.
//!
//! # Architecture
//!
//! The statement sequence lives in [`load_schema`], written against the
//! [`MetadataSource`] trait. `MySqlConnection` implements the trait with real
//! `SHOW` statements; anything else implementing it (a recording fake, for
//! instance) sees exactly the same calls in the same order.

use crate::db::pool::ConnectionPool;
use crate::db::statement;
use crate::error::DbResult;
use crate::models::{ColumnSchema, TableSchema};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::{Executor, Row};
use tracing::debug;

/// Schema inspector for database introspection.
pub struct SchemaInspector;

impl SchemaInspector {
    /// List every database visible to the connected user, in server order.
    ///
    /// System databases are not filtered out.
    pub async fn list_databases(pool: &ConnectionPool) -> DbResult<Vec<String>> {
        let rows = pool
            .inner()
            .fetch_all(sqlx::query(queries::SHOW_DATABASES))
            .await?;

        // SHOW DATABASES returns a single column "Database"
        let databases: Vec<String> = rows
            .iter()
            .filter_map(|row| get_string_by_index(row, 0))
            .collect();

        debug!(count = databases.len(), "Listed databases");
        Ok(databases)
    }

    /// Describe every table of `database`.
    ///
    /// The borrowed connection goes back to the pool when this returns,
    /// whether or not a statement failed.
    pub async fn database_schema(
        pool: &ConnectionPool,
        database: &str,
    ) -> DbResult<Vec<TableSchema>> {
        let mut conn = pool.acquire().await?;
        load_schema(&mut *conn, database).await
    }
}

/// Session-scoped metadata statements used to describe a database.
#[async_trait]
pub trait MetadataSource: Send {
    /// Switch the session's default database.
    async fn use_database(&mut self, database: &str) -> DbResult<()>;

    /// Table names of the current database, in server order.
    async fn show_tables(&mut self) -> DbResult<Vec<String>>;

    /// Column descriptors of one table of the current database.
    async fn show_full_columns(&mut self, table: &str) -> DbResult<Vec<ColumnSchema>>;
}

/// Build the schema description of `database` through `source`.
///
/// Issues one `USE`, one `SHOW TABLES`, then one `SHOW FULL COLUMNS` per table,
/// sequentially. The first failure stops the sequence and is returned.
pub async fn load_schema<S>(source: &mut S, database: &str) -> DbResult<Vec<TableSchema>>
where
    S: MetadataSource + ?Sized,
{
    source.use_database(database).await?;
    let tables = source.show_tables().await?;

    let mut schema = Vec::with_capacity(tables.len());
    for table in tables {
        let columns = source.show_full_columns(&table).await?;
        schema.push(TableSchema::new(table, columns));
    }

    debug!(database, tables = schema.len(), "Loaded database schema");
    Ok(schema)
}

#[async_trait]
impl MetadataSource for MySqlConnection {
    async fn use_database(&mut self, database: &str) -> DbResult<()> {
        let sql = statement::use_database(database);
        Executor::execute(&mut *self, sqlx::raw_sql(&sql)).await?;
        Ok(())
    }

    async fn show_tables(&mut self) -> DbResult<Vec<String>> {
        let rows = Executor::fetch_all(&mut *self, sqlx::raw_sql(queries::SHOW_TABLES)).await?;

        // The header is "Tables_in_<database>", so read by position
        Ok(rows
            .iter()
            .filter_map(|row| get_string_by_index(row, 0))
            .collect())
    }

    async fn show_full_columns(&mut self, table: &str) -> DbResult<Vec<ColumnSchema>> {
        let sql = statement::show_full_columns(table);
        let rows = Executor::fetch_all(&mut *self, sqlx::raw_sql(&sql)).await?;

        Ok(rows
            .iter()
            .map(|row| {
                ColumnSchema::new(
                    get_string(row, "Field"),
                    get_string(row, "Type"),
                    get_optional_string(row, "Comment"),
                )
            })
            .collect())
    }
}

// =============================================================================
// SQL Query Templates
// =============================================================================

mod queries {
    pub const SHOW_DATABASES: &str = "SHOW DATABASES";

    pub const SHOW_TABLES: &str = "SHOW TABLES";
}

// =============================================================================
// Row helpers
// =============================================================================
//
// MySQL may report metadata columns as VARBINARY instead of VARCHAR depending
// on charset configuration, so every accessor falls back to raw bytes.

fn get_string(row: &MySqlRow, column: &str) -> String {
    get_optional_string(row, column).unwrap_or_default()
}

fn get_optional_string(row: &MySqlRow, column: &str) -> Option<String> {
    row.try_get::<Option<String>, _>(column)
        .ok()
        .flatten()
        .or_else(|| {
            row.try_get::<Option<Vec<u8>>, _>(column)
                .ok()
                .flatten()
                .and_then(|bytes| String::from_utf8(bytes).ok())
        })
}

fn get_string_by_index(row: &MySqlRow, index: usize) -> Option<String> {
    row.try_get::<String, _>(index).ok().or_else(|| {
        row.try_get::<Vec<u8>, _>(index)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
    })
}
