//! Query execution engine.
//!
//! Runs client-supplied SQL verbatim against a chosen database. Statements
//! are sent over the text protocol so that session statements such as `USE`
//! and anything the server refuses to prepare still work.
//!
//! Nothing is restricted or rewritten here: every statement executes.

use crate::db::pool::ConnectionPool;
use crate::db::statement;
use crate::db::types::RowToJson;
use crate::error::DbResult;
use crate::models::{ExecutionSummary, JsonRow, QueryOutcome};
use futures_util::TryStreamExt;
use sqlx::mysql::MySqlConnection;
use sqlx::{Either, Executor};
use std::time::Instant;
use tracing::debug;

/// Query executor that handles passthrough SQL execution.
pub struct QueryExecutor;

impl QueryExecutor {
    /// Execute `sql` with `database` as the session's default database.
    ///
    /// The borrowed connection goes back to the pool when this returns,
    /// whether or not a statement failed.
    pub async fn execute_sql(
        pool: &ConnectionPool,
        sql: &str,
        database: &str,
    ) -> DbResult<QueryOutcome> {
        let start = Instant::now();
        debug!(%sql, database, "Executing query");

        let mut conn = pool.acquire().await?;
        let use_sql = statement::use_database(database);
        conn.execute(sqlx::raw_sql(&use_sql)).await?;

        let (rows, summary) = run_statements(&mut conn, sql).await?;
        let outcome = shape_outcome(sql, rows, summary);

        debug!(
            rows = outcome.row_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Query completed"
        );
        Ok(outcome)
    }
}

/// Run every statement in `sql`, collecting all rows and a combined summary.
async fn run_statements(
    conn: &mut MySqlConnection,
    sql: &str,
) -> DbResult<(Vec<JsonRow>, ExecutionSummary)> {
    let mut rows = Vec::new();
    let mut summary = ExecutionSummary::default();

    let mut stream = conn.fetch_many(sqlx::raw_sql(sql));
    while let Some(step) = stream.try_next().await? {
        match step {
            Either::Left(result) => {
                summary.affected_rows += result.rows_affected();
                if result.last_insert_id() != 0 {
                    summary.insert_id = result.last_insert_id();
                }
            }
            Either::Right(row) => rows.push(row.to_json_map()),
        }
    }

    Ok((rows, summary))
}

/// Pick the response shape for a finished statement.
///
/// Rows win whenever there are any. A row-returning statement that matched
/// nothing is still an (empty) row set; everything else reports its summary.
pub fn shape_outcome(sql: &str, rows: Vec<JsonRow>, summary: ExecutionSummary) -> QueryOutcome {
    if !rows.is_empty() || statement::produces_result_set(sql) {
        QueryOutcome::Rows(rows)
    } else {
        QueryOutcome::Affected(summary)
    }
}
