//! SQL statement helpers.
//!
//! Identifier quoting for the session statements this server issues itself,
//! and result-set detection used to shape the outcome of passthrough queries.
//! Nothing here restricts which statements may run.

use sqlparser::ast::Statement;
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

/// Quote a MySQL identifier with backticks, doubling embedded backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// `USE <database>` for the given database name.
pub fn use_database(database: &str) -> String {
    format!("USE {}", quote_identifier(database))
}

/// `SHOW FULL COLUMNS FROM <table>` for the given table name.
pub fn show_full_columns(table: &str) -> String {
    format!("SHOW FULL COLUMNS FROM {}", quote_identifier(table))
}

/// Keywords that start a statement returning a result set.
const RESULT_SET_KEYWORDS: &[&str] = &[
    "SELECT", "SHOW", "DESCRIBE", "DESC", "EXPLAIN", "WITH", "VALUES", "TABLE",
];

/// Whether the last statement in `sql` produces a result set.
///
/// Parsed with the MySQL dialect; statements the parser does not understand
/// fall back to a leading-keyword check.
pub fn produces_result_set(sql: &str) -> bool {
    match Parser::parse_sql(&MySqlDialect {}, sql) {
        Ok(statements) => statements.last().is_some_and(is_result_set_statement),
        Err(_) => leading_keyword(sql)
            .map(|kw| RESULT_SET_KEYWORDS.contains(&kw.as_str()))
            .unwrap_or(false),
    }
}

fn is_result_set_statement(stmt: &Statement) -> bool {
    matches!(
        stmt,
        Statement::Query(_)
            | Statement::Explain { .. }
            | Statement::ExplainTable { .. }
            | Statement::ShowCreate { .. }
            | Statement::ShowTables { .. }
            | Statement::ShowColumns { .. }
            | Statement::ShowDatabases { .. }
            | Statement::ShowSchemas { .. }
            | Statement::ShowFunctions { .. }
            | Statement::ShowVariable { .. }
            | Statement::ShowVariables { .. }
            | Statement::ShowStatus { .. }
            | Statement::ShowCollation { .. }
    )
}

/// First keyword of the statement, uppercased, skipping leading comments and parentheses.
fn leading_keyword(sql: &str) -> Option<String> {
    let mut rest = sql.trim_start();
    loop {
        if let Some(after) = rest.strip_prefix("--") {
            rest = after.split_once('\n').map(|(_, r)| r).unwrap_or("").trim_start();
        } else if let Some(after) = rest.strip_prefix('#') {
            rest = after.split_once('\n').map(|(_, r)| r).unwrap_or("").trim_start();
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map(|(_, r)| r).unwrap_or("").trim_start();
        } else if let Some(after) = rest.strip_prefix('(') {
            rest = after.trim_start();
        } else {
            break;
        }
    }

    let keyword: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if keyword.is_empty() {
        None
    } else {
        Some(keyword.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("app_db"), "`app_db`");
        assert_eq!(quote_identifier("my-db"), "`my-db`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_session_statements() {
        assert_eq!(use_database("app_db"), "USE `app_db`");
        assert_eq!(show_full_columns("users"), "SHOW FULL COLUMNS FROM `users`");
    }

    #[test]
    fn test_select_produces_result_set() {
        assert!(produces_result_set("SELECT * FROM users"));
        assert!(produces_result_set("  select 1"));
        assert!(produces_result_set(
            "WITH t AS (SELECT 1 AS n) SELECT n FROM t"
        ));
    }

    #[test]
    fn test_show_and_describe_produce_result_sets() {
        assert!(produces_result_set("SHOW TABLES"));
        assert!(produces_result_set("SHOW DATABASES"));
        assert!(produces_result_set("DESCRIBE users"));
        assert!(produces_result_set("EXPLAIN SELECT * FROM users"));
    }

    #[test]
    fn test_writes_do_not_produce_result_sets() {
        assert!(!produces_result_set("INSERT INTO users (name) VALUES ('a')"));
        assert!(!produces_result_set("UPDATE users SET name = 'b' WHERE id = 1"));
        assert!(!produces_result_set("DELETE FROM users"));
        assert!(!produces_result_set("CREATE TABLE t (id INT)"));
        assert!(!produces_result_set("DROP TABLE t"));
    }

    #[test]
    fn test_last_statement_decides() {
        assert!(produces_result_set("INSERT INTO t VALUES (1); SELECT * FROM t"));
        assert!(!produces_result_set("SELECT 1; DELETE FROM t"));
    }

    #[test]
    fn test_unparseable_falls_back_to_keyword() {
        assert!(produces_result_set("/* hint */ SELECT ?? FROM !!"));
        assert!(produces_result_set("-- comment\nSHOW ENGINE INNODB STATUS garbage ("));
        assert!(!produces_result_set("FLUSH SOMETHING WEIRD ((("));
        assert!(!produces_result_set(""));
    }

    #[test]
    fn test_leading_keyword() {
        assert_eq!(leading_keyword("  (select 1)"), Some("SELECT".to_string()));
        assert_eq!(leading_keyword("# note\nupdate t"), Some("UPDATE".to_string()));
        assert_eq!(leading_keyword("   "), None);
    }
}
