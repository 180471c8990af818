use anyhow::{Context, Result};
use rusqlite::Connection;

const DROP_TABLES: &str = "
    DROP TABLE IF EXISTS team_results;
    DROP TABLE IF EXISTS player_results;
    DROP TABLE IF EXISTS matches;
    DROP TABLE IF EXISTS customs
";

/// Create any missing tables. Safe to run on every start.
pub fn init_database(conn: &Connection) -> Result<()> {
    let schema_sql = include_str!("schema.sql");
    run_statements(conn, schema_sql)?;

    log::info!("Database schema ready");
    Ok(())
}

/// Drop everything and recreate an empty schema
pub fn reset_database(conn: &Connection) -> Result<()> {
    run_statements(conn, DROP_TABLES).context("Failed to drop existing tables")?;
    init_database(conn)?;

    log::info!("Database schema reset successfully");
    Ok(())
}

fn run_statements(conn: &Connection, sql: &str) -> Result<()> {
    let statements = split_sql_statements(sql);

    for (idx, statement) in statements.iter().enumerate() {
        execute_sql(conn, statement)
            .with_context(|| format!("Failed to execute statement {}", idx + 1))?;
    }
    Ok(())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn execute_sql(conn: &Connection, sql: &str) -> Result<()> {
    conn.execute(sql, [])
        .context("Failed to execute SQL statement")
        .map(|_| ())
}
