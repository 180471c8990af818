use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::CustomRow;

const CUSTOM_COLUMNS: &str = "id, name, mode, placement_points, kill_point_rate, kill_point_cap, match_point_threshold, default_teams, spreadsheet_id, match_count, created_at";

/// Column values of a new `customs` row
pub struct CustomInsert<'a> {
    pub name: &'a str,
    pub mode: &'a str,
    pub placement_points: String,
    pub kill_point_rate: f64,
    pub kill_point_cap: Option<u32>,
    pub match_point_threshold: Option<u32>,
    pub default_teams: String,
    pub spreadsheet_id: Option<&'a str>,
}

pub fn insert_custom(conn: &Connection, custom: &CustomInsert) -> Result<i64> {
    let sql = "INSERT INTO customs (name, mode, placement_points, kill_point_rate, kill_point_cap, match_point_threshold, default_teams, spreadsheet_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING id";

    conn.query_row(
        sql,
        params![
            custom.name,
            custom.mode,
            custom.placement_points,
            custom.kill_point_rate,
            custom.kill_point_cap,
            custom.match_point_threshold,
            custom.default_teams,
            custom.spreadsheet_id
        ],
        |row| row.get(0),
    )
    .context("Failed to insert custom")
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<CustomRow>> {
    let sql = format!("SELECT {} FROM customs WHERE id = ?1", CUSTOM_COLUMNS);

    conn.query_row(&sql, params![id], parse_custom_row)
        .optional()
        .context("Failed to query custom by id")
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<CustomRow>> {
    let sql = format!("SELECT {} FROM customs WHERE name = ?1", CUSTOM_COLUMNS);

    conn.query_row(&sql, params![name], parse_custom_row)
        .optional()
        .context("Failed to query custom by name")
}

pub fn list_customs(conn: &Connection) -> Result<Vec<CustomRow>> {
    let sql = format!("SELECT {} FROM customs ORDER BY id", CUSTOM_COLUMNS);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], parse_custom_row)?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list customs")
}

pub fn name_taken(conn: &Connection, name: &str, except_id: Option<i64>) -> Result<bool> {
    let sql = "SELECT EXISTS(SELECT 1 FROM customs WHERE name = ?1 AND id != ?2)";

    conn.query_row(sql, params![name, except_id.unwrap_or(-1)], |row| row.get(0))
        .context("Failed to check custom name")
}

pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
    conn.query_row("SELECT EXISTS(SELECT 1 FROM customs WHERE id = ?1)", params![id], |row| row.get(0))
        .context("Failed to check custom existence")
}

/// Only the given fields change; `None` keeps the stored value
pub fn update_custom(
    conn: &Connection,
    id: i64,
    name: Option<&str>,
    default_teams: Option<String>,
    spreadsheet_id: Option<&str>,
) -> Result<bool> {
    let sql = "UPDATE customs SET name = COALESCE(?2, name), default_teams = COALESCE(?3, default_teams), spreadsheet_id = COALESCE(?4, spreadsheet_id) WHERE id = ?1";

    let changed = conn
        .execute(sql, params![id, name, default_teams, spreadsheet_id])
        .context("Failed to update custom")?;
    Ok(changed > 0)
}

pub fn delete_custom(conn: &Connection, id: i64) -> Result<bool> {
    conn.execute(
        "DELETE FROM player_results WHERE match_id IN (SELECT id FROM matches WHERE custom_id = ?1)",
        params![id],
    )
    .context("Failed to delete player results of custom")?;
    conn.execute(
        "DELETE FROM team_results WHERE match_id IN (SELECT id FROM matches WHERE custom_id = ?1)",
        params![id],
    )
    .context("Failed to delete team results of custom")?;
    conn.execute("DELETE FROM matches WHERE custom_id = ?1", params![id])
        .context("Failed to delete matches of custom")?;

    let deleted = conn
        .execute("DELETE FROM customs WHERE id = ?1", params![id])
        .context("Failed to delete custom")?;
    Ok(deleted > 0)
}

/// Returns false when no custom has this id
pub fn adjust_match_count(conn: &Connection, id: i64, delta: i64) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE customs SET match_count = MAX(match_count + ?2, 0) WHERE id = ?1",
            params![id, delta],
        )
        .context("Failed to update match count")?;
    Ok(changed > 0)
}

fn parse_custom_row(row: &rusqlite::Row) -> rusqlite::Result<CustomRow> {
    Ok(CustomRow {
        id: row.get(0)?,
        name: row.get(1)?,
        mode: row.get(2)?,
        placement_points: row.get(3)?,
        kill_point_rate: row.get(4)?,
        kill_point_cap: row.get(5)?,
        match_point_threshold: row.get(6)?,
        default_teams: row.get(7)?,
        spreadsheet_id: row.get(8)?,
        match_count: row.get(9)?,
        created_at: row.get(10)?,
    })
}
