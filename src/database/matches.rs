use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::scoring::{MatchMeta, MatchRecord};

pub fn insert_match(conn: &Connection, custom_id: i64, meta: &MatchMeta) -> Result<i64> {
    let sql = "INSERT INTO matches (custom_id, external_id, map_name, started_at) VALUES (?1, ?2, ?3, ?4) RETURNING id";

    conn.query_row(
        sql,
        params![custom_id, meta.external_id, meta.map_name, meta.started_at],
        |row| row.get(0),
    )
    .context("Failed to insert match")
}

pub fn find_by_external_id(conn: &Connection, custom_id: i64, external_id: &str) -> Result<Option<i64>> {
    let sql = "SELECT id FROM matches WHERE custom_id = ?1 AND external_id = ?2";

    conn.query_row(sql, params![custom_id, external_id], |row| row.get(0))
        .optional()
        .context("Failed to query match by external id")
}

pub fn list_by_custom(conn: &Connection, custom_id: i64) -> Result<Vec<MatchRecord>> {
    let sql = "SELECT id, custom_id, external_id, map_name, started_at FROM matches WHERE custom_id = ?1 ORDER BY id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![custom_id], parse_match_row)?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list matches")
}

/// Deletes the match with its result rows, scoped to the owning custom
pub fn delete_match(conn: &Connection, custom_id: i64, match_id: i64) -> Result<bool> {
    let owned: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM matches WHERE id = ?1 AND custom_id = ?2)",
            params![match_id, custom_id],
            |row| row.get(0),
        )
        .context("Failed to check match ownership")?;
    if !owned {
        return Ok(false);
    }

    conn.execute("DELETE FROM player_results WHERE match_id = ?1", params![match_id])
        .context("Failed to delete player results of match")?;
    conn.execute("DELETE FROM team_results WHERE match_id = ?1", params![match_id])
        .context("Failed to delete team results of match")?;
    conn.execute("DELETE FROM matches WHERE id = ?1", params![match_id])
        .context("Failed to delete match")?;

    Ok(true)
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<MatchRecord> {
    Ok(MatchRecord {
        id: row.get(0)?,
        custom_id: row.get(1)?,
        external_id: row.get(2)?,
        map_name: row.get(3)?,
        started_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup::init_database;

    fn setup() -> (Connection, i64) {
        let conn = Connection::open_in_memory().unwrap();
        init_database(&conn).unwrap();
        let custom_id = conn
            .query_row(
                "INSERT INTO customs (name, mode, placement_points, kill_point_rate) VALUES ('Cup', 'algs', '[]', 1.0) RETURNING id",
                [],
                |row| row.get(0),
            )
            .unwrap();
        (conn, custom_id)
    }

    fn meta(external_id: &str) -> MatchMeta {
        MatchMeta {
            external_id: external_id.to_string(),
            map_name: "mp_rr_tropic_island_mu2".to_string(),
            started_at: None,
        }
    }

    #[test]
    fn test_insert_and_list_in_recording_order() {
        let (conn, custom_id) = setup();
        let first = insert_match(&conn, custom_id, &meta("m1")).unwrap();
        let second = insert_match(&conn, custom_id, &meta("m2")).unwrap();

        let matches = list_by_custom(&conn, custom_id).unwrap();

        assert_eq!(matches.iter().map(|m| m.id).collect::<Vec<_>>(), vec![first, second]);
        assert_eq!(find_by_external_id(&conn, custom_id, "m2").unwrap(), Some(second));
        assert_eq!(find_by_external_id(&conn, custom_id, "m3").unwrap(), None);
    }

    #[test]
    fn test_duplicate_external_id_violates_constraint() {
        let (conn, custom_id) = setup();
        insert_match(&conn, custom_id, &meta("m1")).unwrap();

        assert!(insert_match(&conn, custom_id, &meta("m1")).is_err());
    }

    #[test]
    fn test_delete_is_scoped_to_custom() {
        let (conn, custom_id) = setup();
        let match_id = insert_match(&conn, custom_id, &meta("m1")).unwrap();

        assert!(!delete_match(&conn, custom_id + 1, match_id).unwrap());
        assert!(delete_match(&conn, custom_id, match_id).unwrap());
        assert!(list_by_custom(&conn, custom_id).unwrap().is_empty());
    }
}
