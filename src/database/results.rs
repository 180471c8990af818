use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::scoring::{PlayerResult, StoredPlayerResult, StoredTeamResult, TeamResult};

pub fn insert_player_result(conn: &Connection, match_id: i64, player: &PlayerResult) -> Result<()> {
    let sql = "INSERT INTO player_results (match_id, player_name, character, team_name, team_number, team_placement, kills, assists, damage_dealt, shots, hits, knockdowns, headshots, revives_given, respawns_given, survival_time, kill_point) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)";

    conn.execute(
        sql,
        params![
            match_id,
            player.player_name,
            player.character,
            player.team_name,
            player.team_number,
            player.team_placement,
            player.kills,
            player.assists,
            player.damage_dealt,
            player.shots,
            player.hits,
            player.knockdowns,
            player.headshots,
            player.revives_given,
            player.respawns_given,
            player.survival_time,
            player.kill_point
        ],
    )
    .with_context(|| format!("Failed to insert result of player {}", player.player_name))?;
    Ok(())
}

pub fn insert_team_result(conn: &Connection, match_id: i64, team: &TeamResult) -> Result<()> {
    let sql = "INSERT INTO team_results (match_id, team_name, team_number, placement, kills, placement_point, kill_point, all_point, winner) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

    conn.execute(
        sql,
        params![
            match_id,
            team.team_name,
            team.team_number,
            team.placement,
            team.kills,
            team.placement_point,
            team.kill_point,
            team.all_point,
            team.winner
        ],
    )
    .with_context(|| format!("Failed to insert result of team {}", team.team_name))?;
    Ok(())
}

/// Team rows of every match of a custom. Unplaced teams (placement 0) sort
/// after placed ones within a match.
pub fn list_team_results(conn: &Connection, custom_id: i64) -> Result<Vec<StoredTeamResult>> {
    let sql = "SELECT tr.match_id, tr.team_name, tr.team_number, tr.placement, tr.kills, tr.placement_point, tr.kill_point, tr.all_point, tr.winner
               FROM team_results tr
               JOIN matches m ON m.id = tr.match_id
               WHERE m.custom_id = ?1
               ORDER BY tr.match_id, tr.placement = 0, tr.placement, tr.id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![custom_id], parse_team_row)?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list team results")
}

pub fn list_player_results(conn: &Connection, custom_id: i64) -> Result<Vec<StoredPlayerResult>> {
    let sql = "SELECT pr.match_id, pr.player_name, pr.character, pr.team_name, pr.team_number, pr.team_placement, pr.kills, pr.assists, pr.damage_dealt, pr.shots, pr.hits, pr.knockdowns, pr.headshots, pr.revives_given, pr.respawns_given, pr.survival_time, pr.kill_point
               FROM player_results pr
               JOIN matches m ON m.id = pr.match_id
               WHERE m.custom_id = ?1
               ORDER BY pr.match_id, pr.id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![custom_id], parse_player_row)?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list player results")
}

pub fn set_winner(conn: &Connection, match_id: i64, team_name: &str, winner: bool) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE team_results SET winner = ?3 WHERE match_id = ?1 AND team_name = ?2",
            params![match_id, team_name, winner],
        )
        .context("Failed to update winner flag")?;
    Ok(changed > 0)
}

fn parse_team_row(row: &rusqlite::Row) -> rusqlite::Result<StoredTeamResult> {
    Ok(StoredTeamResult {
        match_id: row.get(0)?,
        result: TeamResult {
            team_name: row.get(1)?,
            team_number: row.get(2)?,
            placement: row.get(3)?,
            kills: row.get(4)?,
            placement_point: row.get(5)?,
            kill_point: row.get(6)?,
            all_point: row.get(7)?,
            winner: row.get(8)?,
        },
    })
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<StoredPlayerResult> {
    Ok(StoredPlayerResult {
        match_id: row.get(0)?,
        result: PlayerResult {
            player_name: row.get(1)?,
            character: row.get(2)?,
            team_name: row.get(3)?,
            team_number: row.get(4)?,
            team_placement: row.get(5)?,
            kills: row.get(6)?,
            assists: row.get(7)?,
            damage_dealt: row.get(8)?,
            shots: row.get(9)?,
            hits: row.get(10)?,
            knockdowns: row.get(11)?,
            headshots: row.get(12)?,
            revives_given: row.get(13)?,
            respawns_given: row.get(14)?,
            survival_time: row.get(15)?,
            kill_point: row.get(16)?,
        },
    })
}
