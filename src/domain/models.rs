use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ScoringError, ScoringResult};
use crate::scoring::{MatchMeta, MatchTelemetry, PlayerStats};

/// Per-player ceiling for kills, assists and knockdowns in one match
pub const MAX_PLAYER_TAKEDOWNS: u32 = 1_000;
/// Per-player ceiling for damage dealt in one match
pub const MAX_PLAYER_DAMAGE: u32 = 1_000_000;

// --- Stats API Response Structures ---

/// Raw response of the custom-match stats API
#[derive(Debug, Deserialize, Serialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub matches: Vec<Value>,
}

/// Raw match object. Numeric fields may be absent and then count as zero.
#[derive(Debug, Deserialize, Serialize)]
pub struct MatchResponse {
    pub mid: Option<String>,
    pub map_name: Option<String>,
    /// Unix seconds
    pub match_start: Option<i64>,
    pub player_results: Option<Vec<PlayerResultResponse>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResultResponse {
    pub player_name: Option<String>,
    pub character_name: Option<String>,
    pub team_name: Option<String>,
    pub team_num: Option<u32>,
    pub team_placement: Option<u32>,
    pub kills: Option<u32>,
    pub assists: Option<u32>,
    pub damage_dealt: Option<u32>,
    pub shots: Option<u32>,
    pub hits: Option<u32>,
    pub knockdowns: Option<u32>,
    pub headshots: Option<u32>,
    pub revives_given: Option<u32>,
    pub respawns_given: Option<u32>,
    pub survival_time: Option<u32>,
}

impl MatchResponse {
    pub fn id(&self) -> Option<&str> {
        self.mid.as_deref().filter(|m| !m.is_empty())
    }

    /// Validate into strict telemetry. Missing counters become zero; missing
    /// identity (match id, player name, team name) is rejected.
    pub fn into_telemetry(self) -> ScoringResult<MatchTelemetry> {
        let external_id = self
            .id()
            .map(str::to_string)
            .ok_or_else(|| ScoringError::validation("match is missing its id (mid)"))?;

        let players = self.player_results.unwrap_or_default();
        if players.is_empty() {
            return Err(ScoringError::validation(format!("match {} has no player results", external_id)));
        }

        let players = players
            .into_iter()
            .enumerate()
            .map(|(idx, p)| p.into_stats(idx))
            .collect::<ScoringResult<Vec<_>>>()?;

        let started_at = self
            .match_start
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc());

        Ok(MatchTelemetry {
            meta: MatchMeta {
                external_id,
                map_name: self.map_name.unwrap_or_default(),
                started_at,
            },
            players,
        })
    }
}

impl PlayerResultResponse {
    fn into_stats(self, idx: usize) -> ScoringResult<PlayerStats> {
        let player_name = required_text(self.player_name, "playerName", idx)?;
        let team_name = required_text(self.team_name, "teamName", idx)?;
        let kills = bounded(self.kills, "kills", MAX_PLAYER_TAKEDOWNS, idx)?;
        let assists = bounded(self.assists, "assists", MAX_PLAYER_TAKEDOWNS, idx)?;
        let knockdowns = bounded(self.knockdowns, "knockdowns", MAX_PLAYER_TAKEDOWNS, idx)?;
        let damage_dealt = bounded(self.damage_dealt, "damageDealt", MAX_PLAYER_DAMAGE, idx)?;

        Ok(PlayerStats {
            player_name,
            character: self.character_name.unwrap_or_default(),
            team_name,
            team_number: self.team_num.unwrap_or(0),
            team_placement: self.team_placement.unwrap_or(0),
            kills,
            assists,
            damage_dealt,
            shots: self.shots.unwrap_or(0),
            hits: self.hits.unwrap_or(0),
            knockdowns,
            headshots: self.headshots.unwrap_or(0),
            revives_given: self.revives_given.unwrap_or(0),
            respawns_given: self.respawns_given.unwrap_or(0),
            survival_time: self.survival_time.unwrap_or(0),
        })
    }
}

fn required_text(value: Option<String>, field: &str, idx: usize) -> ScoringResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ScoringError::validation(format!("player result {} is missing {}", idx + 1, field)))
}

fn bounded(value: Option<u32>, field: &str, max: u32, idx: usize) -> ScoringResult<u32> {
    match value.unwrap_or(0) {
        count if count > max => Err(ScoringError::validation(format!(
            "player result {} has implausible {} ({} > {})",
            idx + 1,
            field,
            count,
            max
        ))),
        count => Ok(count),
    }
}

/// Parse a single raw match object
pub fn parse_match(value: Value) -> ScoringResult<MatchTelemetry> {
    let response: MatchResponse = serde_json::from_value(value)
        .map_err(|e| ScoringError::validation(format!("malformed match telemetry: {}", e)))?;
    response.into_telemetry()
}

/// Accepts either one match object or a full stats response. A full response
/// needs `match_id` unless it holds exactly one match.
pub fn select_match(value: Value, match_id: Option<&str>) -> ScoringResult<Value> {
    if value.get("matches").is_none() {
        return Ok(value);
    }

    let response: StatsResponse = serde_json::from_value(value)
        .map_err(|e| ScoringError::validation(format!("malformed stats response: {}", e)))?;

    match match_id {
        Some(id) => response
            .matches
            .into_iter()
            .find(|m| m.get("mid").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| ScoringError::not_found(format!("match {} in stats response", id))),
        None => {
            let count = response.matches.len();
            let mut matches = response.matches.into_iter();
            match (matches.next(), count) {
                (Some(only), 1) => Ok(only),
                _ => Err(ScoringError::validation(format!(
                    "stats response holds {} matches, a match id is required",
                    count
                ))),
            }
        }
    }
}
