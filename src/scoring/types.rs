use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::rule_set::RuleSet;

pub type CustomId = i64;
pub type MatchId = i64;

/// Points are real-valued internally; every output boundary rounds them
pub fn round_point(value: f64) -> i64 {
    value.round() as i64
}

/// A configured tournament and its frozen rule set
#[derive(Debug, Clone, PartialEq)]
pub struct CustomSetting {
    pub id: CustomId,
    pub name: String,
    pub rules: RuleSet,
    pub default_teams: Vec<String>,
    pub spreadsheet_id: Option<String>,
    pub match_count: u32,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewCustom {
    pub name: String,
    pub rules: RuleSet,
    pub default_teams: Vec<String>,
    pub spreadsheet_id: Option<String>,
}

/// Editable part of a tournament; the rule set is never editable
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomUpdate {
    pub name: Option<String>,
    pub default_teams: Option<Vec<String>>,
    pub spreadsheet_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchMeta {
    pub external_id: String,
    pub map_name: String,
    pub started_at: Option<NaiveDateTime>,
}

/// One player's validated telemetry for a match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerStats {
    pub player_name: String,
    pub character: String,
    pub team_name: String,
    pub team_number: u32,
    pub team_placement: u32,
    pub kills: u32,
    pub assists: u32,
    pub damage_dealt: u32,
    pub shots: u32,
    pub hits: u32,
    pub knockdowns: u32,
    pub headshots: u32,
    pub revives_given: u32,
    pub respawns_given: u32,
    pub survival_time: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchTelemetry {
    pub meta: MatchMeta,
    pub players: Vec<PlayerStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResult {
    pub player_name: String,
    pub character: String,
    pub team_name: String,
    pub team_number: u32,
    pub team_placement: u32,
    pub kills: u32,
    pub assists: u32,
    pub damage_dealt: u32,
    pub shots: u32,
    pub hits: u32,
    pub knockdowns: u32,
    pub headshots: u32,
    pub revives_given: u32,
    pub respawns_given: u32,
    pub survival_time: u32,
    pub kill_point: f64,
}

impl PlayerResult {
    pub fn accuracy(&self) -> f64 {
        if self.shots == 0 {
            0.0
        } else {
            f64::from(self.hits) / f64::from(self.shots)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamResult {
    pub team_name: String,
    pub team_number: u32,
    pub placement: u32,
    /// Uncapped kill total; the cap only affects `kill_point`
    pub kills: u32,
    pub placement_point: f64,
    pub kill_point: f64,
    pub all_point: f64,
    pub winner: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResults {
    pub players: Vec<PlayerResult>,
    pub teams: Vec<TeamResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: MatchId,
    pub custom_id: CustomId,
    pub external_id: String,
    pub map_name: String,
    pub started_at: Option<NaiveDateTime>,
}

/// A persisted team row together with the match it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTeamResult {
    pub match_id: MatchId,
    pub result: TeamResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredPlayerResult {
    pub match_id: MatchId,
    pub result: PlayerResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandingsMode {
    Latest,
    #[default]
    Aggregate,
}

/// One ranked line of a standings table, points already rounded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    pub rank: usize,
    pub team_name: String,
    pub team_number: u32,
    /// Set for single-match standings only
    pub placement: Option<u32>,
    pub matches_played: usize,
    pub kills: u32,
    pub placement_point: i64,
    pub kill_point: i64,
    pub all_point: i64,
    pub winner: bool,
    pub match_point: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standings {
    pub custom_id: CustomId,
    pub custom_name: String,
    pub mode: StandingsMode,
    /// The match shown in single-match mode
    pub match_id: Option<MatchId>,
    pub match_count: u32,
    pub rows: Vec<StandingRow>,
}
