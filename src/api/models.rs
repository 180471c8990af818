use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ScoringError;
use crate::scoring::{round_point, CustomSetting, RecordedMatch, RuleSet, StandingsMode, TeamResult};

// --- Requests ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMatchRequest {
    /// Must match the custom's frozen rate when given
    pub kill_point_rate: Option<f64>,
    /// One match object or a full stats API response
    pub telemetry: Value,
    /// Picks the match out of a multi-match stats response
    pub match_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    pub match_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerRequest {
    pub team_name: String,
    pub winner: bool,
}

#[derive(Debug, Deserialize)]
pub struct StandingsParams {
    pub name: String,
    #[serde(default)]
    pub mode: StandingsMode,
}

// --- Responses ---

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    pub retryable: bool,
}

impl From<&ScoringError> for ErrorResponse {
    fn from(err: &ScoringError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind().to_string(),
            retryable: err.is_retryable(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomResponse {
    pub id: i64,
    pub name: String,
    pub rules: RuleSet,
    pub default_teams: Vec<String>,
    pub spreadsheet_id: Option<String>,
    pub match_count: u32,
    pub created_at: Option<NaiveDateTime>,
}

impl From<CustomSetting> for CustomResponse {
    fn from(custom: CustomSetting) -> Self {
        Self {
            id: custom.id,
            name: custom.name,
            rules: custom.rules,
            default_teams: custom.default_teams,
            spreadsheet_id: custom.spreadsheet_id,
            match_count: custom.match_count,
            created_at: custom.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamResultResponse {
    pub team_name: String,
    pub team_number: u32,
    pub placement: u32,
    pub kills: u32,
    pub placement_point: i64,
    pub kill_point: i64,
    pub all_point: i64,
    pub winner: bool,
}

impl From<TeamResult> for TeamResultResponse {
    fn from(team: TeamResult) -> Self {
        Self {
            team_name: team.team_name,
            team_number: team.team_number,
            placement: team.placement,
            kills: team.kills,
            placement_point: round_point(team.placement_point),
            kill_point: round_point(team.kill_point),
            all_point: round_point(team.all_point),
            winner: team.winner,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedMatchResponse {
    pub match_id: i64,
    pub player_count: usize,
    pub teams: Vec<TeamResultResponse>,
}

impl From<RecordedMatch> for RecordedMatchResponse {
    fn from(recorded: RecordedMatch) -> Self {
        Self {
            match_id: recorded.match_id,
            player_count: recorded.player_count,
            teams: recorded.teams.into_iter().map(TeamResultResponse::from).collect(),
        }
    }
}
