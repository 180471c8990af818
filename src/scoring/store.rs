use crate::errors::ScoringResult;

use super::types::{
    CustomId, CustomSetting, CustomUpdate, MatchId, MatchMeta, MatchRecord, NewCustom, PlayerResult,
    StoredPlayerResult, StoredTeamResult, TeamResult,
};

/// Writes that only ever happen inside a unit of work
pub trait ResultWriter {
    fn insert_custom(&mut self, custom: &NewCustom) -> ScoringResult<CustomId>;

    /// Returns false when the tournament does not exist
    fn update_custom(&mut self, id: CustomId, update: &CustomUpdate) -> ScoringResult<bool>;

    /// Removes the tournament with all its matches and result rows
    fn delete_custom(&mut self, id: CustomId) -> ScoringResult<bool>;

    fn insert_match(&mut self, custom_id: CustomId, meta: &MatchMeta) -> ScoringResult<MatchId>;

    fn insert_player_results(&mut self, match_id: MatchId, players: &[PlayerResult]) -> ScoringResult<()>;

    fn insert_team_results(&mut self, match_id: MatchId, teams: &[TeamResult]) -> ScoringResult<()>;

    /// Fails with a configuration error when the tournament is gone
    fn adjust_match_count(&mut self, custom_id: CustomId, delta: i64) -> ScoringResult<()>;

    /// Removes one match and its result rows. Returns false when the match
    /// does not belong to the tournament.
    fn delete_match(&mut self, custom_id: CustomId, match_id: MatchId) -> ScoringResult<bool>;

    fn set_winner(&mut self, match_id: MatchId, team_name: &str, winner: bool) -> ScoringResult<bool>;
}

/// Storage collaborator of the scoring engine
pub trait CustomsStore {
    fn find_custom(&mut self, id: CustomId) -> ScoringResult<Option<CustomSetting>>;

    fn find_custom_by_name(&mut self, name: &str) -> ScoringResult<Option<CustomSetting>>;

    fn list_customs(&mut self) -> ScoringResult<Vec<CustomSetting>>;

    /// Matches ordered by id, i.e. recording order
    fn list_matches(&mut self, custom_id: CustomId) -> ScoringResult<Vec<MatchRecord>>;

    /// Team rows ordered by match id, then placement
    fn list_team_results(&mut self, custom_id: CustomId) -> ScoringResult<Vec<StoredTeamResult>>;

    fn list_player_results(&mut self, custom_id: CustomId) -> ScoringResult<Vec<StoredPlayerResult>>;

    /// Runs `work` as one all-or-nothing unit. An `Err` from `work` discards
    /// every write it made.
    fn in_transaction<T, F>(&mut self, work: F) -> ScoringResult<T>
    where
        F: FnOnce(&mut dyn ResultWriter) -> ScoringResult<T>;
}
