//! In-memory `CustomsStore` used by the engine tests. A unit of work runs on
//! a copy of the state and only replaces it when the work succeeds.

use crate::errors::{ScoringError, ScoringResult};

use super::store::{CustomsStore, ResultWriter};
use super::types::{
    CustomId, CustomSetting, CustomUpdate, MatchId, MatchMeta, MatchRecord, NewCustom, PlayerResult,
    StoredPlayerResult, StoredTeamResult, TeamResult,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    customs: Vec<CustomSetting>,
    matches: Vec<MatchRecord>,
    teams: Vec<StoredTeamResult>,
    players: Vec<StoredPlayerResult>,
    next_custom_id: CustomId,
    next_match_id: MatchId,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: MemoryState,
    /// Makes every team insert fail, to exercise rollback
    pub fail_team_inserts: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn team_row_count(&self) -> usize {
        self.state.teams.len()
    }

    pub fn player_row_count(&self) -> usize {
        self.state.players.len()
    }
}

struct MemoryWriter {
    state: MemoryState,
    fail_team_inserts: bool,
}

impl ResultWriter for MemoryWriter {
    fn insert_custom(&mut self, custom: &NewCustom) -> ScoringResult<CustomId> {
        if self.state.customs.iter().any(|c| c.name == custom.name) {
            return Err(ScoringError::validation(format!("custom name '{}' is already in use", custom.name)));
        }
        self.state.next_custom_id += 1;
        let id = self.state.next_custom_id;
        self.state.customs.push(CustomSetting {
            id,
            name: custom.name.clone(),
            rules: custom.rules.clone(),
            default_teams: custom.default_teams.clone(),
            spreadsheet_id: custom.spreadsheet_id.clone(),
            match_count: 0,
            created_at: None,
        });
        Ok(id)
    }

    fn update_custom(&mut self, id: CustomId, update: &CustomUpdate) -> ScoringResult<bool> {
        if let Some(name) = &update.name {
            if self.state.customs.iter().any(|c| c.id != id && &c.name == name) {
                return Err(ScoringError::validation(format!("custom name '{}' is already in use", name)));
            }
        }
        let Some(custom) = self.state.customs.iter_mut().find(|c| c.id == id) else {
            return Ok(false);
        };
        if let Some(name) = &update.name {
            custom.name = name.clone();
        }
        if let Some(teams) = &update.default_teams {
            custom.default_teams = teams.clone();
        }
        if update.spreadsheet_id.is_some() {
            custom.spreadsheet_id = update.spreadsheet_id.clone();
        }
        Ok(true)
    }

    fn delete_custom(&mut self, id: CustomId) -> ScoringResult<bool> {
        let before = self.state.customs.len();
        self.state.customs.retain(|c| c.id != id);
        if self.state.customs.len() == before {
            return Ok(false);
        }
        let match_ids: Vec<MatchId> = self
            .state
            .matches
            .iter()
            .filter(|m| m.custom_id == id)
            .map(|m| m.id)
            .collect();
        self.state.matches.retain(|m| m.custom_id != id);
        self.state.teams.retain(|t| !match_ids.contains(&t.match_id));
        self.state.players.retain(|p| !match_ids.contains(&p.match_id));
        Ok(true)
    }

    fn insert_match(&mut self, custom_id: CustomId, meta: &MatchMeta) -> ScoringResult<MatchId> {
        if !self.state.customs.iter().any(|c| c.id == custom_id) {
            return Err(ScoringError::configuration(format!("custom {} no longer exists", custom_id)));
        }
        if self
            .state
            .matches
            .iter()
            .any(|m| m.custom_id == custom_id && m.external_id == meta.external_id)
        {
            return Err(ScoringError::validation(format!("match {} is already recorded", meta.external_id)));
        }
        self.state.next_match_id += 1;
        let id = self.state.next_match_id;
        self.state.matches.push(MatchRecord {
            id,
            custom_id,
            external_id: meta.external_id.clone(),
            map_name: meta.map_name.clone(),
            started_at: meta.started_at,
        });
        Ok(id)
    }

    fn insert_player_results(&mut self, match_id: MatchId, players: &[PlayerResult]) -> ScoringResult<()> {
        self.state.players.extend(players.iter().map(|p| StoredPlayerResult {
            match_id,
            result: p.clone(),
        }));
        Ok(())
    }

    fn insert_team_results(&mut self, match_id: MatchId, teams: &[TeamResult]) -> ScoringResult<()> {
        if self.fail_team_inserts {
            return Err(ScoringError::Storage(anyhow::anyhow!("disk I/O error")));
        }
        self.state.teams.extend(teams.iter().map(|t| StoredTeamResult {
            match_id,
            result: t.clone(),
        }));
        Ok(())
    }

    fn adjust_match_count(&mut self, custom_id: CustomId, delta: i64) -> ScoringResult<()> {
        let custom = self
            .state
            .customs
            .iter_mut()
            .find(|c| c.id == custom_id)
            .ok_or_else(|| ScoringError::configuration(format!("custom {} no longer exists", custom_id)))?;
        custom.match_count = (i64::from(custom.match_count) + delta).max(0) as u32;
        Ok(())
    }

    fn delete_match(&mut self, custom_id: CustomId, match_id: MatchId) -> ScoringResult<bool> {
        let before = self.state.matches.len();
        self.state
            .matches
            .retain(|m| !(m.id == match_id && m.custom_id == custom_id));
        if self.state.matches.len() == before {
            return Ok(false);
        }
        self.state.teams.retain(|t| t.match_id != match_id);
        self.state.players.retain(|p| p.match_id != match_id);
        Ok(true)
    }

    fn set_winner(&mut self, match_id: MatchId, team_name: &str, winner: bool) -> ScoringResult<bool> {
        let mut found = false;
        for row in self
            .state
            .teams
            .iter_mut()
            .filter(|t| t.match_id == match_id && t.result.team_name == team_name)
        {
            row.result.winner = winner;
            found = true;
        }
        Ok(found)
    }
}

impl CustomsStore for MemoryStore {
    fn find_custom(&mut self, id: CustomId) -> ScoringResult<Option<CustomSetting>> {
        Ok(self.state.customs.iter().find(|c| c.id == id).cloned())
    }

    fn find_custom_by_name(&mut self, name: &str) -> ScoringResult<Option<CustomSetting>> {
        Ok(self.state.customs.iter().find(|c| c.name == name).cloned())
    }

    fn list_customs(&mut self) -> ScoringResult<Vec<CustomSetting>> {
        Ok(self.state.customs.clone())
    }

    fn list_matches(&mut self, custom_id: CustomId) -> ScoringResult<Vec<MatchRecord>> {
        Ok(self
            .state
            .matches
            .iter()
            .filter(|m| m.custom_id == custom_id)
            .cloned()
            .collect())
    }

    fn list_team_results(&mut self, custom_id: CustomId) -> ScoringResult<Vec<StoredTeamResult>> {
        let match_ids: Vec<MatchId> = self.list_matches(custom_id)?.iter().map(|m| m.id).collect();
        let mut rows: Vec<StoredTeamResult> = self
            .state
            .teams
            .iter()
            .filter(|t| match_ids.contains(&t.match_id))
            .cloned()
            .collect();
        rows.sort_by_key(|t| (t.match_id, t.result.placement == 0, t.result.placement));
        Ok(rows)
    }

    fn list_player_results(&mut self, custom_id: CustomId) -> ScoringResult<Vec<StoredPlayerResult>> {
        let match_ids: Vec<MatchId> = self.list_matches(custom_id)?.iter().map(|m| m.id).collect();
        Ok(self
            .state
            .players
            .iter()
            .filter(|p| match_ids.contains(&p.match_id))
            .cloned()
            .collect())
    }

    fn in_transaction<T, F>(&mut self, work: F) -> ScoringResult<T>
    where
        F: FnOnce(&mut dyn ResultWriter) -> ScoringResult<T>,
    {
        let mut draft = MemoryWriter {
            state: self.state.clone(),
            fail_team_inserts: self.fail_team_inserts,
        };
        let out = work(&mut draft)?;
        self.state = draft.state;
        Ok(out)
    }
}
