use std::collections::HashMap;

use log::info;

use crate::errors::{ScoringError, ScoringResult};

use super::rule_set::{RuleSet, ScoringMode};
use super::store::CustomsStore;
use super::types::{
    round_point, CustomId, MatchId, MatchResults, MatchTelemetry, PlayerResult, PlayerStats, StoredTeamResult,
    TeamResult,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMatch {
    pub match_id: MatchId,
    pub teams: Vec<TeamResult>,
    pub player_count: usize,
}

/// Turns one match's telemetry into player and team result rows
pub struct MatchIngestor<'r> {
    rules: &'r RuleSet,
}

struct TeamAccumulator {
    team_name: String,
    team_number: u32,
    placement: u32,
    kills: u32,
}

impl<'r> MatchIngestor<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    pub fn player_results(&self, players: &[PlayerStats]) -> Vec<PlayerResult> {
        players.iter().map(|p| self.player_result(p)).collect()
    }

    fn player_result(&self, stats: &PlayerStats) -> PlayerResult {
        PlayerResult {
            player_name: stats.player_name.clone(),
            character: stats.character.clone(),
            team_name: stats.team_name.clone(),
            team_number: stats.team_number,
            team_placement: stats.team_placement,
            kills: stats.kills,
            assists: stats.assists,
            damage_dealt: stats.damage_dealt,
            shots: stats.shots,
            hits: stats.hits,
            knockdowns: stats.knockdowns,
            headshots: stats.headshots,
            revives_given: stats.revives_given,
            respawns_given: stats.respawns_given,
            survival_time: stats.survival_time,
            kill_point: self.rules.kill_points(stats.kills),
        }
    }

    /// Groups players by team name in first-seen order. Team number and
    /// placement come from the first player seen for that name.
    pub fn team_results(&self, players: &[PlayerStats]) -> Vec<TeamResult> {
        group_by_team(players)
            .into_iter()
            .map(|team| self.team_result(team))
            .collect()
    }

    fn team_result(&self, team: TeamAccumulator) -> TeamResult {
        let placement_point = self.rules.placement_point(team.placement);
        let kill_point = self.rules.kill_points(self.rules.capped_kills(team.kills));
        TeamResult {
            team_name: team.team_name,
            team_number: team.team_number,
            placement: team.placement,
            kills: team.kills,
            placement_point,
            kill_point,
            all_point: placement_point + kill_point,
            winner: false,
        }
    }

    /// Full result set for a match. `prior_totals` holds each team's
    /// cumulative points before this match and only matters for Poland rule,
    /// where a team already on match point that wins the match wins the event.
    /// That flag is reported back to the caller but never stored.
    pub fn compute(&self, telemetry: &MatchTelemetry, prior_totals: &HashMap<String, f64>) -> MatchResults {
        let players = self.player_results(&telemetry.players);
        let mut teams = self.team_results(&telemetry.players);

        if self.rules.mode() == ScoringMode::Poland {
            for team in teams.iter_mut().filter(|t| t.placement == 1) {
                let prior = prior_totals.get(&team.team_name).copied().unwrap_or(0.0);
                team.winner = self.rules.is_match_point(round_point(prior));
            }
        }

        MatchResults { players, teams }
    }

    /// Computes and persists one match as a single unit of work: match row,
    /// player rows, team rows and the match counter increment.
    pub fn record<S: CustomsStore>(
        &self,
        store: &mut S,
        custom_id: CustomId,
        telemetry: &MatchTelemetry,
    ) -> ScoringResult<RecordedMatch> {
        let prior_totals = match self.rules.mode() {
            ScoringMode::Poland => cumulative_totals(&store.list_team_results(custom_id)?),
            _ => HashMap::new(),
        };
        let results = self.compute(telemetry, &prior_totals);
        // Derived winners are recomputed on read, storage only keeps manual flags
        let stored_teams: Vec<TeamResult> = results
            .teams
            .iter()
            .map(|team| TeamResult {
                winner: false,
                ..team.clone()
            })
            .collect();

        let match_id = store.in_transaction(|tx| {
            let match_id = tx.insert_match(custom_id, &telemetry.meta)?;
            tx.insert_player_results(match_id, &results.players)?;
            tx.insert_team_results(match_id, &stored_teams)?;
            tx.adjust_match_count(custom_id, 1)?;
            Ok(match_id)
        })?;

        info!(
            "Recorded match {} ({}) for custom {}: {} teams, {} players",
            match_id,
            telemetry.meta.external_id,
            custom_id,
            results.teams.len(),
            results.players.len()
        );

        Ok(RecordedMatch {
            match_id,
            player_count: results.players.len(),
            teams: results.teams,
        })
    }
}

fn group_by_team(players: &[PlayerStats]) -> Vec<TeamAccumulator> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut teams: Vec<TeamAccumulator> = Vec::new();

    for player in players {
        match index.get(player.team_name.as_str()) {
            Some(&idx) => teams[idx].kills = teams[idx].kills.saturating_add(player.kills),
            None => {
                index.insert(player.team_name.as_str(), teams.len());
                teams.push(TeamAccumulator {
                    team_name: player.team_name.clone(),
                    team_number: player.team_number,
                    placement: player.team_placement,
                    kills: player.kills,
                });
            }
        }
    }

    teams
}

/// Deletes a match with all its rows and decrements the counter, atomically
pub fn delete_match<S: CustomsStore>(store: &mut S, custom_id: CustomId, match_id: MatchId) -> ScoringResult<()> {
    store.in_transaction(|tx| {
        if !tx.delete_match(custom_id, match_id)? {
            return Err(ScoringError::not_found(format!("match {} of custom {}", match_id, custom_id)));
        }
        tx.adjust_match_count(custom_id, -1)
    })?;

    info!("Deleted match {} from custom {}", match_id, custom_id);
    Ok(())
}

/// Running all-point total per team over the given rows
pub fn cumulative_totals(rows: &[StoredTeamResult]) -> HashMap<String, f64> {
    let mut totals = HashMap::new();
    for row in rows {
        *totals.entry(row.result.team_name.clone()).or_insert(0.0) += row.result.all_point;
    }
    totals
}
