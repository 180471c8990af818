use std::collections::{BTreeMap, HashMap, HashSet};

use super::ingest::cumulative_totals;
use super::rule_set::{RuleSet, ScoringMode};
use super::types::{round_point, MatchId, StandingRow, StoredTeamResult, TeamResult};

/// Builds standings from stored team rows. Nothing is cached, every call
/// recomputes from the rows it is given.
///
/// Stored `winner` flags are the manual ones. Poland rule winners are derived
/// here from running totals in match order, so removing a match also removes
/// any win it made possible later on.
pub struct ScoreAggregator<'r> {
    rules: &'r RuleSet,
}

struct TeamTotals {
    team_name: String,
    team_number: u32,
    matches_played: usize,
    kills: u32,
    placement_point: f64,
    kill_point: f64,
    all_point: f64,
    winner: bool,
}

impl TeamTotals {
    fn new(result: &TeamResult) -> Self {
        Self {
            team_name: result.team_name.clone(),
            team_number: result.team_number,
            matches_played: 0,
            kills: 0,
            placement_point: 0.0,
            kill_point: 0.0,
            all_point: 0.0,
            winner: false,
        }
    }

    fn add(&mut self, result: &TeamResult, derived_winner: bool) {
        self.matches_played += 1;
        self.kills = self.kills.saturating_add(result.kills);
        self.placement_point += result.placement_point;
        self.kill_point += result.kill_point;
        self.all_point += result.all_point;
        self.winner |= result.winner || derived_winner;
    }
}

impl<'r> ScoreAggregator<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Cumulative standings over every match, highest total first.
    /// Equal totals keep the order in which the teams first appear.
    pub fn aggregate(&self, rows: &[StoredTeamResult]) -> Vec<StandingRow> {
        let winners = self.derived_winners(rows);
        let mut totals = group_totals(rows, &winners);
        totals.sort_by(|a, b| b.all_point.total_cmp(&a.all_point));

        totals
            .into_iter()
            .enumerate()
            .map(|(idx, team)| {
                let all_point = round_point(team.all_point);
                StandingRow {
                    rank: idx + 1,
                    team_name: team.team_name,
                    team_number: team.team_number,
                    placement: None,
                    matches_played: team.matches_played,
                    kills: team.kills,
                    placement_point: round_point(team.placement_point),
                    kill_point: round_point(team.kill_point),
                    all_point,
                    winner: team.winner,
                    match_point: self.rules.is_match_point(all_point),
                }
            })
            .collect()
    }

    /// One match's rows in recorded placement order, unplaced teams last
    pub fn match_standings(&self, rows: &[StoredTeamResult], match_id: MatchId) -> Vec<StandingRow> {
        let running = match self.rules.mode() {
            ScoringMode::Poland => {
                let through: Vec<StoredTeamResult> = rows.iter().filter(|r| r.match_id <= match_id).cloned().collect();
                cumulative_totals(&through)
            }
            _ => HashMap::new(),
        };

        let winners = self.derived_winners(rows);
        let mut in_match: Vec<&TeamResult> = rows
            .iter()
            .filter(|r| r.match_id == match_id)
            .map(|r| &r.result)
            .collect();
        in_match.sort_by_key(|r| (r.placement == 0, r.placement));

        in_match
            .into_iter()
            .enumerate()
            .map(|(idx, result)| {
                let running_total = running.get(&result.team_name).copied().unwrap_or(0.0);
                StandingRow {
                    rank: idx + 1,
                    team_name: result.team_name.clone(),
                    team_number: result.team_number,
                    placement: Some(result.placement),
                    matches_played: 1,
                    kills: result.kills,
                    placement_point: round_point(result.placement_point),
                    kill_point: round_point(result.kill_point),
                    all_point: round_point(result.all_point),
                    winner: result.winner || winners.contains(&(match_id, result.team_name.as_str())),
                    match_point: self.rules.is_match_point(round_point(running_total)),
                }
            })
            .collect()
    }

    /// (match, team) pairs that won the event under Poland rule: first place
    /// while already on match point before that match
    fn derived_winners<'a>(&self, rows: &'a [StoredTeamResult]) -> HashSet<(MatchId, &'a str)> {
        let mut winners = HashSet::new();
        if self.rules.mode() != ScoringMode::Poland {
            return winners;
        }

        let mut by_match: BTreeMap<MatchId, Vec<&'a TeamResult>> = BTreeMap::new();
        for row in rows {
            by_match.entry(row.match_id).or_default().push(&row.result);
        }

        let mut running: HashMap<&'a str, f64> = HashMap::new();
        for (match_id, results) in by_match {
            for &result in results.iter().filter(|r| r.placement == 1) {
                let prior = running.get(result.team_name.as_str()).copied().unwrap_or(0.0);
                if self.rules.is_match_point(round_point(prior)) {
                    winners.insert((match_id, result.team_name.as_str()));
                }
            }
            for result in results {
                *running.entry(result.team_name.as_str()).or_insert(0.0) += result.all_point;
            }
        }

        winners
    }
}

fn group_totals(rows: &[StoredTeamResult], winners: &HashSet<(MatchId, &str)>) -> Vec<TeamTotals> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<TeamTotals> = Vec::new();

    for row in rows {
        let idx = *index.entry(row.result.team_name.as_str()).or_insert_with(|| {
            totals.push(TeamTotals::new(&row.result));
            totals.len() - 1
        });
        let derived = winners.contains(&(row.match_id, row.result.team_name.as_str()));
        totals[idx].add(&row.result, derived);
    }

    totals
}
