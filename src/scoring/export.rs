use std::collections::HashMap;

use serde::Serialize;

use super::aggregate::ScoreAggregator;
use super::rule_set::RuleSet;
use super::types::{MatchRecord, PlayerResult, StandingRow, StoredPlayerResult, StoredTeamResult};

/// Rows in every top-N ranking table
pub const TOP_N: usize = 5;
/// Rows in the champion roster table
pub const SQUAD_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Flag(bool),
    Empty,
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Integer(i64::from(value))
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Integer(value as i64)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Flag(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    fn new(title: impl Into<String>, header: &[&str]) -> Self {
        Self {
            title: title.into(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    fn pad_to(&mut self, len: usize) {
        while self.rows.len() < len {
            self.rows.push(vec![Cell::Empty; self.header.len()]);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTables {
    pub standings: Table,
    pub matches: Vec<Table>,
    pub top_kills: Table,
    pub top_damage: Table,
    pub top_characters: Table,
    pub champion_roster: Table,
}

struct PlayerTotals {
    player_name: String,
    team_name: String,
    characters: Vec<String>,
    kills: u32,
    assists: u32,
    damage_dealt: u32,
}

impl PlayerTotals {
    fn add(&mut self, result: &PlayerResult) {
        self.kills = self.kills.saturating_add(result.kills);
        self.assists = self.assists.saturating_add(result.assists);
        self.damage_dealt = self.damage_dealt.saturating_add(result.damage_dealt);
        if !result.character.is_empty() && !self.characters.contains(&result.character) {
            self.characters.push(result.character.clone());
        }
    }
}

/// Flat tables for the spreadsheet writer. Pure data, no formatting.
pub struct ExportProjection<'r> {
    rules: &'r RuleSet,
}

impl<'r> ExportProjection<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    pub fn project(
        &self,
        matches: &[MatchRecord],
        teams: &[StoredTeamResult],
        players: &[StoredPlayerResult],
    ) -> ExportTables {
        let aggregator = ScoreAggregator::new(self.rules);
        let standings = aggregator.aggregate(teams);
        let player_totals = player_totals(players);

        ExportTables {
            standings: standings_table(&standings),
            matches: matches
                .iter()
                .enumerate()
                .map(|(idx, m)| match_table(idx + 1, m, &aggregator.match_standings(teams, m.id)))
                .collect(),
            top_kills: top_players_table("Top kills", "Kills", &player_totals, |p| p.kills),
            top_damage: top_players_table("Top damage", "Damage", &player_totals, |p| p.damage_dealt),
            top_characters: top_characters_table(players),
            champion_roster: champion_table(&standings, &player_totals),
        }
    }
}

fn standings_table(standings: &[StandingRow]) -> Table {
    let mut table = Table::new(
        "Standings",
        &["Rank", "Team", "Matches", "Kills", "Placement points", "Kill points", "Total", "Winner", "Match point"],
    );
    for row in standings {
        table.push(vec![
            row.rank.into(),
            row.team_name.as_str().into(),
            row.matches_played.into(),
            row.kills.into(),
            row.placement_point.into(),
            row.kill_point.into(),
            row.all_point.into(),
            row.winner.into(),
            row.match_point.into(),
        ]);
    }
    table
}

fn match_table(number: usize, record: &MatchRecord, rows: &[StandingRow]) -> Table {
    let mut table = Table::new(
        format!("Match {} - {}", number, record.map_name),
        &["Placement", "Team", "Kills", "Placement points", "Kill points", "Total"],
    );
    for row in rows {
        table.push(vec![
            row.placement.unwrap_or(0).into(),
            row.team_name.as_str().into(),
            row.kills.into(),
            row.placement_point.into(),
            row.kill_point.into(),
            row.all_point.into(),
        ]);
    }
    table
}

/// Players are told apart by (name, team); display names are not unique
fn player_totals(players: &[StoredPlayerResult]) -> Vec<PlayerTotals> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut totals: Vec<PlayerTotals> = Vec::new();

    for stored in players {
        let result = &stored.result;
        let key = (result.player_name.as_str(), result.team_name.as_str());
        let idx = *index.entry(key).or_insert_with(|| {
            totals.push(PlayerTotals {
                player_name: result.player_name.clone(),
                team_name: result.team_name.clone(),
                characters: Vec::new(),
                kills: 0,
                assists: 0,
                damage_dealt: 0,
            });
            totals.len() - 1
        });
        totals[idx].add(result);
    }

    totals
}

fn top_players_table(title: &str, stat: &str, totals: &[PlayerTotals], value: impl Fn(&PlayerTotals) -> u32) -> Table {
    let mut ranked: Vec<&PlayerTotals> = totals.iter().collect();
    ranked.sort_by(|a, b| value(b).cmp(&value(a)));

    let mut table = Table::new(title, &["Rank", "Player", "Team", stat]);
    for (idx, player) in ranked.into_iter().take(TOP_N).enumerate() {
        table.push(vec![
            (idx + 1).into(),
            player.player_name.as_str().into(),
            player.team_name.as_str().into(),
            value(player).into(),
        ]);
    }
    table.pad_to(TOP_N);
    table
}

fn top_characters_table(players: &[StoredPlayerResult]) -> Table {
    let mut picks: Vec<(&str, usize)> = Vec::new();
    for stored in players.iter().filter(|p| !p.result.character.is_empty()) {
        let character = stored.result.character.as_str();
        match picks.iter_mut().find(|(name, _)| *name == character) {
            Some((_, count)) => *count += 1,
            None => picks.push((character, 1)),
        }
    }
    picks.sort_by(|a, b| b.1.cmp(&a.1));

    let mut table = Table::new("Most picked characters", &["Rank", "Character", "Picks"]);
    for (idx, (character, count)) in picks.into_iter().take(TOP_N).enumerate() {
        table.push(vec![(idx + 1).into(), character.into(), count.into()]);
    }
    table.pad_to(TOP_N);
    table
}

/// Roster of the flagged winner, or of the standings leader when nobody is flagged
fn champion_table(standings: &[StandingRow], totals: &[PlayerTotals]) -> Table {
    let champion = standings.iter().find(|s| s.winner).or_else(|| standings.first());

    let title = match champion {
        Some(team) => format!("Champion squad - {}", team.team_name),
        None => "Champion squad".to_string(),
    };
    let mut table = Table::new(title, &["Player", "Characters", "Kills", "Assists", "Damage"]);

    if let Some(team) = champion {
        let mut roster: Vec<&PlayerTotals> = totals.iter().filter(|p| p.team_name == team.team_name).collect();
        roster.sort_by(|a, b| b.kills.cmp(&a.kills));
        for player in roster.into_iter().take(SQUAD_SIZE) {
            table.push(vec![
                player.player_name.as_str().into(),
                player.characters.join("/").into(),
                player.kills.into(),
                player.assists.into(),
                player.damage_dealt.into(),
            ]);
        }
    }

    table.pad_to(SQUAD_SIZE);
    table
}
