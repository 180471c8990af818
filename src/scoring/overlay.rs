use log::warn;
use serde::{Deserialize, Serialize};

use super::types::{StandingRow, Standings, StandingsMode};

/// The broadcast layout has a fixed number of slots
pub const OVERLAY_SLOTS: usize = 20;
/// Slots per column, left column 1-10, right column 11-20
pub const COLUMN_SLOTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedState {
    /// No match recorded yet, rows are the configured default teams
    Placeholder,
    /// Fewer real teams than slots
    Partial,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRow {
    pub position: usize,
    pub team_name: String,
    pub placement_point: i64,
    pub kill_point: i64,
    pub all_point: i64,
    pub winner: bool,
    pub match_point: bool,
}

impl OverlayRow {
    fn empty(position: usize) -> Self {
        Self::named(position, String::new())
    }

    fn named(position: usize, team_name: String) -> Self {
        Self {
            position,
            team_name,
            placement_point: 0,
            kill_point: 0,
            all_point: 0,
            winner: false,
            match_point: false,
        }
    }

    fn from_standing(position: usize, row: &StandingRow) -> Self {
        Self {
            position,
            team_name: row.team_name.clone(),
            placement_point: row.placement_point,
            kill_point: row.kill_point,
            all_point: row.all_point,
            winner: row.winner,
            match_point: row.match_point,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.team_name.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayBoard {
    pub custom_name: String,
    pub mode: StandingsMode,
    pub state: FeedState,
    pub match_count: u32,
    pub rows: Vec<OverlayRow>,
}

impl OverlayBoard {
    /// Always exactly `OVERLAY_SLOTS` rows, whatever the standings hold
    pub fn build(standings: &Standings, default_teams: &[String]) -> Self {
        let (state, mut rows) = if standings.match_count == 0 || standings.rows.is_empty() {
            let rows = default_teams
                .iter()
                .take(OVERLAY_SLOTS)
                .enumerate()
                .map(|(idx, name)| OverlayRow::named(idx + 1, name.clone()))
                .collect::<Vec<_>>();
            (FeedState::Placeholder, rows)
        } else {
            let rows = standings
                .rows
                .iter()
                .take(OVERLAY_SLOTS)
                .enumerate()
                .map(|(idx, row)| OverlayRow::from_standing(idx + 1, row))
                .collect::<Vec<_>>();
            let state = if standings.rows.len() < OVERLAY_SLOTS {
                FeedState::Partial
            } else {
                FeedState::Complete
            };
            (state, rows)
        };

        while rows.len() < OVERLAY_SLOTS {
            rows.push(OverlayRow::empty(rows.len() + 1));
        }

        Self {
            custom_name: standings.custom_name.clone(),
            mode: standings.mode,
            state,
            match_count: standings.match_count,
            rows,
        }
    }

    pub fn left_column(&self) -> &[OverlayRow] {
        &self.rows[..COLUMN_SLOTS.min(self.rows.len())]
    }

    pub fn right_column(&self) -> &[OverlayRow] {
        &self.rows[COLUMN_SLOTS.min(self.rows.len())..]
    }
}

/// Client side of the overlay: keeps showing the last good board while
/// refreshes fail.
#[derive(Debug, Default)]
pub struct OverlayFeed {
    last_good: Option<OverlayBoard>,
    consecutive_failures: u32,
}

impl OverlayFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply<E: std::fmt::Display>(&mut self, fetched: Result<OverlayBoard, E>) -> Option<&OverlayBoard> {
        match fetched {
            Ok(board) => {
                self.consecutive_failures = 0;
                self.last_good = Some(board);
            }
            Err(e) => {
                self.consecutive_failures += 1;
                warn!(
                    "Overlay refresh failed ({} in a row), keeping last board: {}",
                    self.consecutive_failures, e
                );
            }
        }
        self.last_good.as_ref()
    }

    pub fn current(&self) -> Option<&OverlayBoard> {
        self.last_good.as_ref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(rank: usize, name: &str, all_point: i64) -> StandingRow {
        StandingRow {
            rank,
            team_name: name.to_string(),
            team_number: rank as u32,
            placement: None,
            matches_played: 1,
            kills: 0,
            placement_point: all_point,
            kill_point: 0,
            all_point,
            winner: false,
            match_point: false,
        }
    }

    fn standings(match_count: u32, teams: usize) -> Standings {
        Standings {
            custom_id: 1,
            custom_name: "Weekly Cup".to_string(),
            mode: StandingsMode::Aggregate,
            match_id: None,
            match_count,
            rows: (0..teams)
                .map(|i| standing(i + 1, &format!("Team {}", i + 1), 100 - i as i64))
                .collect(),
        }
    }

    #[test]
    fn test_zero_matches_show_default_teams() {
        let defaults = vec!["A".to_string(), "B".to_string()];

        let board = OverlayBoard::build(&standings(0, 0), &defaults);

        assert_eq!(board.state, FeedState::Placeholder);
        assert_eq!(board.rows.len(), OVERLAY_SLOTS);
        assert_eq!(board.rows[0].team_name, "A");
        assert_eq!(board.rows[0].position, 1);
        assert_eq!(board.rows[1].team_name, "B");
        assert!(board.rows[2..].iter().all(|r| r.is_blank() && r.all_point == 0));
        assert!(board.rows.iter().all(|r| r.placement_point == 0 && r.kill_point == 0));
        assert_eq!(board.rows[19].position, 20);
    }

    #[test]
    fn test_always_twenty_rows() {
        for teams in [0, 5, 20, 23] {
            let board = OverlayBoard::build(&standings(3, teams), &[]);
            assert_eq!(board.rows.len(), OVERLAY_SLOTS, "{} teams", teams);
            assert_eq!(board.left_column().len(), COLUMN_SLOTS);
            assert_eq!(board.right_column().len(), COLUMN_SLOTS);
        }
    }

    #[test]
    fn test_partial_data_is_padded_with_blank_rows() {
        let board = OverlayBoard::build(&standings(2, 5), &["ignored".to_string()]);

        assert_eq!(board.state, FeedState::Partial);
        assert_eq!(board.rows[4].team_name, "Team 5");
        assert!(board.rows[5].is_blank());
        assert_eq!(board.right_column()[0].position, 11);
    }

    #[test]
    fn test_full_field_is_complete() {
        let board = OverlayBoard::build(&standings(6, 22), &[]);
        assert_eq!(board.state, FeedState::Complete);
        assert_eq!(board.rows.last().unwrap().team_name, "Team 20");
    }

    #[test]
    fn test_feed_keeps_last_good_board_on_failure() {
        let mut feed = OverlayFeed::new();
        assert!(feed.apply::<String>(Err("offline".to_string())).is_none());

        let board = OverlayBoard::build(&standings(1, 3), &[]);
        feed.apply::<String>(Ok(board.clone()));
        let shown = feed.apply::<String>(Err("timeout".to_string())).cloned();

        assert_eq!(shown, Some(board));
        assert_eq!(feed.consecutive_failures(), 1);

        feed.apply::<String>(Ok(OverlayBoard::build(&standings(2, 4), &[])));
        assert_eq!(feed.consecutive_failures(), 0);
        assert_eq!(feed.current().unwrap().match_count, 2);
    }
}
