use anyhow::Result;
use colored::Colorize;
use log::info;

use crate::config::OverlaySettings;
use crate::http::RateLimitedClient;
use crate::scoring::overlay::{OverlayRow, COLUMN_SLOTS};
use crate::scoring::{OverlayBoard, OverlayFeed, StandingsMode};

const NAME_WIDTH: usize = 22;

/// Terminal stand-in for the broadcast overlay: polls the overlay endpoint
/// and keeps the last good board on screen when a refresh fails.
pub struct WatchService {
    client: RateLimitedClient,
    url: String,
    feed: OverlayFeed,
    max_polls: Option<u32>,
}

impl WatchService {
    pub fn new(
        server_url: &str,
        name: &str,
        mode: StandingsMode,
        settings: &OverlaySettings,
        max_polls: Option<u32>,
    ) -> Result<Self> {
        // The limiter doubles as the poll clock
        let client = RateLimitedClient::new(&settings.user_agent, settings.timeout_secs, settings.refresh_ms)?;

        Ok(Self {
            client,
            url: overlay_url(server_url, name, mode),
            feed: OverlayFeed::new(),
            max_polls,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("Watching {}", self.url);
        let mut polls = 0u32;

        loop {
            let fetched = self.client.get_json::<OverlayBoard>(&self.url).await;
            if let Some(board) = self.feed.apply(fetched) {
                println!("{}", render_board(board).join("\n"));
            }

            polls += 1;
            if self.max_polls.is_some_and(|max| polls >= max) {
                break;
            }
        }

        Ok(())
    }

    pub fn feed(&self) -> &OverlayFeed {
        &self.feed
    }
}

pub fn overlay_url(server_url: &str, name: &str, mode: StandingsMode) -> String {
    let mode = match mode {
        StandingsMode::Latest => "latest",
        StandingsMode::Aggregate => "aggregate",
    };
    format!(
        "{}/api/overlay?name={}&mode={}",
        server_url.trim_end_matches('/'),
        urlencoding::encode(name),
        mode
    )
}

/// Header line plus one line per slot pair, left column 1-10, right 11-20
pub fn render_board(board: &OverlayBoard) -> Vec<String> {
    let mut lines = vec![format!(
        "{} | {:?} | {} matches",
        board.custom_name.bold(),
        board.mode,
        board.match_count
    )];

    let left = board.left_column();
    let right = board.right_column();
    for idx in 0..COLUMN_SLOTS {
        let cell = |rows: &[OverlayRow]| rows.get(idx).map(render_row).unwrap_or_default();
        lines.push(format!("{}    {}", cell(left), cell(right)));
    }

    lines
}

fn render_row(row: &OverlayRow) -> String {
    let marker = if row.winner {
        "W"
    } else if row.match_point {
        "MP"
    } else {
        ""
    };
    let name: String = row.team_name.chars().take(NAME_WIDTH).collect();
    let plain = format!("{:>2}. {:<width$} {:>4} {:<2}", row.position, name, row.all_point, marker, width = NAME_WIDTH);

    if row.is_blank() {
        plain.dimmed().to_string()
    } else if row.winner {
        plain.yellow().bold().to_string()
    } else if row.match_point {
        plain.red().to_string()
    } else {
        plain
    }
}
