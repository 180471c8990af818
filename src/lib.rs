pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod http;
pub mod rate_limiter;
pub mod scoring;
pub mod services;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use colored::Colorize;
use log::info;
use std::path::Path;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::database::{DbPool, SqliteStore};
use crate::scoring::{Standings, StandingsMode};
use crate::services::ingestion::IngestionService;
use crate::services::scoring::ScoringService;
use crate::services::server::ServerService;
use crate::services::watch::WatchService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_init(reset: bool) -> Result<()> {
    let config = AppConfig::from_env();
    let pool = database::create_pool(&config.database.path)?;
    let conn = database::get_connection(&pool)?;

    if reset {
        database::reset_database(&conn)?;
    } else {
        database::init_database(&conn)?;
    }
    info!("Database ready at {}", config.database.path);
    Ok(())
}

pub fn handle_record(custom: i64, file: &Path, match_id: Option<&str>) -> Result<()> {
    let config = AppConfig::from_env();
    let text = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let raw = serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON in {}", file.display()))?;

    let pool = open_database(&config)?;
    let mut conn = database::get_connection(&pool)?;
    let mut service = ScoringService::new(SqliteStore::new(&mut conn), config.scoring.clone());
    let recorded = service.record_match(custom, None, raw, match_id)?;

    println!("Recorded match {} ({} players)", recorded.match_id, recorded.player_count);
    Ok(())
}

pub fn handle_ingest(custom: i64, match_id: &str) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env();
        let pool = open_database(&config)?;
        let mut service = IngestionService::new(pool, config)?;
        let recorded = service.run(custom, match_id).await?;
        println!("Recorded match {} ({} players)", recorded.match_id, recorded.player_count);
        Ok(())
    })
}

pub fn handle_standings(name: &str, latest: bool) -> Result<()> {
    let config = AppConfig::from_env();
    let pool = open_database(&config)?;
    let mut conn = database::get_connection(&pool)?;
    let mut service = ScoringService::new(SqliteStore::new(&mut conn), config.scoring.clone());

    let standings = service.standings(name, mode_of(latest))?;
    println!("{}", format_standings(&standings).join("\n"));
    Ok(())
}

pub fn handle_export(custom: i64) -> Result<()> {
    let config = AppConfig::from_env();
    let pool = open_database(&config)?;
    let mut conn = database::get_connection(&pool)?;
    let mut service = ScoringService::new(SqliteStore::new(&mut conn), config.scoring.clone());

    let tables = service.export(custom)?;
    println!("{}", serde_json::to_string_pretty(&tables)?);
    Ok(())
}

pub fn handle_watch(url: &str, name: &str, latest: bool, max_polls: Option<u32>) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env();
        let mut service = WatchService::new(url, name, mode_of(latest), &config.overlay, max_polls)?;
        service.run().await
    })
}

// --- Helper Methods ---

fn open_database(config: &AppConfig) -> Result<DbPool> {
    let pool = database::create_pool(&config.database.path)?;
    let conn = database::get_connection(&pool)?;
    database::init_database(&conn)?;
    Ok(pool)
}

fn mode_of(latest: bool) -> StandingsMode {
    if latest {
        StandingsMode::Latest
    } else {
        StandingsMode::Aggregate
    }
}

fn format_standings(standings: &Standings) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({} matches)",
        standings.custom_name.bold(),
        standings.match_count
    )];

    if standings.rows.is_empty() {
        lines.push("No results yet".dimmed().to_string());
        return lines;
    }

    lines.push(format!("{:>4}  {:<24} {:>5} {:>5} {:>5} {:>5}", "#", "Team", "Kills", "PP", "KP", "Total"));
    for row in &standings.rows {
        let line = format!(
            "{:>4}  {:<24} {:>5} {:>5} {:>5} {:>5}",
            row.rank, row.team_name, row.kills, row.placement_point, row.kill_point, row.all_point
        );
        let line = if row.winner {
            line.yellow().bold().to_string()
        } else if row.match_point {
            line.red().to_string()
        } else {
            line
        };
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::StandingRow;

    fn standings(rows: Vec<StandingRow>) -> Standings {
        Standings {
            custom_id: 1,
            custom_name: "Weekly Cup".to_string(),
            mode: StandingsMode::Aggregate,
            match_id: None,
            match_count: rows.len() as u32,
            rows,
        }
    }

    #[test]
    fn test_format_empty_standings() {
        let lines = format_standings(&standings(Vec::new()));

        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("No results yet"));
    }

    #[test]
    fn test_format_standings_rows() {
        let row = StandingRow {
            rank: 1,
            team_name: "Alliance".to_string(),
            team_number: 3,
            placement: None,
            matches_played: 1,
            kills: 5,
            placement_point: 12,
            kill_point: 5,
            all_point: 17,
            winner: false,
            match_point: false,
        };

        let lines = format_standings(&standings(vec![row]));

        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains("Alliance"));
        assert!(lines[2].trim_end().ends_with("17"));
    }
}
