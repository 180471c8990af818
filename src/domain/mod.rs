pub mod models;

pub use models::{parse_match, select_match, MatchResponse, PlayerResultResponse, StatsResponse};
