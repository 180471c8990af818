use axum::{
    extract::{Query, State},
    response::Response,
};
use std::sync::Arc;

use super::{respond, AppState};
use crate::api::models::StandingsParams;

/// `?name=<custom>&mode=latest|aggregate`
pub async fn get_standings(State(state): State<Arc<AppState>>, Query(params): Query<StandingsParams>) -> Response {
    respond(state.with_service(|s| s.standings(&params.name, params.mode)))
}

/// Fixed 20-row board for the broadcast overlay
pub async fn get_overlay(State(state): State<Arc<AppState>>, Query(params): Query<StandingsParams>) -> Response {
    respond(state.with_service(|s| s.overlay(&params.name, params.mode)))
}
