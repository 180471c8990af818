use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{customs, export, matches, standings, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/customs", get(customs::list_customs).post(customs::create_custom))
        .route(
            "/api/customs/:id",
            get(customs::get_custom).put(customs::update_custom).delete(customs::delete_custom),
        )
        .route("/api/customs/:id/matches", get(matches::list_matches).post(matches::record_match))
        .route("/api/customs/:id/ingest", post(matches::ingest_match))
        .route("/api/customs/:id/matches/:match_id", delete(matches::delete_match))
        .route("/api/customs/:id/matches/:match_id/winner", put(matches::set_winner))
        .route("/api/customs/:id/matches/:match_id/standings", get(matches::match_standings))
        .route("/api/customs/:id/export", get(export::get_export))
        .route("/api/standings", get(standings::get_standings))
        .route("/api/overlay", get(standings::get_overlay))
        .with_state(state)
}
