use axum::{
    extract::{Path, State},
    response::Response,
};
use std::sync::Arc;

use super::{respond, AppState};

/// Flat tables for the spreadsheet writer
pub async fn get_export(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    respond(state.with_service(|s| s.export(id)))
}
