use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::{respond, AppState};
use crate::api::auth::require_admin;
use crate::api::models::CustomResponse;
use crate::scoring::CustomUpdate;
use crate::services::scoring::CustomDraft;

pub async fn list_customs(State(state): State<Arc<AppState>>) -> Response {
    respond(state.with_service(|s| {
        let customs = s.list_customs()?;
        Ok(customs.into_iter().map(CustomResponse::from).collect::<Vec<_>>())
    }))
}

pub async fn get_custom(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    respond(state.with_service(|s| s.get_custom(id).map(CustomResponse::from)))
}

pub async fn create_custom(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(draft): Json<CustomDraft>,
) -> Response {
    if let Err(denied) = require_admin(&headers) {
        return denied;
    }

    match state.with_service(|s| s.create_custom(draft)) {
        Ok(custom) => (StatusCode::CREATED, Json(CustomResponse::from(custom))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_custom(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(update): Json<CustomUpdate>,
) -> Response {
    if let Err(denied) = require_admin(&headers) {
        return denied;
    }

    respond(state.with_service(|s| s.update_custom(id, &update).map(CustomResponse::from)))
}

pub async fn delete_custom(State(state): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(denied) = require_admin(&headers) {
        return denied;
    }

    match state.with_service(|s| s.delete_custom(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
