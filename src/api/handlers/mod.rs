use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::{error, warn};

use crate::api::models::ErrorResponse;
use crate::config::AppConfig;
use crate::database::{self, DbPool, SqliteStore};
use crate::errors::{ScoringError, ScoringResult};
use crate::services::scoring::ScoringService;

pub mod customs;
pub mod export;
pub mod matches;
pub mod standings;

pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
}

impl AppState {
    /// Run `work` against a scoring service over a pooled connection
    pub fn with_service<T, F>(&self, work: F) -> ScoringResult<T>
    where
        F: FnOnce(&mut ScoringService<SqliteStore<'_>>) -> ScoringResult<T>,
    {
        let mut conn = database::get_connection(&self.pool).map_err(ScoringError::Storage)?;
        let mut service = ScoringService::new(SqliteStore::new(&mut conn), self.config.scoring.clone());
        work(&mut service)
    }
}

impl IntoResponse for ScoringError {
    fn into_response(self) -> Response {
        let status = match &self {
            ScoringError::Configuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ScoringError::Validation(_) => StatusCode::BAD_REQUEST,
            ScoringError::NotFound(_) => StatusCode::NOT_FOUND,
            ScoringError::Storage(e) => {
                error!("Storage failure: {:?}", e);
                StatusCode::SERVICE_UNAVAILABLE
            }
            ScoringError::Upstream(e) => {
                warn!("Stats API failure: {:?}", e);
                StatusCode::BAD_GATEWAY
            }
        };

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

/// 200 with the JSON body, or the error's status
pub fn respond<T: serde::Serialize>(result: ScoringResult<T>) -> Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => e.into_response(),
    }
}
