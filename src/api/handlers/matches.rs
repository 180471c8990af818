use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::{respond, AppState};
use crate::api::auth::require_admin;
use crate::api::models::{IngestRequest, RecordMatchRequest, RecordedMatchResponse, WinnerRequest};
use crate::services::ingestion::IngestionService;

pub async fn list_matches(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    respond(state.with_service(|s| s.list_matches(id)))
}

pub async fn record_match(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(request): Json<RecordMatchRequest>,
) -> Response {
    if let Err(denied) = require_admin(&headers) {
        return denied;
    }

    let recorded = state.with_service(|s| {
        s.record_match(id, request.kill_point_rate, request.telemetry, request.match_id.as_deref())
    });
    match recorded {
        Ok(recorded) => (StatusCode::CREATED, Json(RecordedMatchResponse::from(recorded))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Fetch a match from the stats API and record it
pub async fn ingest_match(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(request): Json<IngestRequest>,
) -> Response {
    if let Err(denied) = require_admin(&headers) {
        return denied;
    }

    let mut service = match IngestionService::new(state.pool.clone(), state.config.clone()) {
        Ok(service) => service,
        Err(e) => return e.into_response(),
    };

    match service.run(id, &request.match_id).await {
        Ok(recorded) => (StatusCode::CREATED, Json(RecordedMatchResponse::from(recorded))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_match(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, match_id)): Path<(i64, i64)>,
) -> Response {
    if let Err(denied) = require_admin(&headers) {
        return denied;
    }

    match state.with_service(|s| s.delete_match(id, match_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn set_winner(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, match_id)): Path<(i64, i64)>,
    Json(request): Json<WinnerRequest>,
) -> Response {
    if let Err(denied) = require_admin(&headers) {
        return denied;
    }

    match state.with_service(|s| s.set_winner(id, match_id, &request.team_name, request.winner)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn match_standings(
    State(state): State<Arc<AppState>>,
    Path((id, match_id)): Path<(i64, i64)>,
) -> Response {
    respond(state.with_service(|s| s.match_standings(id, match_id)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::api::handlers::test_support::{call, test_router, Caller};

    fn telemetry(mid: &str, teams: &[(&str, u32, u32)]) -> Value {
        let players: Vec<Value> = teams
            .iter()
            .map(|(team, placement, kills)| {
                json!({
                    "playerName": format!("{}-igl", team),
                    "characterName": "gibraltar",
                    "teamName": team,
                    "teamNum": placement + 1,
                    "teamPlacement": placement,
                    "kills": kills
                })
            })
            .collect();
        json!({ "mid": mid, "map_name": "mp_rr_divided_moon", "player_results": players })
    }

    async fn create_custom(router: &axum::Router, body: Value) -> String {
        let (status, json) = call(router, "POST", "/api/customs", Caller::Admin, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        format!("/api/customs/{}", json["id"])
    }

    #[tokio::test]
    async fn test_record_returns_rounded_team_points() {
        let router = test_router();
        let custom = create_custom(&router, json!({ "name": "Cup", "killPointRate": 1.5 })).await;

        let (status, json) = call(
            &router,
            "POST",
            &format!("{}/matches", custom),
            Caller::Admin,
            Some(json!({ "telemetry": telemetry("m1", &[("Alpha", 1, 3), ("Bravo", 2, 1)]) })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["teams"][0]["teamName"], "Alpha");
        assert_eq!(json["teams"][0]["allPoint"], 12 + 5);
        assert_eq!(json["teams"][1]["killPoint"], 2);
        assert_eq!(json["playerCount"], 2);
    }

    #[tokio::test]
    async fn test_record_rejects_bad_input() {
        let router = test_router();
        let custom = create_custom(&router, json!({ "name": "Cup" })).await;
        let uri = format!("{}/matches", custom);

        let (status, _) = call(&router, "POST", &uri, Caller::Staff, Some(json!({ "telemetry": {} }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let empty = json!({ "telemetry": { "mid": "m1", "player_results": [] } });
        let (status, json) = call(&router, "POST", &uri, Caller::Admin, Some(empty)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "validation");

        let stacked = telemetry("m1", &[("Alpha", 1, 4_000_000_000), ("Alpha", 1, 4_000_000_000)]);
        let (status, json) = call(&router, "POST", &uri, Caller::Admin, Some(json!({ "telemetry": stacked }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "validation");

        let wrong_rate = json!({ "killPointRate": 3.0, "telemetry": telemetry("m1", &[("Alpha", 1, 0)]) });
        let (status, _) = call(&router, "POST", &uri, Caller::Admin, Some(wrong_rate)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = call(
            &router,
            "POST",
            "/api/customs/999/matches",
            Caller::Admin,
            Some(json!({ "telemetry": telemetry("m1", &[("Alpha", 1, 0)]) })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_match_and_list() {
        let router = test_router();
        let custom = create_custom(&router, json!({ "name": "Cup" })).await;
        let uri = format!("{}/matches", custom);
        let (_, recorded) = call(
            &router,
            "POST",
            &uri,
            Caller::Admin,
            Some(json!({ "telemetry": telemetry("m1", &[("Alpha", 1, 2)]) })),
        )
        .await;
        let match_uri = format!("{}/{}", uri, recorded["matchId"]);

        let (status, json) = call(&router, "GET", &uri, Caller::Anonymous, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["externalId"], "m1");

        let (status, _) = call(&router, "DELETE", &match_uri, Caller::Admin, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&router, "DELETE", &match_uri, Caller::Admin, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, json) = call(&router, "GET", &custom, Caller::Anonymous, None).await;
        assert_eq!(json["matchCount"], 0);
    }

    #[tokio::test]
    async fn test_winner_flag_shows_in_match_standings() {
        let router = test_router();
        let custom = create_custom(&router, json!({ "name": "Cup" })).await;
        let (_, recorded) = call(
            &router,
            "POST",
            &format!("{}/matches", custom),
            Caller::Admin,
            Some(json!({ "telemetry": telemetry("m1", &[("Alpha", 1, 2), ("Bravo", 2, 0)]) })),
        )
        .await;
        let match_uri = format!("{}/matches/{}", custom, recorded["matchId"]);

        let (status, _) = call(
            &router,
            "PUT",
            &format!("{}/winner", match_uri),
            Caller::Admin,
            Some(json!({ "teamName": "Alpha", "winner": true })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, json) = call(&router, "GET", &format!("{}/standings", match_uri), Caller::Anonymous, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rows"][0]["teamName"], "Alpha");
        assert_eq!(json["rows"][0]["winner"], true);
        assert_eq!(json["rows"][1]["placement"], 2);
    }

    #[tokio::test]
    async fn test_ingest_without_token_is_configuration_error() {
        let router = test_router();
        let custom = create_custom(&router, json!({ "name": "Cup" })).await;

        let (status, json) = call(
            &router,
            "POST",
            &format!("{}/ingest", custom),
            Caller::Admin,
            Some(json!({ "matchId": "m1" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["kind"], "configuration");
    }
}
