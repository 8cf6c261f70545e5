//! HTTP endpoints
//!
//! Control surface only: session lifecycle, state polling, history, and
//! the client station-data push. Audio stays in the embedding client.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use voice_dialogue_agent::{HistoryReport, SessionSnapshot};
use voice_dialogue_tools::StationSnapshot;

use crate::metrics::{metrics_handler, record_request, record_turn_latencies};
use crate::session::ManagedSession;
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/:id", delete(delete_session))
        // Per-session control and polling
        .route("/api/session/:id/state", get(get_state))
        .route("/api/session/:id/reset", post(reset_session))
        .route("/api/session/:id/end", post(end_session))
        .route("/api/session/:id/history", get(get_history))
        // Client data push
        .route("/api/station-data", post(push_station_data))
        // Operational
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        // clients are local dev pages, keep CORS open
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn lookup(state: &AppState, id: &str) -> Result<std::sync::Arc<ManagedSession>, ServerError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| ServerError::SessionNotFound(id.to_string()))
}

async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServerError> {
    record_request("create_session");
    let session = state.sessions.create()?;

    // Speak the opening line into the fresh session. There is no audio
    // transport on this surface, so the frames are drained; the client
    // picks the greeting text up from its first state poll.
    let (tx, mut rx) = tokio::sync::mpsc::channel(32);
    let drain = tokio::spawn(async move { while rx.recv().await.is_some() {} });
    session
        .orchestrator
        .greet(&tx)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    drop(tx);
    let _ = drain.await;

    Ok(Json(serde_json::json!({
        "session_id": session.id,
        "created_at": session.created_at,
        "greeting": session.orchestrator.snapshot().last_bot_text,
    })))
}

async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    record_request("list_sessions");
    let sessions = state.sessions.list();
    Json(serde_json::json!({
        "sessions": sessions,
        "count": sessions.len(),
    }))
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    record_request("delete_session");
    if state.sessions.remove(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Poll the session snapshot; the client calls this once per turn
async fn get_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ServerError> {
    record_request("get_state");
    let session = lookup(&state, &id)?;
    session.touch();
    let snapshot = session.orchestrator.snapshot();
    record_turn_latencies(&snapshot.metrics);
    Ok(Json(snapshot))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    record_request("reset_session");
    let session = lookup(&state, &id)?;
    session.touch();
    session.orchestrator.reset();
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct EndRequest {
    reason: Option<String>,
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<EndRequest>>,
) -> Result<StatusCode, ServerError> {
    record_request("end_session");
    let session = lookup(&state, &id)?;
    let reason = body
        .and_then(|Json(req)| req.reason)
        .unwrap_or_else(|| "manual_stop".to_string());
    tracing::info!(session_id = %id, reason = %reason, "End requested over HTTP");
    session.orchestrator.request_end(reason);
    Ok(StatusCode::NO_CONTENT)
}

/// Full history with stats and topic summary, for agent handoff
async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryReport>, ServerError> {
    record_request("get_history");
    let session = lookup(&state, &id)?;
    Ok(Json(session.orchestrator.history_report()))
}

/// Client pushes its station list and location after page load
async fn push_station_data(
    State(state): State<AppState>,
    Json(snapshot): Json<StationSnapshot>,
) -> Json<serde_json::Value> {
    record_request("push_station_data");
    let count = snapshot.stations.len();
    state.stations.update(snapshot);
    Json(serde_json::json!({ "stations": count }))
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.len(),
        "stations_loaded": state.stations.is_loaded(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::EngineSet;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use voice_dialogue_config::prompts::OPENING_MESSAGE;
    use voice_dialogue_config::Settings;

    fn app() -> Router {
        create_router(AppState::new(Settings::default(), EngineSet::dev_stubs()))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["sessions"], 0);
    }

    #[tokio::test]
    async fn session_lifecycle_over_http() {
        let app = app();

        let response = app
            .clone()
            .oneshot(Request::post("/api/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let id = json["session_id"].as_str().unwrap().to_string();
        assert_eq!(json["greeting"], OPENING_MESSAGE);

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/api/session/{id}/state"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["active"], true);
        assert_eq!(json["should_end"], false);
        // the greeting was spoken before the first poll
        assert_eq!(json["last_bot_text"], OPENING_MESSAGE);

        let response = app
            .clone()
            .oneshot(
                Request::post(format!("/api/session/{id}/end"))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"reason": "user_requested"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(
                Request::get(format!("/api/session/{id}/state"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["should_end"], true);
        assert_eq!(json["end_reason"], "user_requested");
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let response = app()
            .oneshot(
                Request::get("/api/session/nope/state")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn station_push_updates_cache() {
        let app = app();
        let body = serde_json::json!({
            "stations": [{
                "id": "ST1",
                "name": "Swap Point - Rohini",
                "lat": 28.7,
                "lng": 77.1,
                "batteries": 3,
                "distance_km": 0.9,
                "eta_minutes": 4.0
            }],
            "user_location": {"lat": 28.7, "lng": 77.1}
        });

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/station-data")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["stations"], 1);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["stations_loaded"], true);
    }
}
