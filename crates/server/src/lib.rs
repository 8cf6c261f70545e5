//! Voice Dialogue Server
//!
//! HTTP control surface over the dialogue orchestrator: session lifecycle,
//! state polling, history for agent handoff, and the client station-data
//! push. Audio capture and playback live in the embedding client; this
//! crate only manages sessions and exposes their state.

pub mod engines;
pub mod http;
pub mod metrics;
pub mod session;
pub mod state;

pub use engines::{EchoRecognizer, ScriptedReasoner, SilenceSynthesizer};
pub use http::create_router;
pub use metrics::{
    init_metrics, record_error, record_request, record_turn_latencies,
};
pub use session::{EngineSet, ManagedSession, SessionManager};
pub use state::AppState;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session limit reached ({0})")]
    SessionLimit(usize),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            ServerError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::SessionLimit(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        record_error(match &self {
            ServerError::SessionNotFound(_) => "session_not_found",
            ServerError::SessionLimit(_) => "session_limit",
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::Internal(_) => "internal",
        });
        let body = axum::Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
