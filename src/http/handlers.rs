use super::state::AppState;
use crate::session::{CaptureSettings, SessionConfig, SettingsUpdate};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartCaptureRequest {
    /// API credential for the transcription endpoint
    pub credential: String,

    /// Spoken language, or "auto" to detect (default)
    pub source_language: Option<String>,

    /// Translation target, or "none" for verbatim transcription (default)
    pub target_language: Option<String>,

    /// Override the configured chunk duration, in seconds
    pub chunk_duration_secs: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StartCaptureResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopCaptureResponse {
    pub status: String,
    pub fragments: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /capture/start
/// Start a capture session. An already-active session is stopped first.
pub async fn start_capture(
    State(state): State<AppState>,
    Json(req): Json<StartCaptureRequest>,
) -> impl IntoResponse {
    if req.credential.trim().is_empty() {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "credential is missing".to_string(),
            }),
        )
            .into_response();
    }

    let config = SessionConfig {
        settings: CaptureSettings {
            credential: req.credential,
            source_language: req.source_language.unwrap_or_else(|| "auto".to_string()),
            target_language: req.target_language.unwrap_or_else(|| "none".to_string()),
        },
        chunk_duration: Duration::from_secs(
            req.chunk_duration_secs
                .unwrap_or(state.capture.chunk_duration_secs),
        ),
        context_window_chars: state.capture.context_window_chars,
        stop_flush_timeout: Duration::from_secs(state.capture.stop_flush_timeout_secs),
        ..SessionConfig::default()
    };
    let session_id = config.session_id.clone();

    info!("Starting capture session: {}", session_id);

    let source = (state.sources)();
    if let Err(e) = state.handle.start(config, source).await {
        error!("Failed to start capture: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to start capture: {}", e),
            }),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(StartCaptureResponse {
            session_id: session_id.clone(),
            status: "capturing".to_string(),
            message: format!("Capture started for session {}", session_id),
        }),
    )
        .into_response()
}

/// POST /capture/stop
/// Stop the active capture session (no-op when idle).
pub async fn stop_capture(State(state): State<AppState>) -> impl IntoResponse {
    info!("Stopping capture");

    state.handle.stop().await;
    let fragments = state.handle.transcript().await.len();

    (
        StatusCode::OK,
        Json(StopCaptureResponse {
            status: "stopped".to_string(),
            fragments,
        }),
    )
}

/// POST /capture/reconfigure
/// Update the active session's settings in place; effective on the next chunk.
pub async fn reconfigure_capture(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> impl IntoResponse {
    if state.handle.reconfigure(update).await {
        (StatusCode::OK, Json(serde_json::json!({ "status": "updated" }))).into_response()
    } else {
        (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "No active capture session".to_string(),
            }),
        )
            .into_response()
    }
}

/// GET /capture/status
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.handle.status().await)
}

/// GET /capture/transcript
/// Ordered transcript of the active (or most recently finished) session.
pub async fn get_transcript(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.handle.transcript().await)
}

/// GET /capture/transcript/export
/// Plain-text export of the transcript.
pub async fn export_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let segments = state.handle.transcript().await;

    let mut body = format!(
        "Live Transcript (exported {})\n\n",
        chrono::Utc::now().to_rfc3339()
    );
    for segment in &segments {
        body.push_str(&segment.text);
        body.push('\n');
    }

    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body)
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
