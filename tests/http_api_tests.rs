// Integration tests for the HTTP control API
//
// A real server is bound on an ephemeral port and exercised with an
// HTTP client, with a no-speech transcriber behind the controller.

use std::sync::Arc;
use tabscribe::audio::{AudioChunk, ChunkSource, StreamChunkSource};
use tabscribe::config::CaptureConfig;
use tabscribe::error::SessionError;
use tabscribe::http::{create_router, AppState, SourceFactory};
use tabscribe::session::SessionController;
use tabscribe::transcribe::{Transcriber, Transcription, TranscriptionContext};
use tokio::sync::mpsc;

struct NoSpeechTranscriber;

#[async_trait::async_trait]
impl Transcriber for NoSpeechTranscriber {
    async fn transcribe(
        &self,
        _chunk: &AudioChunk,
        _ctx: &TranscriptionContext,
    ) -> Result<Transcription, SessionError> {
        Ok(Transcription::NoSpeechDetected)
    }
}

/// Bind the full router on an ephemeral port and return its base URL.
async fn spawn_server() -> String {
    let (handle, _events) = SessionController::spawn(Arc::new(NoSpeechTranscriber), None);

    let sources: SourceFactory = Arc::new(|| {
        // A live but silent capture target: the sender half is kept
        // alive for the test process lifetime so the stream never ends.
        let (frames_tx, frames_rx) = mpsc::channel(8);
        std::mem::forget(frames_tx);
        Box::new(StreamChunkSource::new("test-tab", frames_rx)) as Box<dyn ChunkSource>
    });

    let state = AppState::new(handle, sources, CaptureConfig::default());
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port should bind");
    let addr = listener.local_addr().expect("bound socket has an address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_health_endpoint_responds_ok() {
    let base = spawn_server().await;

    let resp = reqwest::get(format!("{}/health", base))
        .await
        .expect("health request should succeed");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn test_start_without_credential_is_a_conflict() {
    let base = spawn_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{}/capture/start", base))
        .json(&serde_json::json!({ "credential": "" }))
        .send()
        .await
        .expect("start request should succeed");

    assert_eq!(resp.status(), reqwest::StatusCode::CONFLICT);

    let body: serde_json::Value = resp.json().await.expect("error body is JSON");
    assert!(body["error"]
        .as_str()
        .expect("error field is a string")
        .contains("credential"));
}

#[tokio::test]
async fn test_start_status_stop_roundtrip() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/capture/start", base))
        .json(&serde_json::json!({ "credential": "test-key" }))
        .send()
        .await
        .expect("start request should succeed");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let status: serde_json::Value = client
        .get(format!("{}/capture/status", base))
        .send()
        .await
        .expect("status request should succeed")
        .json()
        .await
        .expect("status body is JSON");
    assert_eq!(status["state"], "active");

    let resp = client
        .post(format!("{}/capture/stop", base))
        .send()
        .await
        .expect("stop request should succeed");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let status: serde_json::Value = client
        .get(format!("{}/capture/status", base))
        .send()
        .await
        .expect("status request should succeed")
        .json()
        .await
        .expect("status body is JSON");
    assert_eq!(status["state"], "idle");
}

#[tokio::test]
async fn test_reconfigure_while_idle_is_a_conflict() {
    let base = spawn_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{}/capture/reconfigure", base))
        .json(&serde_json::json!({ "target_language": "French" }))
        .send()
        .await
        .expect("reconfigure request should succeed");

    assert_eq!(resp.status(), reqwest::StatusCode::CONFLICT);
}
