use anyhow::Result;
use base64::Engine;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{filter, prompt, Transcriber, Transcription, TranscriptionContext};
use crate::audio::AudioChunk;
use crate::error::SessionError;

/// Configuration for the hosted transcription endpoint.
#[derive(Debug, Clone)]
pub struct RemoteTranscriberConfig {
    /// Base URL of the generative endpoint
    pub base_url: String,
    /// Model name, e.g. "gemini-1.5-flash"
    pub model: String,
    /// Chunks with a smaller PCM payload are classified as silence
    /// without a remote call
    pub silence_threshold_bytes: usize,
    /// Results shorter than this are treated as no-speech
    pub min_fragment_chars: usize,
}

impl Default for RemoteTranscriberConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            silence_threshold_bytes: 16 * 1024,
            min_fragment_chars: 2,
        }
    }
}

/// Transcription client for a Gemini-style `generateContent` endpoint.
///
/// One HTTPS POST per chunk: a text instruction part plus the audio bytes
/// base64-encoded as inline data, with the credential as a query parameter.
pub struct RemoteTranscriber {
    config: RemoteTranscriberConfig,
    http: reqwest::Client,
}

impl RemoteTranscriber {
    pub fn new(config: RemoteTranscriberConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait::async_trait]
impl Transcriber for RemoteTranscriber {
    async fn transcribe(
        &self,
        chunk: &AudioChunk,
        ctx: &TranscriptionContext,
    ) -> Result<Transcription, SessionError> {
        if filter::is_silence(chunk, self.config.silence_threshold_bytes) {
            debug!(
                "Chunk {} below silence threshold ({} bytes), skipping remote call",
                chunk.index,
                chunk.pcm_byte_len()
            );
            return Ok(Transcription::Silence);
        }

        let wav_bytes = chunk.to_wav_bytes().map_err(|e| {
            SessionError::MalformedResponse(format!("failed to encode audio chunk: {:#}", e))
        })?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(prompt::build_prompt(ctx)),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: "audio/wav".to_string(),
                            data: base64::engine::general_purpose::STANDARD.encode(&wav_bytes),
                        }),
                    },
                ],
            }],
        };

        debug!(
            "Submitting chunk {} ({} bytes WAV) to {}",
            chunk.index,
            wav_bytes.len(),
            self.config.model
        );

        let response = self
            .http
            .post(self.request_url())
            .query(&[("key", ctx.credential.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| SessionError::TransientNetwork(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SessionError::MalformedResponse(e.to_string()))?;

        let raw_text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        if raw_text.trim().is_empty() {
            debug!("Chunk {}: model returned no text", chunk.index);
            return Ok(Transcription::NoSpeechDetected);
        }

        match filter::screen_result(&raw_text, self.config.min_fragment_chars) {
            Some(text) => Ok(Transcription::Speech(text)),
            None => {
                debug!(
                    "Chunk {}: result rejected by hallucination filter: {:?}",
                    chunk.index, raw_text
                );
                Ok(Transcription::NoSpeechDetected)
            }
        }
    }
}

/// Map a non-2xx response to the error taxonomy. The body is parsed for
/// an embedded human-readable message when present.
fn classify_failure(status: StatusCode, body: &str) -> SessionError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|e| e.message)
        .unwrap_or_else(|| format!("HTTP {}", status));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SessionError::InvalidCredential(message)
        }
        StatusCode::BAD_REQUEST => {
            if message.to_lowercase().contains("api key") {
                SessionError::InvalidCredential(message)
            } else {
                SessionError::MalformedResponse(message)
            }
        }
        StatusCode::NOT_FOUND => SessionError::EndpointNotFound(message),
        StatusCode::TOO_MANY_REQUESTS => SessionError::RateLimited(message),
        _ => {
            warn!("Unexpected endpoint status {}: {}", status, message);
            SessionError::TransientNetwork(message)
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}
