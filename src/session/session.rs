use chrono::{DateTime, Utc};

use super::config::SessionConfig;
use super::stats::{SessionState, SessionStatus, TranscriptSegment};
use crate::transcribe::TranscriptionContext;

/// State of one active capture session, owned exclusively by the
/// controller task. The transcription client only ever sees copies.
pub struct CaptureSession {
    pub config: SessionConfig,
    pub state: SessionState,
    started_at: DateTime<Utc>,
    /// Bounded trailing window of delivered speech, fed back into prompts
    rolling_context: String,
    chunks_processed: usize,
    segments: Vec<TranscriptSegment>,
}

impl CaptureSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Starting,
            started_at: Utc::now(),
            rolling_context: String::new(),
            chunks_processed: 0,
            segments: Vec::new(),
        }
    }

    /// Per-call context snapshot for the transcription client.
    pub fn transcription_context(&self) -> TranscriptionContext {
        TranscriptionContext {
            credential: self.config.settings.credential.clone(),
            source_language: self.config.settings.source_language.clone(),
            target_language: self.config.settings.target_language.clone(),
            prior_text: self.rolling_context.clone(),
        }
    }

    pub fn note_chunk(&mut self) {
        self.chunks_processed += 1;
    }

    /// Record a delivered speech fragment and grow the rolling context,
    /// trimming it to the configured trailing window.
    pub fn push_fragment(&mut self, chunk_index: usize, text: &str) {
        if !self.rolling_context.is_empty() {
            self.rolling_context.push(' ');
        }
        self.rolling_context.push_str(text);

        let limit = self.config.context_window_chars;
        let len = self.rolling_context.chars().count();
        if len > limit {
            self.rolling_context = self
                .rolling_context
                .chars()
                .skip(len - limit)
                .collect();
        }

        self.segments.push(TranscriptSegment {
            chunk_index,
            text: text.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn transcript(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn into_transcript(self) -> Vec<TranscriptSegment> {
        self.segments
    }

    pub fn status(&self) -> SessionStatus {
        let duration = Utc::now().signed_duration_since(self.started_at);
        SessionStatus {
            state: self.state,
            session_id: Some(self.config.session_id.clone()),
            started_at: Some(self.started_at),
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            chunks_processed: self.chunks_processed,
            fragments_delivered: self.segments.len(),
        }
    }

    pub fn rolling_context(&self) -> &str {
        &self.rolling_context
    }
}
