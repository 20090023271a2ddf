use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the (single) capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    Idle,
    Starting,
    Active,
    Stopping,
}

/// Snapshot of the controller for status queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Current lifecycle state
    pub state: SessionState,

    /// Identifier of the active session, if any
    pub session_id: Option<String>,

    /// When the active session started
    pub started_at: Option<DateTime<Utc>>,

    /// Seconds since the active session started
    pub duration_secs: f64,

    /// Number of chunks consumed so far
    pub chunks_processed: usize,

    /// Number of speech fragments delivered so far
    pub fragments_delivered: usize,
}

impl SessionStatus {
    pub fn idle() -> Self {
        Self {
            state: SessionState::Idle,
            session_id: None,
            started_at: None,
            duration_secs: 0.0,
            chunks_processed: 0,
            fragments_delivered: 0,
        }
    }
}

/// One delivered piece of transcript text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Emission order of the chunk this text came from
    pub chunk_index: usize,

    /// Transcribed (or translated) text
    pub text: String,

    /// When this segment was delivered
    pub timestamp: DateTime<Utc>,
}
