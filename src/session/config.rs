use serde::{Deserialize, Serialize};
use std::time::Duration;

/// User-facing capture settings. These can be changed mid-session via
/// reconfigure; changes take effect on the next chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// API credential for the hosted transcription endpoint
    pub credential: String,

    /// Spoken language, or "auto" to let the model detect it
    pub source_language: String,

    /// Translation target, or "none" for verbatim transcription
    pub target_language: String,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            credential: String::new(),
            source_language: "auto".to_string(),
            target_language: "none".to_string(),
        }
    }
}

/// Partial settings update applied in place to an active session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub credential: Option<String>,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
}

impl CaptureSettings {
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(credential) = update.credential {
            self.credential = credential;
        }
        if let Some(source) = update.source_language {
            self.source_language = source;
        }
        if let Some(target) = update.target_language {
            self.target_language = target;
        }
    }
}

/// Configuration for one capture session.
///
/// The timing and threshold values deliberately have no single "correct"
/// setting; they are tunables with conservative defaults.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Capture settings (credential, languages)
    pub settings: CaptureSettings,

    /// Duration of each audio chunk (default: 15 seconds)
    pub chunk_duration: Duration,

    /// Trailing transcript window carried into each prompt, in characters
    pub context_window_chars: usize,

    /// How long a stop waits for the final chunk's transcription before
    /// tearing down anyway
    pub stop_flush_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("capture-{}", uuid::Uuid::new_v4()),
            settings: CaptureSettings::default(),
            chunk_duration: Duration::from_secs(15),
            context_window_chars: 600,
            stop_flush_timeout: Duration::from_secs(5),
        }
    }
}
