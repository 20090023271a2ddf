use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use super::config::{SessionConfig, SettingsUpdate};
use super::stats::{SessionStatus, TranscriptSegment};
use crate::audio::ChunkSource;
use crate::error::{SessionError, SessionErrorKind};

/// Inbound commands to the session controller. One typed union, one
/// dispatch point, instead of stringly-typed message chains.
pub enum Command {
    Start {
        config: SessionConfig,
        source: Box<dyn ChunkSource>,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
    Reconfigure {
        update: SettingsUpdate,
        reply: oneshot::Sender<bool>,
    },
    Status {
        reply: oneshot::Sender<SessionStatus>,
    },
    Transcript {
        reply: oneshot::Sender<Vec<TranscriptSegment>>,
    },
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Start { config, .. } => {
                f.debug_struct("Start").field("config", config).finish()
            }
            Command::Stop { .. } => f.debug_struct("Stop").finish(),
            Command::Reconfigure { update, .. } => {
                f.debug_struct("Reconfigure").field("update", update).finish()
            }
            Command::Status { .. } => f.debug_struct("Status").finish(),
            Command::Transcript { .. } => f.debug_struct("Transcript").finish(),
        }
    }
}

/// Coarse status surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SinkStatus {
    /// Capturing, waiting for the next chunk
    Listening,
    /// A chunk is being transcribed
    Processing,
    /// The last chunk held no usable speech
    NoSpeech,
}

/// Outbound events to the presentation sink.
///
/// `Fragment` events carry speech text only, in chunk-emission order.
/// Delivery is best-effort: a sink that stopped listening never aborts
/// the pipeline.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Event {
    CaptureStarted { session_id: String },
    CaptureStopped { session_id: String },
    Fragment { text: String },
    Status { status: SinkStatus },
    Error { kind: SessionErrorKind, message: String },
}

/// Best-effort event delivery with a log line on a gone or lagging sink.
pub(crate) fn emit(events: &mpsc::Sender<Event>, event: Event) {
    if let Err(e) = events.try_send(event) {
        tracing::warn!("Presentation sink not keeping up, dropping event: {}", e);
    }
}
