//! Capture session lifecycle
//!
//! This module provides the session controller that owns the pipeline:
//! - one capture session at a time (start/stop/reconfigure)
//! - strictly serialized chunk transcription (fragment order == chunk order)
//! - typed command/event channels toward the control and presentation layers
//! - rolling transcript context and transcript accumulation

mod config;
mod controller;
mod events;
mod session;
mod stats;

pub use config::{CaptureSettings, SessionConfig, SettingsUpdate};
pub use controller::{SessionController, SessionHandle};
pub use events::{Command, Event, SinkStatus};
pub use session::CaptureSession;
pub use stats::{SessionState, SessionStatus, TranscriptSegment};
