pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod transcribe;

pub use audio::{
    AudioChunk, AudioFile, AudioFrame, ChunkSource, Chunker, ChunkerConfig, FileChunkSource,
    StreamChunkSource,
};
pub use config::Config;
pub use error::{SessionError, SessionErrorKind};
pub use http::{create_router, AppState};
pub use session::{
    CaptureSettings, Event, SessionConfig, SessionController, SessionHandle, SessionState,
    SessionStatus, SettingsUpdate, SinkStatus, TranscriptSegment,
};
pub use transcribe::{
    RemoteTranscriber, RemoteTranscriberConfig, Transcriber, Transcription, TranscriptionContext,
};
