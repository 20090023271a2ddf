//! Remote transcription of audio chunks
//!
//! This module turns one audio chunk into at most one text fragment:
//! - `prompt` builds the instruction sent alongside the audio
//! - `filter` screens out silence and hallucinated boilerplate
//! - `client` speaks the hosted endpoint's wire format

pub mod client;
pub mod filter;
pub mod prompt;

use crate::audio::AudioChunk;
use crate::error::SessionError;

/// Per-call context for one transcription. Passed by value from the
/// session controller; the client never mutates session state.
#[derive(Debug, Clone)]
pub struct TranscriptionContext {
    /// API credential for the hosted endpoint
    pub credential: String,
    /// Spoken language, or "auto" to let the model detect it
    pub source_language: String,
    /// Translation target, or "none" for verbatim transcription
    pub target_language: String,
    /// Bounded trailing window of already-transcribed text, so the model
    /// continues mid-sentence instead of restarting
    pub prior_text: String,
}

/// Outcome of transcribing one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcription {
    /// Non-empty, filtered text
    Speech(String),
    /// Chunk was below the size threshold; no remote call was made
    Silence,
    /// The remote call happened but produced nothing usable
    NoSpeechDetected,
}

/// One-chunk-in, zero-or-one-fragment-out transcription.
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        chunk: &AudioChunk,
        ctx: &TranscriptionContext,
    ) -> Result<Transcription, SessionError>;
}

pub use client::{RemoteTranscriber, RemoteTranscriberConfig};
