use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the capture/transcription pipeline.
///
/// Fatal kinds terminate the active session; transient kinds are reported
/// and the session keeps running on its normal chunk cadence.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The audio device/stream could not be acquired.
    #[error("audio capture denied: {0}")]
    CaptureDenied(String),

    /// The endpoint rejected the API credential.
    #[error("invalid API credential: {0}")]
    InvalidCredential(String),

    /// The endpoint is throttling us. Retried by the natural chunk cadence.
    #[error("rate limited by transcription endpoint: {0}")]
    RateLimited(String),

    /// The configured model/endpoint path does not exist.
    #[error("transcription endpoint not found: {0}")]
    EndpointNotFound(String),

    /// Transport-level failure or server-side error.
    #[error("network error reaching transcription endpoint: {0}")]
    TransientNetwork(String),

    /// The endpoint answered with a body we could not interpret.
    #[error("malformed transcription response: {0}")]
    MalformedResponse(String),
}

/// Wire-friendly tag for a [`SessionError`], used in outbound events and
/// HTTP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionErrorKind {
    CaptureDenied,
    InvalidCredential,
    RateLimited,
    EndpointNotFound,
    TransientNetwork,
    MalformedResponse,
}

impl SessionError {
    pub fn kind(&self) -> SessionErrorKind {
        match self {
            SessionError::CaptureDenied(_) => SessionErrorKind::CaptureDenied,
            SessionError::InvalidCredential(_) => SessionErrorKind::InvalidCredential,
            SessionError::RateLimited(_) => SessionErrorKind::RateLimited,
            SessionError::EndpointNotFound(_) => SessionErrorKind::EndpointNotFound,
            SessionError::TransientNetwork(_) => SessionErrorKind::TransientNetwork,
            SessionError::MalformedResponse(_) => SessionErrorKind::MalformedResponse,
        }
    }

    /// Whether this error must terminate the session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::CaptureDenied(_)
                | SessionError::InvalidCredential(_)
                | SessionError::EndpointNotFound(_)
                | SessionError::MalformedResponse(_)
        )
    }
}
