use std::sync::Arc;

use crate::audio::ChunkSource;
use crate::config::CaptureConfig;
use crate::session::SessionHandle;

/// Builds a fresh chunk source for each capture start.
pub type SourceFactory = Arc<dyn Fn() -> Box<dyn ChunkSource> + Send + Sync>;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Command handle to the session controller
    pub handle: SessionHandle,

    /// Factory for the capture target
    pub sources: SourceFactory,

    /// Service-level capture tunables applied to new sessions
    pub capture: CaptureConfig,
}

impl AppState {
    pub fn new(handle: SessionHandle, sources: SourceFactory, capture: CaptureConfig) -> Self {
        Self {
            handle,
            sources,
            capture,
        }
    }
}
