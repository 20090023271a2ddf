use crate::error::SessionError;
use anyhow::Result;
use tokio::sync::mpsc;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// A live provider of audio frames for one capture target.
///
/// Implementations wrap whatever actually produces the audio: a device
/// stream, another process, or a file (for tests and batch runs). The
/// frame channel closing is how a source signals that the capture target
/// disappeared.
#[async_trait::async_trait]
pub trait ChunkSource: Send {
    /// Acquire the underlying stream and start producing frames.
    ///
    /// Fails with [`SessionError::CaptureDenied`] if the target cannot be
    /// captured; in that case the source never starts.
    async fn open(&mut self) -> Result<mpsc::Receiver<AudioFrame>, SessionError>;

    /// Stop producing frames and release the underlying stream.
    async fn close(&mut self) -> Result<()>;

    /// Check if the source is currently producing frames
    fn is_open(&self) -> bool;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// A [`ChunkSource`] backed by an externally supplied frame channel.
///
/// This is the adapter for live capture backends: whoever owns the real
/// device stream pushes frames into the sender half and hands the receiver
/// to this source.
pub struct StreamChunkSource {
    name: String,
    frames: Option<mpsc::Receiver<AudioFrame>>,
    open: bool,
}

impl StreamChunkSource {
    pub fn new(name: impl Into<String>, frames: mpsc::Receiver<AudioFrame>) -> Self {
        Self {
            name: name.into(),
            frames: Some(frames),
            open: false,
        }
    }
}

#[async_trait::async_trait]
impl ChunkSource for StreamChunkSource {
    async fn open(&mut self) -> Result<mpsc::Receiver<AudioFrame>, SessionError> {
        match self.frames.take() {
            Some(rx) => {
                self.open = true;
                Ok(rx)
            }
            None => Err(SessionError::CaptureDenied(format!(
                "stream '{}' is already captured",
                self.name
            ))),
        }
    }

    async fn close(&mut self) -> Result<()> {
        // The producer observes the receiver being dropped by the consumer;
        // nothing to release on this side.
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn name(&self) -> &str {
        &self.name
    }
}
