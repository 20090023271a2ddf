use anyhow::{Context, Result};
use hound::WavReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::source::{AudioFrame, ChunkSource};
use crate::error::SessionError;

pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let reader = WavReader::open(path).context("Failed to open WAV file")?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        info!(
            "Audio file loaded: {:.1}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }
}

/// A [`ChunkSource`] that replays a WAV file as a live frame stream.
///
/// Used for batch transcription and for exercising the pipeline without a
/// real capture device. With `realtime` set, frames are paced at their
/// natural rate; otherwise they are emitted as fast as the consumer takes
/// them.
pub struct FileChunkSource {
    path: PathBuf,
    realtime: bool,
    frame_duration_ms: u64,
    stop: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl FileChunkSource {
    pub fn new(path: impl Into<PathBuf>, realtime: bool) -> Self {
        Self {
            path: path.into(),
            realtime,
            frame_duration_ms: 100,
            stop: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl ChunkSource for FileChunkSource {
    async fn open(&mut self) -> Result<mpsc::Receiver<AudioFrame>, SessionError> {
        let audio = AudioFile::open(&self.path)
            .map_err(|e| SessionError::CaptureDenied(format!("{:#}", e)))?;

        let (tx, rx) = mpsc::channel(32);
        let stop = Arc::clone(&self.stop);
        let realtime = self.realtime;
        let frame_duration_ms = self.frame_duration_ms;

        let task = tokio::spawn(async move {
            let samples_per_frame =
                (audio.sample_rate as u64 * frame_duration_ms / 1000) as usize
                    * audio.channels as usize;
            let mut timestamp_ms = 0u64;

            for window in audio.samples.chunks(samples_per_frame.max(1)) {
                if stop.load(Ordering::SeqCst) {
                    break;
                }

                let frame = AudioFrame {
                    samples: window.to_vec(),
                    sample_rate: audio.sample_rate,
                    channels: audio.channels,
                    timestamp_ms,
                };

                if tx.send(frame).await.is_err() {
                    break;
                }

                timestamp_ms += frame_duration_ms;

                if realtime {
                    tokio::time::sleep(std::time::Duration::from_millis(frame_duration_ms)).await;
                }
            }

            debug!("File playback finished: {}", audio.path);
        });

        self.task = Some(task);
        Ok(rx)
    }

    async fn close(&mut self) -> Result<()> {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn name(&self) -> &str {
        self.path.to_str().unwrap_or("audio file")
    }
}
