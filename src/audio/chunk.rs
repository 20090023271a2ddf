use anyhow::{Context, Result};
use std::io::Cursor;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::source::AudioFrame;

/// Chunker configuration
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Duration of each emitted chunk (default: 15 seconds)
    pub chunk_duration: Duration,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_duration: Duration::from_secs(15),
        }
    }
}

/// An ordered, time-bounded segment of captured audio.
///
/// Chunks are ephemeral: they exist to be handed to the transcription
/// client and are discarded afterwards.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Chunk number (0-indexed, emission order)
    pub index: usize,
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Start time in milliseconds since capture started
    pub start_ms: u64,
    /// End time in milliseconds since capture started
    pub end_ms: u64,
    /// Whether this is the last chunk the chunker will emit
    pub is_final: bool,
}

impl AudioChunk {
    /// Size of the raw PCM payload in bytes. Used by the silence pre-filter.
    pub fn pcm_byte_len(&self) -> usize {
        self.samples.len() * std::mem::size_of::<i16>()
    }

    /// Absorb a later chunk into this one, extending the window.
    ///
    /// Used when chunks back up behind a slow transcription call: instead
    /// of queuing them, pending chunks are merged into one submission.
    pub fn merge(&mut self, later: AudioChunk) {
        debug_assert!(later.start_ms >= self.start_ms);
        self.samples.extend_from_slice(&later.samples);
        self.end_ms = later.end_ms;
        self.is_final = self.is_final || later.is_final;
    }

    /// Encode the chunk as a WAV file in memory, for the remote payload.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut bytes = Vec::new();
        {
            let cursor = Cursor::new(&mut bytes);
            let mut writer = hound::WavWriter::new(cursor, spec)
                .context("Failed to create in-memory WAV writer")?;

            for &sample in &self.samples {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV buffer")?;
            }

            writer.finalize().context("Failed to finalize WAV buffer")?;
        }

        Ok(bytes)
    }
}

/// Splits a live frame stream into fixed-duration chunks.
///
/// Every incoming frame is also forwarded unchanged to the optional
/// monitor channel, so the captured audio stays audible while we record
/// it. Capturing must never mute the source.
pub struct Chunker {
    config: ChunkerConfig,
    buffer: Vec<i16>,
    sample_rate: u32,
    channels: u16,
    chunk_index: usize,
    chunk_start_ms: u64,
    last_frame_ms: u64,
    started: bool,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self {
            config,
            buffer: Vec::new(),
            sample_rate: 0,
            channels: 0,
            chunk_index: 0,
            chunk_start_ms: 0,
            last_frame_ms: 0,
            started: false,
        }
    }

    /// Consume frames until the stream ends or a flush is requested.
    ///
    /// A flush forces immediate emission of the current partial buffer as a
    /// final chunk and stops all further chunking, so the tail of speech is
    /// not lost on stop. The frame channel closing (capture target gone)
    /// ends the run the same way.
    pub async fn run(
        mut self,
        mut frames: mpsc::Receiver<AudioFrame>,
        chunks: mpsc::Sender<AudioChunk>,
        mut flush: mpsc::Receiver<()>,
        monitor: Option<mpsc::Sender<AudioFrame>>,
    ) {
        info!(
            "Chunker started ({}s chunks)",
            self.config.chunk_duration.as_secs()
        );

        loop {
            tokio::select! {
                maybe_frame = frames.recv() => {
                    match maybe_frame {
                        Some(frame) => {
                            if let Some(tap) = &monitor {
                                // Playback must not be able to stall capture:
                                // drop passthrough frames if the monitor lags.
                                if tap.try_send(frame.clone()).is_err() {
                                    debug!("Monitor channel full, dropping passthrough frame");
                                }
                            }

                            self.push_frame(frame);

                            if self.chunk_elapsed_ms() >= self.config.chunk_duration.as_millis() as u64 {
                                let chunk = self.take_chunk(false);
                                if chunks.send(chunk).await.is_err() {
                                    warn!("Chunk receiver dropped, stopping chunker");
                                    return;
                                }
                            }
                        }
                        None => {
                            debug!("Frame stream ended, emitting final chunk");
                            let chunk = self.take_chunk(true);
                            let _ = chunks.send(chunk).await;
                            return;
                        }
                    }
                }
                _ = flush.recv() => {
                    info!("Flush requested, emitting final partial chunk");
                    let chunk = self.take_chunk(true);
                    let _ = chunks.send(chunk).await;
                    return;
                }
            }
        }
    }

    fn push_frame(&mut self, frame: AudioFrame) {
        if !self.started {
            self.started = true;
            self.sample_rate = frame.sample_rate;
            self.channels = frame.channels;
            self.chunk_start_ms = frame.timestamp_ms;
        }

        self.last_frame_ms = frame.timestamp_ms;
        self.buffer.extend_from_slice(&frame.samples);
    }

    fn chunk_elapsed_ms(&self) -> u64 {
        if !self.started {
            return 0;
        }
        self.last_frame_ms.saturating_sub(self.chunk_start_ms)
    }

    fn take_chunk(&mut self, is_final: bool) -> AudioChunk {
        let chunk = AudioChunk {
            index: self.chunk_index,
            samples: std::mem::take(&mut self.buffer),
            sample_rate: self.sample_rate,
            channels: self.channels,
            start_ms: self.chunk_start_ms,
            end_ms: self.last_frame_ms,
            is_final,
        };

        debug!(
            "Chunk {} ready: {:.1}s - {:.1}s ({} samples, final={})",
            chunk.index,
            chunk.start_ms as f64 / 1000.0,
            chunk.end_ms as f64 / 1000.0,
            chunk.samples.len(),
            is_final
        );

        self.chunk_index += 1;
        self.chunk_start_ms = self.last_frame_ms;

        chunk
    }
}
