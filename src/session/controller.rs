use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::config::{SessionConfig, SettingsUpdate};
use super::events::{emit, Command, Event, SinkStatus};
use super::session::CaptureSession;
use super::stats::{SessionState, SessionStatus, TranscriptSegment};
use crate::audio::{AudioChunk, AudioFrame, ChunkSource, Chunker, ChunkerConfig};
use crate::error::SessionError;
use crate::transcribe::{Transcriber, Transcription};

/// Everything owned on behalf of one non-idle session.
struct ActiveSession {
    session: CaptureSession,
    source: Box<dyn ChunkSource>,
    chunks_rx: mpsc::Receiver<AudioChunk>,
    flush_tx: mpsc::Sender<()>,
    chunker_task: JoinHandle<()>,
}

/// Cloneable front door to the session controller.
///
/// All interaction goes through the command channel; the controller task
/// is the only owner of session state.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Start capturing. If another session is active it is driven to idle
    /// first; two sources are never interleaved.
    pub async fn start(
        &self,
        config: SessionConfig,
        source: Box<dyn ChunkSource>,
    ) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Start {
                config,
                source,
                reply,
            })
            .await
            .map_err(|_| {
                SessionError::CaptureDenied("session controller is not running".to_string())
            })?;
        rx.await.map_err(|_| {
            SessionError::CaptureDenied("session controller dropped the request".to_string())
        })?
    }

    /// Stop the active session, flushing the current partial chunk first.
    /// A no-op (with no events) when already idle.
    pub async fn stop(&self) {
        let (reply, rx) = oneshot::channel();
        if self.commands.send(Command::Stop { reply }).await.is_ok() {
            let _ = rx.await;
        }
    }

    /// Update settings of the active session in place. Takes effect on the
    /// next chunk. Returns false when there is no active session.
    pub async fn reconfigure(&self, update: SettingsUpdate) -> bool {
        let (reply, rx) = oneshot::channel();
        if self
            .commands
            .send(Command::Reconfigure { update, reply })
            .await
            .is_err()
        {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    pub async fn status(&self) -> SessionStatus {
        let (reply, rx) = oneshot::channel();
        if self.commands.send(Command::Status { reply }).await.is_err() {
            return SessionStatus::idle();
        }
        rx.await.unwrap_or_else(|_| SessionStatus::idle())
    }

    /// Ordered transcript of the active session, or of the most recently
    /// finished one when idle.
    pub async fn transcript(&self) -> Vec<TranscriptSegment> {
        let (reply, rx) = oneshot::channel();
        if self
            .commands
            .send(Command::Transcript { reply })
            .await
            .is_err()
        {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }
}

enum Wake {
    Command(Option<Command>),
    Chunk(Option<AudioChunk>),
}

/// Owns the capture lifecycle: at most one session occupies
/// starting/active/stopping at a time, chunk submissions are strictly
/// serialized, and fragments reach the sink in chunk-emission order.
pub struct SessionController {
    transcriber: Arc<dyn Transcriber>,
    monitor: Option<mpsc::Sender<AudioFrame>>,
    commands: mpsc::Receiver<Command>,
    events: mpsc::Sender<Event>,
    active: Option<ActiveSession>,
    last_transcript: Vec<TranscriptSegment>,
}

impl SessionController {
    /// Spawn the controller task. Returns the command handle and the
    /// outbound event stream for the presentation sink.
    pub fn spawn(
        transcriber: Arc<dyn Transcriber>,
        monitor: Option<mpsc::Sender<AudioFrame>>,
    ) -> (SessionHandle, mpsc::Receiver<Event>) {
        let (commands_tx, commands_rx) = mpsc::channel(16);
        let (events_tx, events_rx) = mpsc::channel(256);

        let controller = SessionController {
            transcriber,
            monitor,
            commands: commands_rx,
            events: events_tx,
            active: None,
            last_transcript: Vec::new(),
        };

        tokio::spawn(controller.run());

        (SessionHandle { commands: commands_tx }, events_rx)
    }

    async fn run(mut self) {
        info!("Session controller started");

        loop {
            let wake = match self.active.as_mut() {
                Some(active) => {
                    tokio::select! {
                        cmd = self.commands.recv() => Wake::Command(cmd),
                        chunk = active.chunks_rx.recv() => Wake::Chunk(chunk),
                    }
                }
                None => Wake::Command(self.commands.recv().await),
            };

            match wake {
                Wake::Command(Some(cmd)) => self.handle_command(cmd).await,
                Wake::Command(None) => {
                    if self.active.is_some() {
                        self.stop_active().await;
                    }
                    break;
                }
                Wake::Chunk(Some(chunk)) => self.process_chunk(chunk).await,
                Wake::Chunk(None) => {
                    // Capture target disappeared: treat as an implicit stop.
                    info!("Chunk stream ended unexpectedly, stopping session");
                    self.finish_active(true).await;
                }
            }
        }

        info!("Session controller stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start {
                config,
                source,
                reply,
            } => {
                if self.active.is_some() {
                    info!("Start requested while a session is active, stopping it first");
                    self.stop_active().await;
                }
                let result = self.start_session(config, source).await;
                let _ = reply.send(result);
            }
            Command::Stop { reply } => {
                if self.active.is_some() {
                    self.stop_active().await;
                } else {
                    debug!("Stop requested while idle, ignoring");
                }
                let _ = reply.send(());
            }
            Command::Reconfigure { update, reply } => {
                let applied = match self.active.as_mut() {
                    Some(active) => {
                        info!(
                            "Reconfiguring session {}: {:?}",
                            active.session.config.session_id, update
                        );
                        active.session.config.settings.apply(update);
                        true
                    }
                    None => {
                        debug!("Reconfigure requested while idle, ignoring");
                        false
                    }
                };
                let _ = reply.send(applied);
            }
            Command::Status { reply } => {
                let status = self
                    .active
                    .as_ref()
                    .map(|a| a.session.status())
                    .unwrap_or_else(SessionStatus::idle);
                let _ = reply.send(status);
            }
            Command::Transcript { reply } => {
                let transcript = match self.active.as_ref() {
                    Some(active) => active.session.transcript().to_vec(),
                    None => self.last_transcript.clone(),
                };
                let _ = reply.send(transcript);
            }
        }
    }

    async fn start_session(
        &mut self,
        config: SessionConfig,
        mut source: Box<dyn ChunkSource>,
    ) -> Result<(), SessionError> {
        info!(
            "Starting capture session {} on '{}'",
            config.session_id,
            source.name()
        );

        let frames = match source.open().await {
            Ok(rx) => rx,
            Err(e) => {
                error!("Capture acquisition failed: {}", e);
                emit(
                    &self.events,
                    Event::Error {
                        kind: e.kind(),
                        message: e.to_string(),
                    },
                );
                return Err(e);
            }
        };

        // Small chunk buffer: chunks that back up behind a slow remote
        // call get merged on the next submission instead of queuing.
        let (chunks_tx, chunks_rx) = mpsc::channel(8);
        let (flush_tx, flush_rx) = mpsc::channel(1);

        let chunker = Chunker::new(ChunkerConfig {
            chunk_duration: config.chunk_duration,
        });
        let chunker_task = tokio::spawn(chunker.run(frames, chunks_tx, flush_rx, self.monitor.clone()));

        let mut session = CaptureSession::new(config);
        session.state = SessionState::Active;

        emit(
            &self.events,
            Event::CaptureStarted {
                session_id: session.config.session_id.clone(),
            },
        );
        emit(
            &self.events,
            Event::Status {
                status: SinkStatus::Listening,
            },
        );

        self.active = Some(ActiveSession {
            session,
            source,
            chunks_rx,
            flush_tx,
            chunker_task,
        });

        Ok(())
    }

    /// Submit one chunk and deliver the outcome. Runs to completion before
    /// the controller looks at the next chunk or command, which is what
    /// guarantees at most one outstanding transcription call and in-order
    /// fragment delivery.
    async fn process_chunk(&mut self, mut chunk: AudioChunk) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        // Merge anything that queued up behind the previous call into this
        // submission window rather than submitting a backlog one by one.
        while let Ok(pending) = active.chunks_rx.try_recv() {
            debug!(
                "Merging backed-up chunk {} into chunk {}",
                pending.index, chunk.index
            );
            chunk.merge(pending);
        }

        active.session.note_chunk();
        let is_final = chunk.is_final;
        let chunk_index = chunk.index;

        emit(
            &self.events,
            Event::Status {
                status: SinkStatus::Processing,
            },
        );

        let ctx = active.session.transcription_context();
        match self.transcriber.transcribe(&chunk, &ctx).await {
            Ok(Transcription::Speech(text)) => {
                debug!("Chunk {}: speech fragment delivered", chunk_index);
                active.session.push_fragment(chunk_index, &text);
                emit(&self.events, Event::Fragment { text });
                emit(
                    &self.events,
                    Event::Status {
                        status: SinkStatus::Listening,
                    },
                );
            }
            Ok(Transcription::Silence) | Ok(Transcription::NoSpeechDetected) => {
                debug!("Chunk {}: no speech", chunk_index);
                emit(
                    &self.events,
                    Event::Status {
                        status: SinkStatus::NoSpeech,
                    },
                );
            }
            Err(e) => {
                emit(
                    &self.events,
                    Event::Error {
                        kind: e.kind(),
                        message: e.to_string(),
                    },
                );

                if e.is_fatal() {
                    error!("Fatal session error, tearing down: {}", e);
                    self.finish_active(true).await;
                    return;
                }

                warn!("Transient session error, continuing: {}", e);
                emit(
                    &self.events,
                    Event::Status {
                        status: SinkStatus::Listening,
                    },
                );
            }
        }

        if is_final {
            self.finish_active(true).await;
        }
    }

    /// Explicit stop: flush the current partial buffer, then wait for the
    /// remaining chunks' transcriptions under a real deadline instead of a
    /// blind delay. A deadline hit discards the pending fragment.
    async fn stop_active(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        info!(
            "Stopping capture session {}",
            active.session.config.session_id
        );
        active.session.state = SessionState::Stopping;

        let deadline = Instant::now() + active.session.config.stop_flush_timeout;
        let _ = active.flush_tx.send(()).await;

        loop {
            let Some(active) = self.active.as_mut() else {
                // Final chunk was processed and teardown already ran.
                break;
            };

            match tokio::time::timeout_at(deadline, active.chunks_rx.recv()).await {
                Ok(Some(chunk)) => {
                    if tokio::time::timeout_at(deadline, self.process_chunk(chunk))
                        .await
                        .is_err()
                    {
                        warn!("Stop deadline hit mid-transcription, discarding final fragment");
                        self.finish_active(true).await;
                        break;
                    }
                }
                Ok(None) => {
                    self.finish_active(true).await;
                    break;
                }
                Err(_) => {
                    warn!("Stop deadline hit waiting for the final chunk");
                    self.finish_active(true).await;
                    break;
                }
            }
        }
    }

    /// Release the source and return to idle. The finished session's
    /// transcript stays retrievable until the next session starts.
    async fn finish_active(&mut self, emit_stopped: bool) {
        let Some(mut active) = self.active.take() else {
            return;
        };

        let session_id = active.session.config.session_id.clone();

        if let Err(e) = active.source.close().await {
            warn!("Failed to close chunk source: {}", e);
        }
        active.chunker_task.abort();

        self.last_transcript = active.session.into_transcript();

        if emit_stopped {
            emit(&self.events, Event::CaptureStopped { session_id: session_id.clone() });
        }

        info!("Capture session {} is now idle", session_id);
    }
}
