use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tabscribe::audio::{AudioFrame, ChunkSource, FileChunkSource};
use tabscribe::error::SessionError;
use tabscribe::http::{create_router, AppState, SourceFactory};
use tabscribe::session::{Event, SessionController};
use tabscribe::transcribe::{RemoteTranscriber, RemoteTranscriberConfig};
use tabscribe::Config;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "tabscribe", about = "Chunked live-audio transcription service")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(short, long, default_value = "config/tabscribe")]
    config: String,

    /// Override the configured HTTP port
    #[arg(short, long)]
    port: Option<u16>,
}

/// Placeholder source used when no capture input is configured; every
/// start request is denied instead of silently producing nothing.
struct NoCaptureSource;

#[async_trait::async_trait]
impl ChunkSource for NoCaptureSource {
    async fn open(&mut self) -> Result<mpsc::Receiver<AudioFrame>, SessionError> {
        Err(SessionError::CaptureDenied(
            "no capture input configured".to_string(),
        ))
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_open(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!(
        "Transcription endpoint: {} ({})",
        cfg.endpoint.base_url, cfg.endpoint.model
    );

    let transcriber = Arc::new(RemoteTranscriber::new(RemoteTranscriberConfig {
        base_url: cfg.endpoint.base_url.clone(),
        model: cfg.endpoint.model.clone(),
        silence_threshold_bytes: cfg.capture.silence_threshold_bytes,
        min_fragment_chars: cfg.capture.min_fragment_chars,
    }));

    let (handle, mut events) = SessionController::spawn(transcriber, None);

    // Default presentation sink: print fragments, log the rest.
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                Event::Fragment { text } => println!("{}", text),
                Event::CaptureStarted { session_id } => {
                    info!("Capture started: {}", session_id)
                }
                Event::CaptureStopped { session_id } => {
                    info!("Capture stopped: {}", session_id)
                }
                Event::Status { status } => info!("Status: {:?}", status),
                Event::Error { kind, message } => {
                    warn!("Session error ({:?}): {}", kind, message)
                }
            }
        }
    });

    let capture = cfg.capture.clone();
    let sources: SourceFactory = Arc::new(move || match &capture.input {
        Some(path) => {
            Box::new(FileChunkSource::new(path.clone(), capture.realtime)) as Box<dyn ChunkSource>
        }
        None => Box::new(NoCaptureSource),
    });

    let state = AppState::new(handle, sources, cfg.capture.clone());
    let router = create_router(state);

    let addr = format!(
        "{}:{}",
        cfg.service.http.bind,
        args.port.unwrap_or(cfg.service.http.port)
    );
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
