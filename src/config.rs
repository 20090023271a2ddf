use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Hosted transcription endpoint settings.
#[derive(Debug, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    pub model: String,
}

/// Capture tunables. The thresholds have no single correct value; these
/// defaults are starting points.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// WAV file to replay as the capture target (demo/batch mode)
    pub input: Option<String>,

    /// Whether to pace file playback in real time
    #[serde(default = "default_realtime")]
    pub realtime: bool,

    #[serde(default = "default_chunk_duration_secs")]
    pub chunk_duration_secs: u64,

    #[serde(default = "default_silence_threshold_bytes")]
    pub silence_threshold_bytes: usize,

    #[serde(default = "default_context_window_chars")]
    pub context_window_chars: usize,

    #[serde(default = "default_min_fragment_chars")]
    pub min_fragment_chars: usize,

    #[serde(default = "default_stop_flush_timeout_secs")]
    pub stop_flush_timeout_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input: None,
            realtime: default_realtime(),
            chunk_duration_secs: default_chunk_duration_secs(),
            silence_threshold_bytes: default_silence_threshold_bytes(),
            context_window_chars: default_context_window_chars(),
            min_fragment_chars: default_min_fragment_chars(),
            stop_flush_timeout_secs: default_stop_flush_timeout_secs(),
        }
    }
}

fn default_realtime() -> bool {
    true
}

fn default_chunk_duration_secs() -> u64 {
    15
}

fn default_silence_threshold_bytes() -> usize {
    16 * 1024
}

fn default_context_window_chars() -> usize {
    600
}

fn default_min_fragment_chars() -> usize {
    2
}

fn default_stop_flush_timeout_secs() -> u64 {
    5
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
