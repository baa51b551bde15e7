use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub whisper: WhisperConfig,
    pub search: SearchConfig,
    #[serde(default)]
    pub transport: TransportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
    /// Verbose logging toggle (also settable via the DEBUG env var)
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Audio pipeline settings shared by every session unless overridden at
/// session start.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Seconds of audio accumulated before each transcription flush
    pub chunk_duration_secs: u64,
    /// Target sample rate (incoming frames are converted)
    pub sample_rate: u32,
    /// Target channel count (1 = mono)
    pub channels: u16,
    /// Chunks shorter than this are never sent for transcription
    pub min_chunk_ms: u64,
    /// RMS floor below which a chunk counts as silence
    pub silence_rms: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            chunk_duration_secs: 3,
            sample_rate: 16000, // Whisper expects 16kHz
            channels: 1,        // Mono
            min_chunk_ms: 500,
            silence_rms: 0.01,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WhisperConfig {
    /// Transcription endpoint (OpenAI-compatible audio/transcriptions)
    pub endpoint: String,
    /// Model size: tiny, base, small, medium, large
    pub model_size: String,
    /// Language hint; omit for auto-detection
    pub language: Option<String>,
    /// Bearer token; falls back to the WHISPER_API_KEY env var
    pub api_key: Option<String>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/v1/audio/transcriptions".to_string(),
            model_size: "base".to_string(),
            language: None,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the hosted search/completion account
    pub base_url: String,
    /// Bearer token; falls back to the SEARCH_API_TOKEN env var
    #[serde(default)]
    pub token: Option<String>,
    pub database: String,
    pub schema: String,
    /// Search service name within database.schema
    pub service: String,
    /// Completion model used to answer from retrieved context
    #[serde(default = "default_completion_model")]
    pub model: String,
    /// Number of document fragments retrieved per query
    #[serde(default = "default_chunk_limit")]
    pub chunk_limit: usize,
    /// Answer transcripts automatically as they arrive
    #[serde(default = "default_auto_search")]
    pub auto_search: bool,
}

fn default_completion_model() -> String {
    "llama3.2-1b".to_string()
}

fn default_chunk_limit() -> usize {
    2
}

fn default_auto_search() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// NATS server delivering capture frames
    pub nats_url: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            nats_url: "nats://localhost:4222".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, layered with environment
    /// overrides (VOICE_SEARCH_SERVICE__HTTP__PORT=8081 etc).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("VOICE_SEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;

        // Secrets come from the process environment, never the file
        if cfg.whisper.api_key.is_none() {
            cfg.whisper.api_key = std::env::var("WHISPER_API_KEY").ok();
        }
        if cfg.search.token.is_none() {
            cfg.search.token = std::env::var("SEARCH_API_TOKEN").ok();
        }
        if let Ok(debug) = std::env::var("DEBUG") {
            cfg.service.debug = !matches!(debug.to_lowercase().as_str(), "false" | "no" | "0" | "");
        }

        Ok(cfg)
    }
}
