use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;

/// Configuration for one voice query session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (doubles as the frame subject suffix)
    pub session_id: String,

    /// Audio accumulated before each transcription flush
    pub chunk_duration: Duration,

    /// Sample rate for audio processing (Whisper expects 16kHz)
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono)
    pub channels: u16,

    /// Chunks shorter than this are never transcribed
    pub min_chunk_ms: u64,

    /// RMS floor for the silence gate
    pub silence_rms: f32,

    /// Language hint (None = auto-detect)
    pub language: Option<String>,

    /// Answer transcripts automatically as they arrive
    pub auto_search: bool,

    /// NATS server URL delivering capture frames
    pub nats_url: String,
}

impl SessionConfig {
    /// Session defaults drawn from the service configuration
    pub fn from_config(config: &Config, session_id: String) -> Self {
        Self {
            session_id,
            chunk_duration: Duration::from_secs(config.audio.chunk_duration_secs),
            sample_rate: config.audio.sample_rate,
            channels: config.audio.channels,
            min_chunk_ms: config.audio.min_chunk_ms,
            silence_rms: config.audio.silence_rms,
            language: config.whisper.language.clone(),
            auto_search: config.search.auto_search,
            nats_url: config.transport.nats_url.clone(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            chunk_duration: Duration::from_secs(3),
            sample_rate: 16000, // Whisper expects 16kHz
            channels: 1,        // Mono
            min_chunk_ms: 500,
            silence_rms: 0.01,
            language: None,
            auto_search: true,
            nats_url: "nats://localhost:4222".to_string(),
        }
    }
}
