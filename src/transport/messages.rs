use anyhow::{Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::audio::AudioFrame;

/// Audio frame message carried on the capture subject
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioFrameMessage {
    pub session_id: String,
    pub sequence: u32,
    /// Base64-encoded little-endian i16 PCM, interleaved
    pub pcm: String,
    pub sample_rate: u32,
    pub channels: u16,
    /// Milliseconds since capture started
    pub timestamp_ms: u64,
    /// Last frame of the stream
    #[serde(rename = "final")]
    pub final_frame: bool,
}

impl AudioFrameMessage {
    pub fn from_frame(
        session_id: &str,
        sequence: u32,
        frame: &AudioFrame,
        final_frame: bool,
    ) -> Self {
        let pcm_bytes: Vec<u8> = frame
            .samples
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();

        Self {
            session_id: session_id.to_string(),
            sequence,
            pcm: base64::engine::general_purpose::STANDARD.encode(pcm_bytes),
            sample_rate: frame.sample_rate,
            channels: frame.channels,
            timestamp_ms: frame.timestamp_ms,
            final_frame,
        }
    }

    /// Decode the payload back into an in-memory frame.
    pub fn to_frame(&self) -> Result<AudioFrame> {
        let pcm_bytes = base64::engine::general_purpose::STANDARD
            .decode(&self.pcm)
            .context("Invalid base64 PCM payload")?;

        let samples: Vec<i16> = pcm_bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();

        Ok(AudioFrame {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
            timestamp_ms: self.timestamp_ms,
        })
    }
}
