//! Speech recognition backends
//!
//! The recognizer is a black box behind [`SpeechRecognizer`]: it accepts a
//! fixed-duration PCM buffer plus a language hint and returns text. The
//! shipped implementation talks to an OpenAI-compatible Whisper endpoint.

mod whisper;

pub use whisper::WhisperClient;

use anyhow::Result;
use std::fmt;
use std::str::FromStr;

/// Whisper model size (accuracy/speed trade-off)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSize {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

impl ModelSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        }
    }

    pub const ALL: [ModelSize; 5] = [
        ModelSize::Tiny,
        ModelSize::Base,
        ModelSize::Small,
        ModelSize::Medium,
        ModelSize::Large,
    ];
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tiny" => Ok(ModelSize::Tiny),
            "base" => Ok(ModelSize::Base),
            "small" => Ok(ModelSize::Small),
            "medium" => Ok(ModelSize::Medium),
            "large" => Ok(ModelSize::Large),
            other => {
                let expected: Vec<&str> = ModelSize::ALL.iter().map(|m| m.as_str()).collect();
                anyhow::bail!("Unknown model size: {other} (expected one of {})", expected.join(", "))
            }
        }
    }
}

/// Language hints the UI offers; None means auto-detect.
pub const SUPPORTED_LANGUAGES: [&str; 10] =
    ["en", "es", "fr", "de", "it", "pt", "ru", "ja", "ko", "zh"];

/// Speech recognition backend trait
#[async_trait::async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe a buffer of interleaved i16 PCM.
    ///
    /// Returns the recognized text; an empty string means the model heard
    /// nothing intelligible.
    async fn transcribe(
        &self,
        samples: &[i16],
        sample_rate: u32,
        channels: u16,
        language: Option<&str>,
    ) -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
