use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use super::{ModelSize, SpeechRecognizer};
use crate::audio::encode_wav;
use crate::config::WhisperConfig;

/// HTTP client for an OpenAI-compatible `audio/transcriptions` endpoint.
///
/// Each chunk is encoded as an in-memory WAV and uploaded as a multipart
/// form; the endpoint replies with `{"text": "..."}`.
pub struct WhisperClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: ModelSize,
}

impl WhisperClient {
    pub fn new(client: reqwest::Client, config: &WhisperConfig) -> Result<Self> {
        let model: ModelSize = config
            .model_size
            .parse()
            .with_context(|| format!("Invalid Whisper model size: {}", config.model_size))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model,
        })
    }

    pub fn model(&self) -> ModelSize {
        self.model
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for WhisperClient {
    async fn transcribe(
        &self,
        samples: &[i16],
        sample_rate: u32,
        channels: u16,
        language: Option<&str>,
    ) -> Result<String> {
        let wav = encode_wav(samples, sample_rate, channels)?;
        debug!(
            "Uploading {} byte chunk to {} (model={})",
            wav.len(),
            self.endpoint,
            self.model
        );

        let part = reqwest::multipart::Part::bytes(wav)
            .file_name("chunk.wav")
            .mime_str("audio/wav")
            .context("Failed to build WAV upload part")?;

        let mut form = reqwest::multipart::Form::new()
            .text("model", self.model.as_str())
            .part("file", part);
        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("Transcription request failed")?
            .error_for_status()
            .context("Transcription endpoint returned an error")?;

        let payload: Value = response
            .json()
            .await
            .context("Failed to parse transcription response")?;

        let text = payload
            .get("text")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        Ok(text)
    }

    fn name(&self) -> &str {
        "whisper-http"
    }
}
