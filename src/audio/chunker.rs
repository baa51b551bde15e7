use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::convert;
use super::frame::{analyze, AudioFrame};
use crate::stt::SpeechRecognizer;

/// Chunker configuration
///
/// Values are latched when the loop starts; changing the configured chunk
/// duration applies from the next session.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Audio accumulated before each transcription flush
    pub chunk_duration: Duration,
    /// Target sample rate (incoming frames are converted)
    pub sample_rate: u32,
    /// Target channel count
    pub channels: u16,
    /// Chunks shorter than this are dropped rather than transcribed
    pub min_chunk_ms: u64,
    /// RMS floor below which a chunk is emitted as silence without
    /// invoking the recognizer
    pub silence_rms: f32,
    /// Language hint forwarded to the recognizer (None = auto-detect)
    pub language: Option<String>,
}

impl ChunkerConfig {
    /// Interleaved samples in one full chunk
    pub fn chunk_samples(&self) -> usize {
        (self.sample_rate as u128 * self.chunk_duration.as_millis() / 1000) as usize
            * self.channels as usize
    }

    fn min_samples(&self) -> usize {
        (self.sample_rate as u64 * self.min_chunk_ms / 1000) as usize * self.channels as usize
    }

    fn samples_to_ms(&self, samples: usize) -> u64 {
        samples as u64 * 1000 / (self.sample_rate as u64 * self.channels as u64)
    }
}

/// Text produced for one flushed chunk.
///
/// Empty text means the chunk was silence; a populated `error` means the
/// recognizer failed for this chunk and the loop moved on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Chunk number (0-indexed)
    pub chunk_index: usize,
    /// Transcribed text (empty for silence)
    pub text: String,
    /// Start of the chunk in milliseconds since the stream began
    pub start_ms: u64,
    /// Chunk duration in milliseconds
    pub duration_ms: u64,
    /// When the segment was produced
    pub timestamp: DateTime<Utc>,
    /// Recognition failure for this chunk, if any
    pub error: Option<String>,
}

impl TranscriptSegment {
    pub fn is_silence(&self) -> bool {
        self.error.is_none() && self.text.is_empty()
    }
}

/// Chunked transcription loop
///
/// Receives audio frames, accumulates them to a fixed duration, and submits
/// each full chunk to the recognizer. Segments are emitted in chunk order.
/// The flush boundary is sample-precise: exactly one chunk duration of
/// samples is drained and anything past it stays buffered.
pub struct ChunkedTranscriber {
    config: ChunkerConfig,
    recognizer: Arc<dyn SpeechRecognizer>,
    buffer: Vec<i16>,
    chunk_index: usize,
    consumed_samples: usize,
}

impl ChunkedTranscriber {
    pub fn new(config: ChunkerConfig, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        info!(
            "Chunked transcriber initialized: {}ms chunks, {}Hz/{}ch, recognizer={}",
            config.chunk_duration.as_millis(),
            config.sample_rate,
            config.channels,
            recognizer.name()
        );

        Self {
            config,
            recognizer,
            buffer: Vec::new(),
            chunk_index: 0,
            consumed_samples: 0,
        }
    }

    /// Consume frames until the source ends, emitting one segment per
    /// flushed chunk. Returns the number of segments emitted.
    ///
    /// A recognizer failure is isolated to its chunk: the segment carries
    /// the error and accumulation continues with subsequent frames.
    pub async fn run(
        mut self,
        mut audio_rx: mpsc::Receiver<AudioFrame>,
        segment_tx: mpsc::Sender<TranscriptSegment>,
    ) -> Result<usize> {
        let chunk_samples = self.config.chunk_samples();
        info!("Starting chunked transcription ({} samples per chunk)", chunk_samples);

        while let Some(frame) = audio_rx.recv().await {
            let frame =
                convert::to_target_format(frame, self.config.sample_rate, self.config.channels);
            self.buffer.extend_from_slice(&frame.samples);

            while self.buffer.len() >= chunk_samples {
                let chunk: Vec<i16> = self.buffer.drain(..chunk_samples).collect();
                let segment = self.flush(chunk).await;
                if segment_tx.send(segment).await.is_err() {
                    info!("Segment receiver dropped, stopping transcription");
                    return Ok(self.chunk_index);
                }
            }
        }

        // Trailing partial chunk: flush if it clears the minimum length
        if self.buffer.len() >= self.config.min_samples() {
            let chunk = std::mem::take(&mut self.buffer);
            let segment = self.flush(chunk).await;
            let _ = segment_tx.send(segment).await;
        } else if !self.buffer.is_empty() {
            debug!(
                "Dropping {}ms trailing audio below minimum chunk length",
                self.config.samples_to_ms(self.buffer.len())
            );
        }

        info!("Chunked transcription complete: {} segments", self.chunk_index);

        Ok(self.chunk_index)
    }

    async fn flush(&mut self, chunk: Vec<i16>) -> TranscriptSegment {
        let chunk_index = self.chunk_index;
        let start_ms = self.config.samples_to_ms(self.consumed_samples);
        let duration_ms = self.config.samples_to_ms(chunk.len());

        self.chunk_index += 1;
        self.consumed_samples += chunk.len();

        let stats = analyze(&chunk, self.config.sample_rate, self.config.channels);
        let min_duration_secs = self.config.min_chunk_ms as f64 / 1000.0;

        if !stats.is_voice(self.config.silence_rms, min_duration_secs) {
            debug!(
                "Chunk {} gated as silence ({:.1}s, rms {:.4}, peak {:.4})",
                chunk_index, stats.duration_secs, stats.rms, stats.peak
            );
            return self.segment(chunk_index, String::new(), start_ms, duration_ms, None);
        }

        match self
            .recognizer
            .transcribe(
                &chunk,
                self.config.sample_rate,
                self.config.channels,
                self.config.language.as_deref(),
            )
            .await
        {
            Ok(text) => {
                info!(
                    "Chunk {} transcribed: {:.1}s -> {} chars",
                    chunk_index,
                    stats.duration_secs,
                    text.len()
                );
                self.segment(chunk_index, text, start_ms, duration_ms, None)
            }
            Err(e) => {
                error!("Transcription failed for chunk {}: {:#}", chunk_index, e);
                self.segment(chunk_index, String::new(), start_ms, duration_ms, Some(format!("{e:#}")))
            }
        }
    }

    fn segment(
        &self,
        chunk_index: usize,
        text: String,
        start_ms: u64,
        duration_ms: u64,
        error: Option<String>,
    ) -> TranscriptSegment {
        TranscriptSegment {
            chunk_index,
            text,
            start_ms,
            duration_ms,
            timestamp: Utc::now(),
            error,
        }
    }
}
