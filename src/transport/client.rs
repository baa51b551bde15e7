use anyhow::{Context, Result};
use async_nats::Client;
use tracing::{debug, info};

use super::messages::AudioFrameMessage;
use crate::audio::AudioFrame;

/// NATS leg of the capture transport.
///
/// The capture side publishes one `AudioFrameMessage` per frame on
/// `audio.frame.<session>`; this service subscribes and decodes. The
/// publish half exists for the `send` subcommand, which replays a WAV
/// file over the same subject.
pub struct TransportClient {
    client: Client,
    session_id: String,
}

impl TransportClient {
    /// Connect to the NATS server carrying capture frames
    pub async fn connect(url: &str, session_id: String) -> Result<Self> {
        info!("Connecting to capture transport at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to capture transport")?;

        info!("Capture transport connected");

        Ok(Self { client, session_id })
    }

    fn subject(&self) -> String {
        format!("audio.frame.{}", self.session_id)
    }

    /// Subscribe to this session's frame stream
    pub async fn subscribe_frames(&self) -> Result<async_nats::Subscriber> {
        let subject = self.subject();
        info!("Subscribing to frames on {}", subject);

        let subscriber = self.client.subscribe(subject)
            .await
            .context("Failed to subscribe to audio frames")?;

        Ok(subscriber)
    }

    /// Decode one transport message into a frame (plus its final flag)
    pub fn decode_frame(payload: &[u8]) -> Result<(AudioFrame, bool)> {
        let message: AudioFrameMessage =
            serde_json::from_slice(payload).context("Failed to parse audio frame message")?;

        let frame = message.to_frame()?;
        Ok((frame, message.final_frame))
    }

    /// Publish one frame on this session's subject
    pub async fn publish_frame(
        &self,
        frame: &AudioFrame,
        sequence: u32,
        final_frame: bool,
    ) -> Result<()> {
        let subject = self.subject();
        let message = AudioFrameMessage::from_frame(&self.session_id, sequence, frame, final_frame);
        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish audio frame")?;

        debug!(
            "Published frame to {} (seq={}, samples={}, final={})",
            subject,
            sequence,
            frame.samples.len(),
            final_frame
        );

        Ok(())
    }

    /// Flush pending publishes before shutdown
    pub async fn flush(&self) -> Result<()> {
        self.client.flush().await.context("Failed to flush transport")?;
        Ok(())
    }
}
