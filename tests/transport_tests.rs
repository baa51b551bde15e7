// Tests for the capture transport wire format (no NATS server required)

use anyhow::Result;
use voice_search::audio::AudioFrame;
use voice_search::transport::{AudioFrameMessage, TransportClient};

fn frame() -> AudioFrame {
    AudioFrame {
        samples: vec![-32768, -1, 0, 1, 32767, 12345],
        sample_rate: 16000,
        channels: 1,
        timestamp_ms: 1500,
    }
}

#[test]
fn frame_message_round_trips_pcm() -> Result<()> {
    let original = frame();
    let message = AudioFrameMessage::from_frame("session-a", 7, &original, false);

    assert_eq!(message.session_id, "session-a");
    assert_eq!(message.sequence, 7);
    assert!(!message.final_frame);

    let decoded = message.to_frame()?;
    assert_eq!(decoded.samples, original.samples);
    assert_eq!(decoded.sample_rate, 16000);
    assert_eq!(decoded.channels, 1);
    assert_eq!(decoded.timestamp_ms, 1500);

    Ok(())
}

#[test]
fn frame_message_serializes_final_flag_by_wire_name() -> Result<()> {
    let message = AudioFrameMessage::from_frame("session-a", 0, &frame(), true);
    let json = serde_json::to_value(&message)?;

    assert_eq!(json["final"], serde_json::Value::Bool(true));
    assert!(json.get("final_frame").is_none());

    Ok(())
}

#[test]
fn decode_frame_parses_a_wire_payload() -> Result<()> {
    let message = AudioFrameMessage::from_frame("session-b", 3, &frame(), true);
    let payload = serde_json::to_vec(&message)?;

    let (decoded, final_frame) = TransportClient::decode_frame(&payload)?;

    assert!(final_frame);
    assert_eq!(decoded.samples, frame().samples);

    Ok(())
}

#[test]
fn decode_frame_rejects_garbage() {
    assert!(TransportClient::decode_frame(b"not json").is_err());
}

#[test]
fn decode_frame_rejects_invalid_base64() {
    let mut message = AudioFrameMessage::from_frame("session-c", 0, &frame(), false);
    message.pcm = "!!not-base64!!".to_string();
    let payload = serde_json::to_vec(&message).unwrap();

    assert!(TransportClient::decode_frame(&payload).is_err());
}
