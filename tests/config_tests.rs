// Tests for configuration loading and defaults

use anyhow::Result;
use std::fs;
use tempfile::TempDir;
use voice_search::Config;

const MINIMAL_CONFIG: &str = r#"
[service]
name = "voice-search-test"

[service.http]
bind = "127.0.0.1"
port = 8090

[search]
base_url = "https://example.test"
database = "DB"
schema = "PUBLIC"
service = "docs"
"#;

fn write_config(dir: &TempDir, contents: &str) -> Result<String> {
    let path = dir.path().join("voice-search.toml");
    fs::write(&path, contents)?;
    Ok(path.with_extension("").to_string_lossy().into_owned())
}

#[test]
fn minimal_config_gets_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(&dir, MINIMAL_CONFIG)?;

    let cfg = Config::load(&path)?;

    assert_eq!(cfg.service.name, "voice-search-test");
    assert_eq!(cfg.service.http.port, 8090);

    // Omitted sections fall back to defaults
    assert_eq!(cfg.audio.chunk_duration_secs, 3);
    assert_eq!(cfg.audio.sample_rate, 16000);
    assert_eq!(cfg.audio.channels, 1);
    assert_eq!(cfg.whisper.model_size, "base");
    assert!(cfg.whisper.language.is_none());
    assert_eq!(cfg.search.chunk_limit, 2);
    assert!(cfg.search.auto_search);
    assert_eq!(cfg.transport.nats_url, "nats://localhost:4222");

    Ok(())
}

#[test]
fn explicit_values_override_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[service]
name = "tuned"

[service.http]
bind = "0.0.0.0"
port = 9000

[audio]
chunk_duration_secs = 5
silence_rms = 0.02

[whisper]
endpoint = "http://stt.internal/v1/audio/transcriptions"
model_size = "small"
language = "en"

[search]
base_url = "https://example.test"
database = "DB"
schema = "PUBLIC"
service = "docs"
chunk_limit = 5
auto_search = false
"#,
    )?;

    let cfg = Config::load(&path)?;

    assert_eq!(cfg.audio.chunk_duration_secs, 5);
    assert!((cfg.audio.silence_rms - 0.02).abs() < 1e-6);
    // Unset audio fields still default
    assert_eq!(cfg.audio.min_chunk_ms, 500);

    assert_eq!(cfg.whisper.model_size, "small");
    assert_eq!(cfg.whisper.language.as_deref(), Some("en"));
    assert_eq!(cfg.search.chunk_limit, 5);
    assert!(!cfg.search.auto_search);

    Ok(())
}

#[test]
fn missing_file_fails() {
    assert!(Config::load("/nonexistent/voice-search").is_err());
}
