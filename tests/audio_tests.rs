// Tests for audio analysis, format conversion, and WAV I/O

use anyhow::Result;
use tempfile::TempDir;
use voice_search::audio::{analyze, encode_wav, AudioFile, AudioFrame};
use voice_search::audio::convert::{downsample, stereo_to_mono, to_target_format};

#[test]
fn analyze_reports_silence_as_zero() {
    let stats = analyze(&vec![0i16; 16000], 16000, 1);

    assert_eq!(stats.rms, 0.0);
    assert_eq!(stats.peak, 0.0);
    assert!((stats.duration_secs - 1.0).abs() < 1e-9);
}

#[test]
fn analyze_reports_level_and_duration() {
    // Half a second of constant amplitude
    let stats = analyze(&vec![16384i16; 8000], 16000, 1);

    assert!((stats.duration_secs - 0.5).abs() < 1e-9);
    assert!((stats.rms - 0.5).abs() < 0.01);
    assert!((stats.peak - 0.5).abs() < 0.01);
}

#[test]
fn voice_gate_rejects_quiet_and_short_audio() {
    let quiet = analyze(&vec![10i16; 16000], 16000, 1);
    assert!(!quiet.is_voice(0.01, 0.5), "Near-silence must not pass");

    let short = analyze(&vec![16384i16; 1600], 16000, 1); // 100ms
    assert!(!short.is_voice(0.01, 0.5), "Too-short audio must not pass");

    let voiced = analyze(&vec![3000i16; 16000], 16000, 1);
    assert!(voiced.is_voice(0.01, 0.5));
}

#[test]
fn voice_gate_accepts_peaky_audio_with_low_rms() {
    // Mostly silence with one loud spike: RMS below the floor, peak well above
    let mut samples = vec![0i16; 16000];
    for s in samples.iter_mut().take(200) {
        *s = 20000;
    }
    let stats = analyze(&samples, 16000, 1);

    assert!(stats.rms < 0.01);
    assert!(stats.is_voice(0.01, 0.5));
}

#[test]
fn stereo_folds_to_mono_by_summing() {
    let frame = AudioFrame {
        samples: vec![100, 200, 150, 250, 175, 275], // 3 sample pairs
        sample_rate: 16000,
        channels: 2,
        timestamp_ms: 0,
    };

    let mono = stereo_to_mono(frame);

    assert_eq!(mono.channels, 1);
    assert_eq!(mono.samples, vec![300, 400, 450]);
}

#[test]
fn stereo_fold_clamps_on_overflow() {
    let frame = AudioFrame {
        samples: vec![i16::MAX, i16::MAX, i16::MIN, i16::MIN],
        sample_rate: 16000,
        channels: 2,
        timestamp_ms: 0,
    };

    let mono = stereo_to_mono(frame);

    assert_eq!(mono.samples, vec![i16::MAX, i16::MIN]);
}

#[test]
fn downsample_decimates_to_the_target_rate() {
    let frame = AudioFrame {
        samples: (0..4800).map(|i| i as i16).collect(), // 100ms at 48kHz
        sample_rate: 48000,
        channels: 1,
        timestamp_ms: 0,
    };

    let out = downsample(frame, 16000);

    assert_eq!(out.sample_rate, 16000);
    assert_eq!(out.samples.len(), 1600);
    // Every third sample survives
    assert_eq!(&out.samples[..4], &[0, 3, 6, 9]);
}

#[test]
fn downsample_never_upsamples() {
    let frame = AudioFrame {
        samples: vec![1i16; 800],
        sample_rate: 8000,
        channels: 1,
        timestamp_ms: 0,
    };

    let out = downsample(frame, 16000);
    assert_eq!(out.sample_rate, 8000);
    assert_eq!(out.samples.len(), 800);
}

#[test]
fn target_format_conversion_handles_live_capture_format() {
    // 100ms of 48kHz stereo, as a browser capture source delivers it
    let frame = AudioFrame {
        samples: vec![1000i16; 9600],
        sample_rate: 48000,
        channels: 2,
        timestamp_ms: 0,
    };

    let out = to_target_format(frame, 16000, 1);

    assert_eq!(out.sample_rate, 16000);
    assert_eq!(out.channels, 1);
    assert_eq!(out.samples.len(), 1600);
}

#[test]
fn frame_duration_follows_format() {
    let frame = AudioFrame {
        samples: vec![0i16; 9600],
        sample_rate: 48000,
        channels: 2,
        timestamp_ms: 0,
    };
    assert_eq!(frame.duration_ms(), 100);
}

#[test]
fn encode_wav_round_trips_through_hound() -> Result<()> {
    let samples: Vec<i16> = (0..1600).map(|i| (i % 256) as i16).collect();
    let bytes = encode_wav(&samples, 16000, 1)?;

    let reader = hound::WavReader::new(std::io::Cursor::new(bytes))?;
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);

    let decoded: Vec<i16> = reader.into_samples::<i16>().collect::<Result<_, _>>()?;
    assert_eq!(decoded, samples);

    Ok(())
}

fn write_test_wav(dir: &TempDir, name: &str, samples: &[i16], sample_rate: u32) -> Result<std::path::PathBuf> {
    let path = dir.path().join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec)?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(path)
}

#[test]
fn audio_file_open_reads_format_and_samples() -> Result<()> {
    let dir = TempDir::new()?;
    let samples = vec![500i16; 32000]; // 2s at 16kHz
    let path = write_test_wav(&dir, "sample.wav", &samples, 16000)?;

    let audio = AudioFile::open(&path)?;

    assert_eq!(audio.sample_rate, 16000);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.samples.len(), 32000);
    assert!((audio.duration_seconds - 2.0).abs() < 1e-9);
    assert!(audio.path.contains("sample.wav"));

    Ok(())
}

#[test]
fn audio_file_open_nonexistent_fails() {
    let result = AudioFile::open("/nonexistent/path/to/audio.wav");
    assert!(result.is_err());
}

#[test]
fn into_frames_slices_with_timestamps() -> Result<()> {
    let dir = TempDir::new()?;
    let samples = vec![500i16; 8000]; // 0.5s at 16kHz
    let path = write_test_wav(&dir, "short.wav", &samples, 16000)?;

    let frames = AudioFile::open(&path)?.into_frames(100);

    assert_eq!(frames.len(), 5);
    assert_eq!(frames[0].samples.len(), 1600);
    assert_eq!(frames[0].timestamp_ms, 0);
    assert_eq!(frames[4].timestamp_ms, 400);

    let total: usize = frames.iter().map(|f| f.samples.len()).sum();
    assert_eq!(total, 8000);

    Ok(())
}
