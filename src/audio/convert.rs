use super::frame::AudioFrame;

/// Convert a frame to the target format: mono fold first, then decimation,
/// so stereo interleaving is never broken by the rate change.
pub fn to_target_format(frame: AudioFrame, target_sample_rate: u32, target_channels: u16) -> AudioFrame {
    let mut processed = frame;

    if processed.channels != target_channels && target_channels == 1 {
        processed = stereo_to_mono(processed);
    }

    if processed.sample_rate != target_sample_rate {
        processed = downsample(processed, target_sample_rate);
    }

    processed
}

/// Downsample by decimation (take every Nth sample).
pub fn downsample(frame: AudioFrame, target_rate: u32) -> AudioFrame {
    if frame.sample_rate == target_rate {
        return frame;
    }

    let ratio = frame.sample_rate / target_rate;
    if ratio <= 1 {
        return frame; // Can't upsample
    }

    let step = ratio as usize * frame.channels as usize;
    let channels = frame.channels as usize;

    // Keep whole interleaved sample groups together
    let mut downsampled = Vec::with_capacity(frame.samples.len() / ratio as usize + channels);
    let mut i = 0;
    while i + channels <= frame.samples.len() {
        downsampled.extend_from_slice(&frame.samples[i..i + channels]);
        i += step;
    }

    AudioFrame {
        samples: downsampled,
        sample_rate: target_rate,
        channels: frame.channels,
        timestamp_ms: frame.timestamp_ms,
    }
}

/// Convert stereo to mono by summing channels
pub fn stereo_to_mono(frame: AudioFrame) -> AudioFrame {
    if frame.channels == 1 {
        return frame;
    }

    if frame.channels != 2 {
        return frame; // Only support stereo -> mono
    }

    let mut mono_samples = Vec::with_capacity(frame.samples.len() / 2);

    // Sum left and right channels (no division to preserve volume)
    for chunk in frame.samples.chunks_exact(2) {
        let left = chunk[0] as i32;
        let right = chunk[1] as i32;
        let sum = left + right;
        let mono = sum.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        mono_samples.push(mono);
    }

    AudioFrame {
        samples: mono_samples,
        sample_rate: frame.sample_rate,
        channels: 1,
        timestamp_ms: frame.timestamp_ms,
    }
}
