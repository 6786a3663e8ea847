//! WAV loading
//!
//! Only 16-bit integer PCM is accepted, which is what the extraction step of
//! the upstream service produces. Samples are scaled by `1 / 32768` and
//! interleaved channels are averaged into mono.

use std::path::Path;

use crate::config::BeatConfig;
use crate::error::SyncError;
use crate::features::onset::beat_markers::detect_beat_markers_with_config;
use crate::preprocessing::channel_mixer::downmix_interleaved;

/// Full-scale value of a 16-bit sample
const I16_SCALE: f32 = 32768.0;

/// Load a WAV file as mono `f32` samples
///
/// # Arguments
///
/// * `path` - Path to a RIFF/WAV file
///
/// # Returns
///
/// `(samples, sample_rate)` with samples roughly in `[-1.0, 1.0)`
///
/// # Errors
///
/// - `SyncError::UnsupportedFormat` for anything but 16-bit integer PCM
/// - `SyncError::InvalidParameter` for a zero channel count
/// - `SyncError::DecodingError` if the file cannot be opened or read
pub fn load_wav_mono(path: impl AsRef<Path>) -> Result<(Vec<f32>, u32), SyncError> {
    let path = path.as_ref();
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(SyncError::UnsupportedFormat(format!(
            "{}: expected 16-bit integer PCM, got {}-bit {:?}",
            path.display(),
            spec.bits_per_sample,
            spec.sample_format
        )));
    }

    let interleaved = reader
        .samples::<i16>()
        .map(|s| s.map(|s| s as f32 / I16_SCALE))
        .collect::<Result<Vec<f32>, _>>()?;

    let mono = downmix_interleaved(&interleaved, spec.channels as usize)?;

    log::debug!(
        "Loaded {}: {} frames, {} channel(s) @ {} Hz",
        path.display(),
        mono.len(),
        spec.channels,
        spec.sample_rate
    );

    Ok((mono, spec.sample_rate))
}

/// Sync offset between two WAV files
///
/// # Arguments
///
/// * `video_path` - Audio extracted from the video clip (the reference)
/// * `master_path` - Master recording (the candidate)
/// * `max_shift_seconds` - Largest absolute lag considered
///
/// # Returns
///
/// Offset in seconds, positive when the master is delayed relative to the video
///
/// # Errors
///
/// Loader errors, or `SyncError::InvalidParameter` if the sample rates differ
pub fn estimate_sync_offset_from_wav_files(
    video_path: impl AsRef<Path>,
    master_path: impl AsRef<Path>,
    max_shift_seconds: f32,
) -> Result<f32, SyncError> {
    let (video, video_rate) = load_wav_mono(video_path)?;
    let (master, master_rate) = load_wav_mono(master_path)?;

    if video_rate != master_rate {
        return Err(SyncError::InvalidParameter(format!(
            "sample rate mismatch: video {} Hz, master {} Hz",
            video_rate, master_rate
        )));
    }

    crate::alignment::estimate_sync_offset(&video, &master, video_rate, max_shift_seconds)
}

/// Beat markers of a WAV file with default spacing and cap
///
/// # Errors
///
/// Loader errors only; detection itself never fails
pub fn detect_beat_markers_from_wav_file(
    path: impl AsRef<Path>,
    target_rate: u32,
) -> Result<Vec<f32>, SyncError> {
    let (samples, sample_rate) = load_wav_mono(path)?;
    let config = BeatConfig {
        target_rate,
        ..BeatConfig::default()
    };
    Ok(detect_beat_markers_with_config(&samples, sample_rate, &config))
}
