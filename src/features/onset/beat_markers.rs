//! Beat marker detection from envelope flux
//!
//! Finds rhythmic attack points where signal energy rises sharply above a
//! locally adaptive floor.
//!
//! Algorithm:
//! 1. Downsample the signal to an amplitude envelope (~120 Hz)
//! 2. Fast and slow trailing moving averages of the envelope
//! 3. Flux: `flux[n] = max(0, fast[n] - slow[n])`
//! 4. Threshold: `max(global_floor_ratio * max(flux), multiplier * local_floor[n])`
//!    where `local_floor` is a longer moving average of the flux
//! 5. Peak-pick local maxima above the threshold with enforced minimum spacing
//!
//! # Example
//!
//! ```no_run
//! use liveclip_sync::detect_beat_markers;
//!
//! let samples = vec![0.0f32; 44100 * 30]; // 30 seconds of audio
//! let markers = detect_beat_markers(&samples, 44100, 120, 0.22, 2000);
//! println!("Found {} beat markers", markers.len());
//! ```

use crate::config::{seconds_to_samples, BeatConfig};
use crate::preprocessing::envelope::{envelope_downsample, moving_average};

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Detect beat markers with default windows and thresholds
///
/// # Arguments
///
/// * `signal` - Mono samples
/// * `sample_rate` - Sample rate in Hz
/// * `target_rate` - Envelope rate in Hz (typically 120)
/// * `min_spacing_seconds` - Minimum spacing between markers (typically 0.22)
/// * `max_markers` - Cap on the number of markers (typically 2000)
///
/// # Returns
///
/// Strictly increasing marker times in seconds. Empty for a zero sample rate
/// or empty signal.
pub fn detect_beat_markers(
    signal: &[f32],
    sample_rate: u32,
    target_rate: u32,
    min_spacing_seconds: f32,
    max_markers: usize,
) -> Vec<f32> {
    let config = BeatConfig {
        target_rate,
        min_spacing_seconds,
        max_markers,
        ..BeatConfig::default()
    };
    detect_beat_markers_with_config(signal, sample_rate, &config)
}

/// Detect beat markers with an explicit configuration
pub fn detect_beat_markers_with_config(
    signal: &[f32],
    sample_rate: u32,
    config: &BeatConfig,
) -> Vec<f32> {
    if sample_rate == 0 || signal.is_empty() || config.max_markers == 0 {
        return Vec::new();
    }

    let (envelope, rate) = match envelope_downsample(signal, sample_rate, config.target_rate) {
        Ok(reduced) => reduced,
        Err(e) => {
            log::warn!("Envelope downsampling failed: {}", e);
            return Vec::new();
        }
    };

    if envelope.is_empty() {
        return Vec::new();
    }

    log::debug!(
        "Detecting beat markers: {} samples @ {} Hz -> {} envelope samples @ {} Hz",
        signal.len(),
        sample_rate,
        envelope.len(),
        rate
    );

    let flux = envelope_flux(&envelope, rate, config);
    let local_floor = moving_average(
        &flux,
        seconds_to_samples(config.local_floor_window_seconds, rate),
    );
    let max_flux = flux.iter().copied().fold(0.0f32, f32::max);
    if max_flux <= EPSILON {
        log::debug!("Envelope flux is flat, no beat markers detected");
        return Vec::new();
    }

    let global_floor = max_flux * config.global_floor_ratio;
    let min_spacing = seconds_to_samples(config.min_spacing_seconds, rate);

    log::debug!(
        "Beat flux: max={:.6}, global floor={:.6}, min spacing={} samples",
        max_flux,
        global_floor,
        min_spacing
    );

    let picks = pick_spaced_peaks(
        &flux,
        &local_floor,
        global_floor,
        config.local_floor_multiplier,
        min_spacing,
        config.max_markers,
    );

    log::debug!("Detected {} beat markers", picks.len());

    picks.into_iter().map(|i| i as f32 / rate as f32).collect()
}

/// Positive difference between fast and slow moving averages
fn envelope_flux(envelope: &[f32], rate: u32, config: &BeatConfig) -> Vec<f32> {
    let fast = moving_average(envelope, seconds_to_samples(config.fast_window_seconds, rate));
    let slow = moving_average(envelope, seconds_to_samples(config.slow_window_seconds, rate));
    fast.iter()
        .zip(&slow)
        .map(|(&f, &s)| (f - s).max(0.0))
        .collect()
}

/// Local maxima above the adaptive threshold, at least `min_spacing` apart
///
/// A peak closer than `min_spacing` to the last accepted one replaces it only
/// if its flux is strictly higher.
fn pick_spaced_peaks(
    flux: &[f32],
    local_floor: &[f32],
    global_floor: f32,
    multiplier: f32,
    min_spacing: usize,
    max_markers: usize,
) -> Vec<usize> {
    let mut picks: Vec<usize> = Vec::new();
    if flux.len() < 3 {
        return picks;
    }

    for i in 1..flux.len() - 1 {
        let value = flux[i];
        let threshold = global_floor.max(local_floor[i] * multiplier);
        if value < threshold {
            continue;
        }
        if value < flux[i - 1] || value < flux[i + 1] {
            continue;
        }

        match picks.last_mut() {
            Some(last) if i - *last < min_spacing => {
                if value > flux[*last] {
                    *last = i;
                }
            }
            _ => {
                picks.push(i);
                if picks.len() >= max_markers {
                    break;
                }
            }
        }
    }

    picks
}
