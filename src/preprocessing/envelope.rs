//! Amplitude envelope downsampling and moving averages
//!
//! The envelope reduces a PCM signal to a low-rate, non-negative activity
//! sequence: the signal is cut into consecutive non-overlapping buckets and
//! each bucket is summarized by its mean absolute amplitude. Bucket `i` covers
//! source samples `[i * bucket_size, (i + 1) * bucket_size)`; a trailing
//! partial bucket is averaged over its actual length.
//!
//! Amplitude envelopes are robust to the very different mixes of a venue
//! recording and a studio master, and shrink correlation cost by the bucket
//! factor.

use crate::error::SyncError;

/// Number of source samples per envelope bucket
///
/// `max(1, sample_rate / max(1, target_rate))`
pub fn bucket_size(sample_rate: u32, target_rate: u32) -> usize {
    ((sample_rate / target_rate.max(1)) as usize).max(1)
}

/// Envelope rate produced by a given bucket size, never below 1 Hz
pub fn envelope_rate(sample_rate: u32, bucket_size: usize) -> u32 {
    (sample_rate / bucket_size.max(1) as u32).max(1)
}

/// Downsample a signal to its mean-absolute-amplitude envelope
///
/// # Arguments
///
/// * `signal` - Mono samples
/// * `sample_rate` - Sample rate in Hz (must be > 0)
/// * `target_rate` - Desired envelope rate in Hz
///
/// # Returns
///
/// `(envelope, envelope_rate)`. When the bucket size works out to 1 the
/// signal is returned unchanged at its original rate.
///
/// # Errors
///
/// Returns `SyncError::InvalidParameter` if `sample_rate` is 0
pub fn envelope_downsample(
    signal: &[f32],
    sample_rate: u32,
    target_rate: u32,
) -> Result<(Vec<f32>, u32), SyncError> {
    if sample_rate == 0 {
        return Err(SyncError::InvalidParameter(
            "sample_rate must be positive".to_string(),
        ));
    }

    let bucket = bucket_size(sample_rate, target_rate);
    let rate = envelope_rate(sample_rate, bucket);

    if bucket == 1 {
        return Ok((signal.to_vec(), rate));
    }

    let envelope: Vec<f32> = signal
        .chunks(bucket)
        .map(|chunk| chunk.iter().map(|x| x.abs()).sum::<f32>() / chunk.len() as f32)
        .collect();

    log::trace!(
        "Envelope: {} samples @ {} Hz -> {} buckets @ {} Hz (bucket={})",
        signal.len(),
        sample_rate,
        envelope.len(),
        rate,
        bucket
    );

    Ok((envelope, rate))
}

/// Trailing moving average
///
/// Element `i` is the mean of the last `window` values ending at `i`. Near
/// the start the window shrinks to the values available instead of padding.
/// A window of 0 or 1 returns a copy of the input.
pub fn moving_average(values: &[f32], window: usize) -> Vec<f32> {
    if window <= 1 || values.is_empty() {
        return values.to_vec();
    }

    let mut result = Vec::with_capacity(values.len());
    let mut running = 0.0f64;
    for (i, &value) in values.iter().enumerate() {
        running += value as f64;
        if i >= window {
            running -= values[i - window] as f64;
        }
        let count = window.min(i + 1);
        result.push((running / count as f64) as f32);
    }
    result
}
