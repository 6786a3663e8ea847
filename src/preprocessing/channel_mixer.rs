//! Channel mixing utilities (multi-channel to mono conversion)

use crate::error::SyncError;

/// Average interleaved multi-channel frames down to mono
///
/// # Arguments
///
/// * `samples` - Interleaved samples (`[L0, R0, L1, R1, ...]` for stereo)
/// * `channels` - Number of interleaved channels
///
/// # Returns
///
/// One sample per frame, the mean of that frame's channel values. A trailing
/// incomplete frame is averaged over the channels it has.
///
/// # Errors
///
/// Returns `SyncError::InvalidParameter` if `channels` is 0
pub fn downmix_interleaved(samples: &[f32], channels: usize) -> Result<Vec<f32>, SyncError> {
    if channels == 0 {
        return Err(SyncError::InvalidParameter(
            "Invalid channel count: 0".to_string(),
        ));
    }

    if channels == 1 {
        return Ok(samples.to_vec());
    }

    log::debug!(
        "Downmixing {} interleaved samples from {} channels",
        samples.len(),
        channels
    );

    Ok(samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo() {
        let mono = downmix_interleaved(&[1.0, 0.0, 0.5, -0.5, -1.0, -1.0], 2).unwrap();
        assert_eq!(mono, vec![0.5, 0.0, -1.0]);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix_interleaved(&samples, 1).unwrap(), samples);
    }

    #[test]
    fn test_downmix_zero_channels() {
        assert!(downmix_interleaved(&[0.1], 0).is_err());
    }
}
