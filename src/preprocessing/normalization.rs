//! Zero-mean, unit-energy normalization
//!
//! Correlation scores are only comparable across lags and features when both
//! sequences share a common scale. `normalize` centers a sequence and divides
//! it by its Euclidean norm.
//!
//! # Example
//!
//! ```
//! use liveclip_sync::preprocessing::normalization::normalize;
//!
//! let normalized = normalize(&[1.0, 2.0, 3.0]);
//! let energy: f32 = normalized.iter().map(|x| x * x).sum();
//! assert!((energy - 1.0).abs() < 1e-5);
//! ```

/// Norms at or below this are treated as silence and left unscaled
pub const NORM_EPSILON: f64 = 1e-9;

/// Normalize a sequence to zero mean and unit Euclidean norm
///
/// # Arguments
///
/// * `values` - Sequence to normalize
///
/// # Returns
///
/// A sequence of the same length. Empty input is returned as-is. When the
/// centered norm is at or below [`NORM_EPSILON`] (constant or silent input)
/// the centered sequence is returned without rescaling.
pub fn normalize(values: &[f32]) -> Vec<f32> {
    if values.is_empty() {
        return Vec::new();
    }

    let mean = values.iter().map(|&x| x as f64).sum::<f64>() / values.len() as f64;
    let centered: Vec<f64> = values.iter().map(|&x| x as f64 - mean).collect();
    let energy = centered.iter().map(|x| x * x).sum::<f64>().sqrt();

    if energy <= NORM_EPSILON {
        log::trace!("Normalization skipped rescale: energy={:.3e}", energy);
        return centered.into_iter().map(|x| x as f32).collect();
    }

    centered.into_iter().map(|x| (x / energy) as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(values: &[f32]) -> f32 {
        values.iter().map(|x| x * x).sum()
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_normalize_constant_is_zero() {
        let normalized = normalize(&[0.7f32; 64]);
        assert_eq!(normalized.len(), 64);
        assert!(normalized.iter().all(|x| x.abs() < 1e-6));
    }

    #[test]
    fn test_normalize_zero_mean_has_unit_energy() {
        let values: Vec<f32> = (0..200).map(|i| (i as f32 * 0.3).sin()).collect();
        let normalized = normalize(&values);
        assert!((energy(&normalized) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_removes_mean() {
        let values: Vec<f32> = (0..100).map(|i| 5.0 + (i % 7) as f32).collect();
        let normalized = normalize(&values);
        let mean: f32 = normalized.iter().sum::<f32>() / normalized.len() as f32;
        assert!(mean.abs() < 1e-5);
        assert!((energy(&normalized) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_preserves_shape() {
        let normalized = normalize(&[0.0, 1.0, 0.0, 1.0]);
        assert!(normalized[1] > normalized[0]);
        assert!((normalized[0] - normalized[2]).abs() < 1e-6);
    }
}
