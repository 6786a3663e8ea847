//! Lag peak selection
//!
//! Scans a lag range, scores every lag with the dot-product scorer and keeps
//! the best lags that are mutually separated by a minimum distance.
//!
//! # Algorithm
//!
//! 1. Score every lag in `[min_lag, max_lag]`, skipping lags with too little overlap
//! 2. Sort by score (highest first); equal scores prefer the smaller absolute lag
//! 3. Greedily accept lags that are at least `min_distance` from every accepted lag
//! 4. Stop after `limit` accepted lags
//!
//! # Example
//!
//! ```
//! use liveclip_sync::features::peak_picking::select_lag_peaks;
//! use liveclip_sync::preprocessing::normalization::normalize;
//!
//! let mut reference = vec![0.0f32; 200];
//! reference[50] = 1.0;
//! reference[120] = 0.5;
//! let mut candidate = vec![0.0f32; 30];
//! candidate.extend_from_slice(&reference);
//!
//! let peaks = select_lag_peaks(&normalize(&reference), &normalize(&candidate), 50, -40, 40, 2, 5);
//! assert_eq!(peaks[0].lag, 30);
//! ```

use std::cmp::Ordering;

use super::correlation::{dot_product_score, min_overlap};

const EPSILON: f32 = 1e-9;

/// One selected lag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagPeak {
    /// Lag in samples at the scanned rate
    pub lag: i64,

    /// Dot-product score
    pub score: f32,

    /// Overlap the score was computed over
    pub overlap: usize,

    /// Score relative to the best accepted peak (best = 1.0)
    pub score_ratio: f32,
}

/// Ratio of `score` to `best`, or 0 when `best` is effectively zero
pub(crate) fn score_ratio(score: f32, best: f32) -> f32 {
    if best.abs() <= EPSILON {
        0.0
    } else {
        score / best
    }
}

/// Descending by score, then ascending by absolute lag, then by lag
pub(crate) fn rank_order(a_score: f32, a_lag: i64, b_score: f32, b_lag: i64) -> Ordering {
    b_score
        .total_cmp(&a_score)
        .then(a_lag.unsigned_abs().cmp(&b_lag.unsigned_abs()))
        .then(a_lag.cmp(&b_lag))
}

/// Select the top lags of a correlation scan
///
/// # Arguments
///
/// * `reference` - Normalized reference sequence
/// * `candidate` - Normalized candidate sequence
/// * `rate` - Sequence rate in Hz
/// * `min_lag` - First lag to scan (inclusive)
/// * `max_lag` - Last lag to scan (inclusive)
/// * `limit` - Maximum number of peaks to return
/// * `min_distance` - Minimum separation between returned lags, in samples
///
/// # Returns
///
/// Up to `limit` peaks ordered by descending score
pub fn select_lag_peaks(
    reference: &[f32],
    candidate: &[f32],
    rate: u32,
    min_lag: i64,
    max_lag: i64,
    limit: usize,
    min_distance: usize,
) -> Vec<LagPeak> {
    // Lags past these bounds cannot leave min_overlap samples to score
    let required = min_overlap(rate) as i64;
    let first = min_lag.max(required - reference.len() as i64);
    let last = max_lag.min(candidate.len() as i64 - required);
    if limit == 0 || first > last {
        return vec![];
    }

    let mut scored: Vec<LagPeak> = (first..=last)
        .filter_map(|lag| {
            dot_product_score(reference, candidate, lag, rate).map(|s| LagPeak {
                lag,
                score: s.score,
                overlap: s.overlap,
                score_ratio: 0.0,
            })
        })
        .collect();

    if scored.is_empty() {
        log::debug!(
            "No lag in [{}, {}] has enough overlap at {} Hz",
            min_lag,
            max_lag,
            rate
        );
        return vec![];
    }

    scored.sort_by(|a, b| rank_order(a.score, a.lag, b.score, b.lag));

    let mut accepted: Vec<LagPeak> = Vec::with_capacity(limit.min(scored.len()));
    for peak in scored {
        let too_close = accepted
            .iter()
            .any(|kept| kept.lag.abs_diff(peak.lag) < min_distance as u64);
        if too_close {
            continue;
        }
        accepted.push(peak);
        if accepted.len() >= limit {
            break;
        }
    }

    let best = accepted[0].score;
    for peak in &mut accepted {
        peak.score_ratio = score_ratio(peak.score, best);
    }

    log::trace!(
        "Selected {} lag peaks in [{}, {}] (best lag={}, score={:.4})",
        accepted.len(),
        min_lag,
        max_lag,
        accepted[0].lag,
        best
    );

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::normalization::normalize;

    /// Deterministic noise so no lag other than the true one lines up
    fn pattern(len: usize) -> Vec<f32> {
        let mut state = 12345u32;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                ((state >> 16) % 1000) as f32 / 1000.0
            })
            .collect()
    }

    fn delayed(signal: &[f32], delay: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; delay];
        out.extend_from_slice(&signal[..signal.len() - delay]);
        out
    }

    #[test]
    fn test_select_finds_delay() {
        let reference = pattern(300);
        let candidate = delayed(&reference, 12);
        let peaks = select_lag_peaks(
            &normalize(&reference),
            &normalize(&candidate),
            50,
            -30,
            30,
            3,
            4,
        );
        assert_eq!(peaks[0].lag, 12);
        assert!((peaks[0].score_ratio - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_select_enforces_min_distance() {
        let reference = pattern(300);
        let candidate = delayed(&reference, 12);
        let peaks = select_lag_peaks(
            &normalize(&reference),
            &normalize(&candidate),
            50,
            -30,
            30,
            5,
            6,
        );
        for (i, a) in peaks.iter().enumerate() {
            for b in peaks.iter().skip(i + 1) {
                assert!(a.lag.abs_diff(b.lag) >= 6, "{:?} too close to {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_select_sorted_by_score() {
        let reference = pattern(200);
        let candidate = delayed(&reference, 5);
        let peaks = select_lag_peaks(
            &normalize(&reference),
            &normalize(&candidate),
            50,
            -20,
            20,
            4,
            2,
        );
        assert_eq!(peaks.len(), 4);
        for pair in peaks.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_select_respects_limit_and_range() {
        let reference = pattern(100);
        let peaks = select_lag_peaks(&reference, &reference, 50, 3, 3, 10, 1);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].lag, 3);

        assert!(select_lag_peaks(&reference, &reference, 50, 4, 3, 10, 1).is_empty());
        assert!(select_lag_peaks(&reference, &reference, 50, -3, 3, 0, 1).is_empty());
    }

    #[test]
    fn test_select_skips_insufficient_overlap() {
        let reference = pattern(12);
        // min_overlap(50) = 10, so only |lag| <= 2 qualifies
        let peaks = select_lag_peaks(&reference, &reference, 50, -20, 20, 100, 1);
        assert_eq!(peaks.len(), 5);
        assert!(peaks.iter().all(|p| p.lag.abs() <= 2));
    }

    #[test]
    fn test_select_unbounded_range_and_limit() {
        let reference = pattern(200);
        let candidate = delayed(&reference, 7);
        let peaks = select_lag_peaks(
            &normalize(&reference),
            &normalize(&candidate),
            50,
            i64::MIN,
            i64::MAX,
            usize::MAX,
            3,
        );
        assert_eq!(peaks[0].lag, 7);
        // min_overlap(50) = 10 bounds the scan to [-190, 190]
        assert!(peaks.iter().all(|p| p.lag >= -190 && p.lag <= 190));
    }

    #[test]
    fn test_select_silent_prefers_zero_lag() {
        let silent = vec![0.0f32; 100];
        let peaks = select_lag_peaks(&silent, &silent, 50, -10, 10, 1, 1);
        assert_eq!(peaks[0].lag, 0);
        assert_eq!(peaks[0].score_ratio, 0.0);
    }
}
