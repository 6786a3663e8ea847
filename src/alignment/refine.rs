//! Fine lag refinement
//!
//! Each coarse lag is mapped onto the fine envelope grid and a window around it
//! is searched for the best amplitude lag and the best vocal lag. Those two
//! lags plus the window center are then scored precisely with the localized
//! NCC of both features, blended into one combined score.

use super::result::{CoarseLag, RefinedLag};
use super::FeatureEnvelopes;
use crate::config::{seconds_to_samples, SyncConfig};
use crate::features::correlation::ncc_score;
use crate::features::peak_picking::select_lag_peaks;
use crate::preprocessing::normalization::normalize;

/// Refine every coarse lag on the fine envelopes
///
/// # Arguments
///
/// * `envelopes` - Fine-rate amplitude and vocal envelopes of both tracks
/// * `coarse` - Coarse stage output
/// * `coarse_rate` - Rate the coarse lags are expressed in
/// * `max_shift_seconds` - Global lag bound; refine windows are clipped to it
/// * `config` - Alignment configuration
///
/// # Returns
///
/// Every scored lag, unsorted and possibly with duplicates across windows
pub(crate) fn refine_candidates(
    envelopes: &FeatureEnvelopes,
    coarse: &[CoarseLag],
    coarse_rate: u32,
    max_shift_seconds: f32,
    config: &SyncConfig,
) -> Vec<RefinedLag> {
    let rate = envelopes.rate;
    let max_shift = (max_shift_seconds * rate as f32) as i64;
    let half_window = (rate as i64).max((rate as f32 * config.refine_window_scale) as i64);
    let min_distance = seconds_to_samples(config.fine_peak_separation_seconds, rate);

    let ref_amp = normalize(&envelopes.ref_amp);
    let cand_amp = normalize(&envelopes.cand_amp);
    let ref_vocal = normalize(&envelopes.ref_vocal);
    let cand_vocal = normalize(&envelopes.cand_vocal);

    let mut refined = Vec::new();
    for coarse_lag in coarse {
        let center = (coarse_lag.lag as f32 / coarse_rate as f32 * rate as f32).round() as i64;
        let center = center.clamp(-max_shift, max_shift);
        let lo = center.saturating_sub(half_window).max(-max_shift);
        let hi = center.saturating_add(half_window).min(max_shift);

        let mut lags = vec![center];
        for (reference, candidate) in [(&ref_amp, &cand_amp), (&ref_vocal, &cand_vocal)] {
            let best = select_lag_peaks(reference, candidate, rate, lo, hi, 1, min_distance);
            lags.extend(best.first().map(|peak| peak.lag));
        }
        lags.sort_unstable();
        lags.dedup();

        log::trace!(
            "Refining coarse lag {} -> window [{}, {}], scoring {:?}",
            coarse_lag.lag,
            lo,
            hi,
            lags
        );

        refined.extend(
            lags.into_iter()
                .filter_map(|lag| score_lag(envelopes, lag, coarse_lag.injected, config)),
        );
    }

    log::debug!(
        "Fine stage scored {} lags from {} coarse candidates @ {} Hz",
        refined.len(),
        coarse.len(),
        rate
    );

    refined
}

/// Combined NCC score of one fine lag, `None` if neither feature can be scored
fn score_lag(
    envelopes: &FeatureEnvelopes,
    lag: i64,
    injected: bool,
    config: &SyncConfig,
) -> Option<RefinedLag> {
    let rate = envelopes.rate;
    let amp = ncc_score(&envelopes.ref_amp, &envelopes.cand_amp, lag, rate);
    let vocal = ncc_score(&envelopes.ref_vocal, &envelopes.cand_vocal, lag, rate);

    let overlap = match (amp, vocal) {
        (None, None) => return None,
        (Some(a), Some(v)) => a.overlap.max(v.overlap),
        (Some(s), None) | (None, Some(s)) => s.overlap,
    };

    let amp_score = amp.map_or(0.0, |s| s.score);
    let vocal_score = vocal.map_or(0.0, |s| s.score);

    Some(RefinedLag {
        lag,
        score: config.amplitude_weight * amp_score + config.vocal_weight * vocal_score,
        amp_score,
        vocal_score,
        overlap,
        injected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(len: usize, seed: u32) -> Vec<f32> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                ((state >> 16) % 1000) as f32 / 1000.0
            })
            .collect()
    }

    fn shifted_envelopes(len: usize, shift: usize, rate: u32) -> FeatureEnvelopes {
        let reference = noise(len, 7);
        let mut candidate = noise(shift, 99);
        candidate.extend_from_slice(&reference);
        FeatureEnvelopes {
            rate,
            ref_vocal: reference.clone(),
            cand_vocal: candidate.clone(),
            ref_amp: reference,
            cand_amp: candidate,
        }
    }

    #[test]
    fn test_refine_recovers_exact_lag_near_coarse_guess() {
        let env = shifted_envelopes(600, 137, 90);
        // Coarse lag 34 at 24 Hz lands around fine lag 128, inside the window
        let coarse = [CoarseLag {
            lag: 34,
            score: 0.5,
            injected: false,
        }];
        let refined = refine_candidates(&env, &coarse, 24, 5.0, &SyncConfig::default());

        let best = refined
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .unwrap();
        assert_eq!(best.lag, 137);
        assert!((best.score - 1.0).abs() < 1e-4);
        assert!((best.amp_score - 1.0).abs() < 1e-4);
        assert!((best.vocal_score - 1.0).abs() < 1e-4);
        assert_eq!(best.overlap, 600);
    }

    #[test]
    fn test_refine_keeps_center_and_injected_flag() {
        let env = shifted_envelopes(400, 50, 90);
        let coarse = [CoarseLag {
            lag: 4,
            score: 0.1,
            injected: true,
        }];
        let refined = refine_candidates(&env, &coarse, 24, 5.0, &SyncConfig::default());

        assert!(refined.iter().any(|r| r.lag == 15));
        assert!(refined.iter().all(|r| r.injected));
    }

    #[test]
    fn test_refine_window_clipped_to_max_shift() {
        let env = shifted_envelopes(400, 200, 90);
        let coarse = [CoarseLag {
            lag: 48,
            score: 0.1,
            injected: false,
        }];
        // 1 s bound = 90 fine samples, well short of the true 200
        let refined = refine_candidates(&env, &coarse, 24, 1.0, &SyncConfig::default());
        assert!(!refined.is_empty());
        assert!(refined.iter().all(|r| r.lag.abs() <= 90));
    }

    #[test]
    fn test_refine_unbounded_shift() {
        let env = shifted_envelopes(300, 40, 90);
        let coarse = [CoarseLag {
            lag: 11,
            score: 0.3,
            injected: false,
        }];
        let refined = refine_candidates(&env, &coarse, 24, f32::INFINITY, &SyncConfig::default());
        let best = refined
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .unwrap();
        assert_eq!(best.lag, 40);
    }

    #[test]
    fn test_score_lag_weights_features() {
        let mut env = shifted_envelopes(300, 0, 90);
        env.cand_vocal = vec![0.0; 300];
        let scored = score_lag(&env, 0, false, &SyncConfig::default()).unwrap();
        assert!((scored.amp_score - 1.0).abs() < 1e-5);
        assert_eq!(scored.vocal_score, 0.0);
        assert!((scored.score - 0.45).abs() < 1e-5);
    }

    #[test]
    fn test_score_lag_without_overlap_is_none() {
        let env = shifted_envelopes(30, 0, 90);
        assert!(score_lag(&env, 25, false, &SyncConfig::default()).is_none());
    }
}
