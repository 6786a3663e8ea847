//! Coarse lag search
//!
//! Scans the whole `[-max_shift, +max_shift]` window on low-rate envelopes and
//! keeps a handful of plausible regions for the fine stage. Amplitude and vocal
//! features are searched independently and their peaks pooled, then the pool
//! is sorted, merged by proximity and pruned. The end anchor, when present, is
//! always part of the result.

use super::ranking::dedupe_by_lag;
use super::result::CoarseLag;
use super::FeatureEnvelopes;
use crate::config::{seconds_to_samples, SyncConfig};
use crate::features::correlation::dot_product_score;
use crate::features::peak_picking::{rank_order, select_lag_peaks};
use crate::preprocessing::normalization::normalize;

/// Coarse candidates for the given envelopes
///
/// # Arguments
///
/// * `envelopes` - Coarse-rate amplitude and vocal envelopes of both tracks
/// * `max_shift_seconds` - Largest absolute lag considered
/// * `limit` - Number of final candidates the caller wants
/// * `anchor_seconds` - End-anchor lag, already checked against `max_shift_seconds`
/// * `config` - Alignment configuration
pub(crate) fn coarse_candidates(
    envelopes: &FeatureEnvelopes,
    max_shift_seconds: f32,
    limit: usize,
    anchor_seconds: Option<f32>,
    config: &SyncConfig,
) -> Vec<CoarseLag> {
    let rate = envelopes.rate;
    let max_shift = (max_shift_seconds * rate as f32) as i64;
    let peak_count = config.min_coarse_peaks.max(limit.saturating_add(2));
    let min_distance = seconds_to_samples(config.coarse_peak_separation_seconds, rate);

    let ref_amp = normalize(&envelopes.ref_amp);
    let cand_amp = normalize(&envelopes.cand_amp);
    let ref_vocal = normalize(&envelopes.ref_vocal);
    let cand_vocal = normalize(&envelopes.cand_vocal);

    log::debug!(
        "Coarse search: {} / {} envelope samples @ {} Hz, lags [{}, {}], {} peaks per feature",
        ref_amp.len(),
        cand_amp.len(),
        rate,
        -max_shift,
        max_shift,
        peak_count
    );

    let amp_peaks = select_lag_peaks(
        &ref_amp,
        &cand_amp,
        rate,
        -max_shift,
        max_shift,
        peak_count,
        min_distance,
    );
    let vocal_peaks = select_lag_peaks(
        &ref_vocal,
        &cand_vocal,
        rate,
        -max_shift,
        max_shift,
        peak_count,
        min_distance,
    );

    let mut pool: Vec<CoarseLag> = amp_peaks
        .iter()
        .chain(vocal_peaks.iter())
        .map(|peak| CoarseLag {
            lag: peak.lag,
            score: peak.score,
            injected: false,
        })
        .collect();

    let anchor = anchor_seconds.map(|seconds| {
        let lag = (seconds * rate as f32).round() as i64;
        let score = [
            dot_product_score(&ref_amp, &cand_amp, lag, rate),
            dot_product_score(&ref_vocal, &cand_vocal, lag, rate),
        ]
        .into_iter()
        .flatten()
        .map(|s| s.score)
        .reduce(f32::max)
        .unwrap_or(0.0);
        CoarseLag {
            lag,
            score,
            injected: true,
        }
    });
    pool.extend(anchor);

    pool.sort_by(|a, b| rank_order(a.score, a.lag, b.score, b.lag));
    let mut kept = dedupe_by_lag(pool, config.coarse_dedupe_seconds, rate, |c| c.lag);
    kept.truncate(peak_count);

    if let Some(anchor) = anchor {
        if !kept.iter().any(|c| c.injected) {
            log::debug!("Re-adding end anchor at coarse lag {}", anchor.lag);
            kept.push(anchor);
        }
    }

    log::debug!(
        "Coarse stage kept {} candidates: {:?}",
        kept.len(),
        kept.iter()
            .map(|c| c.lag as f32 / rate as f32)
            .collect::<Vec<_>>()
    );

    kept
}
