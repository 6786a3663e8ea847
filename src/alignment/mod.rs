//! Multi-resolution sync offset estimation
//!
//! The search runs in two passes over feature envelopes:
//!
//! 1. **Coarse** (~24 Hz): amplitude and vocal-emphasis envelopes are
//!    correlated over the whole `[-max_shift, +max_shift]` window and a few
//!    separated peaks are kept, together with the end anchor
//! 2. **Fine** (~90 Hz): every coarse peak is refined inside a small window and
//!    scored with the localized NCC of both features
//!
//! The refined lags are then ranked, deduplicated and truncated to the
//! requested number of candidates.
//!
//! # Example
//!
//! ```no_run
//! use liveclip_sync::estimate_sync_candidates;
//!
//! let reference = vec![0.0f32; 48000 * 10];
//! let candidate = vec![0.0f32; 48000 * 12];
//! let candidates = estimate_sync_candidates(&reference, &candidate, 48000, 8.0, 4)?;
//! for c in &candidates {
//!     println!("{:+.3}s score={:.3} ratio={:.2}", c.lag_seconds, c.score, c.score_ratio);
//! }
//! # Ok::<(), liveclip_sync::SyncError>(())
//! ```

pub mod result;

mod coarse;
mod ranking;
mod refine;

pub use result::SyncCandidate;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::features::vocal::{default_extractor, SpectralFeatureExtractor};
use crate::preprocessing::envelope::envelope_downsample;

/// Full-rate signals of one track: raw PCM and its vocal feature
///
/// The vocal feature is the expensive part, so it is computed once and
/// bucketed separately for every envelope rate.
#[derive(Debug, Clone)]
pub(crate) struct TrackFeatures<'a> {
    pub pcm: &'a [f32],
    pub vocal: Vec<f32>,
}

impl<'a> TrackFeatures<'a> {
    pub(crate) fn extract(
        pcm: &'a [f32],
        sample_rate: u32,
        extractor: &dyn SpectralFeatureExtractor,
    ) -> Result<Self, SyncError> {
        let vocal = extractor.feature(pcm, sample_rate)?;
        Ok(Self { pcm, vocal })
    }
}

/// Amplitude and vocal envelopes of both tracks at one shared rate
#[derive(Debug, Clone)]
pub(crate) struct FeatureEnvelopes {
    pub rate: u32,
    pub ref_amp: Vec<f32>,
    pub cand_amp: Vec<f32>,
    pub ref_vocal: Vec<f32>,
    pub cand_vocal: Vec<f32>,
}

impl FeatureEnvelopes {
    /// Bucket all four full-rate signals to roughly `target_rate`
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidParameter` if `sample_rate` is 0 and
    /// `SyncError::InternalInconsistency` if the envelopes disagree on rate
    pub(crate) fn compute(
        reference: &TrackFeatures<'_>,
        candidate: &TrackFeatures<'_>,
        sample_rate: u32,
        target_rate: u32,
    ) -> Result<Self, SyncError> {
        let (ref_amp, ref_amp_rate) =
            envelope_downsample(reference.pcm, sample_rate, target_rate)?;
        let (cand_amp, cand_amp_rate) =
            envelope_downsample(candidate.pcm, sample_rate, target_rate)?;
        let (ref_vocal, ref_vocal_rate) =
            envelope_downsample(&reference.vocal, sample_rate, target_rate)?;
        let (cand_vocal, cand_vocal_rate) =
            envelope_downsample(&candidate.vocal, sample_rate, target_rate)?;

        let rates = [ref_amp_rate, cand_amp_rate, ref_vocal_rate, cand_vocal_rate];
        if rates.iter().any(|&r| r != ref_amp_rate) {
            return Err(SyncError::InternalInconsistency(format!(
                "envelope rates disagree at target {} Hz: {:?}",
                target_rate, rates
            )));
        }

        Ok(Self {
            rate: ref_amp_rate,
            ref_amp,
            cand_amp,
            ref_vocal,
            cand_vocal,
        })
    }
}

/// End-anchor lag in seconds, when the candidate outlasts the reference
/// and the duration difference fits inside the search window
fn end_anchor(
    reference_len: usize,
    candidate_len: usize,
    sample_rate: u32,
    max_shift_seconds: f32,
) -> Option<f32> {
    if candidate_len <= reference_len {
        return None;
    }
    let anchor = (candidate_len - reference_len) as f32 / sample_rate as f32;
    (anchor <= max_shift_seconds).then_some(anchor)
}

/// Ranked sync candidates using an explicit configuration
///
/// # Arguments
///
/// * `reference` - Mono reference track (typically the camera audio)
/// * `candidate` - Mono candidate track (typically the master recording)
/// * `sample_rate` - Sample rate shared by both tracks, in Hz
/// * `max_shift_seconds` - Largest absolute lag considered (negative values count as 0)
/// * `limit` - Maximum number of candidates returned
/// * `config` - Alignment configuration
///
/// # Returns
///
/// Candidates sorted by descending combined score. Empty when `limit` is 0 or
/// when no lag leaves enough overlap to be scored.
///
/// # Errors
///
/// Returns `SyncError::InvalidParameter` if `sample_rate` is 0
pub fn estimate_sync_candidates_with_config(
    reference: &[f32],
    candidate: &[f32],
    sample_rate: u32,
    max_shift_seconds: f32,
    limit: usize,
    config: &SyncConfig,
) -> Result<Vec<SyncCandidate>, SyncError> {
    if sample_rate == 0 {
        return Err(SyncError::InvalidParameter(
            "sample_rate must be positive".to_string(),
        ));
    }
    if limit == 0 {
        return Ok(Vec::new());
    }

    let max_shift_seconds = max_shift_seconds.max(0.0);
    let anchor = end_anchor(reference.len(), candidate.len(), sample_rate, max_shift_seconds);
    let extractor = default_extractor(&config.vocal);

    log::debug!(
        "Estimating sync: reference {:.2}s, candidate {:.2}s @ {} Hz, \
         max shift {:.2}s, limit {}, vocal feature '{}'",
        reference.len() as f32 / sample_rate as f32,
        candidate.len() as f32 / sample_rate as f32,
        sample_rate,
        max_shift_seconds,
        limit,
        extractor.name()
    );
    if let Some(anchor) = anchor {
        log::debug!("End anchor at {:.3}s", anchor);
    }

    let ref_track = TrackFeatures::extract(reference, sample_rate, extractor.as_ref())?;
    let cand_track = TrackFeatures::extract(candidate, sample_rate, extractor.as_ref())?;

    let coarse_env =
        FeatureEnvelopes::compute(&ref_track, &cand_track, sample_rate, config.coarse_rate)?;
    let coarse = coarse::coarse_candidates(&coarse_env, max_shift_seconds, limit, anchor, config);
    if coarse.is_empty() {
        log::debug!("No coarse candidates, inputs too short for the overlap requirement");
        return Ok(Vec::new());
    }

    let fine_env =
        FeatureEnvelopes::compute(&ref_track, &cand_track, sample_rate, config.fine_rate)?;
    let refined =
        refine::refine_candidates(&fine_env, &coarse, coarse_env.rate, max_shift_seconds, config);

    let ranked = ranking::rank_refined(refined, fine_env.rate, limit, anchor, config);

    if let Some(best) = ranked.first() {
        log::debug!(
            "Best lag {:+.3}s (score {:.4}, amp {:.4}, vocal {:.4}) out of {} candidates",
            best.lag_seconds,
            best.score,
            best.amp_score,
            best.vocal_score,
            ranked.len()
        );
    }

    Ok(ranked)
}

/// Ranked sync candidates with the default configuration
///
/// See [`estimate_sync_candidates_with_config`].
///
/// # Errors
///
/// Returns `SyncError::InvalidParameter` if `sample_rate` is 0
pub fn estimate_sync_candidates(
    reference: &[f32],
    candidate: &[f32],
    sample_rate: u32,
    max_shift_seconds: f32,
    limit: usize,
) -> Result<Vec<SyncCandidate>, SyncError> {
    estimate_sync_candidates_with_config(
        reference,
        candidate,
        sample_rate,
        max_shift_seconds,
        limit,
        &SyncConfig::default(),
    )
}

/// Best sync offset in seconds, 0.0 when nothing could be scored
///
/// A positive offset means the candidate is delayed relative to the reference.
///
/// # Errors
///
/// Returns `SyncError::InvalidParameter` if `sample_rate` is 0
///
/// # Example
///
/// ```
/// use liveclip_sync::estimate_sync_offset;
///
/// let reference = vec![0.0f32; 1000];
/// assert_eq!(estimate_sync_offset(&reference, &reference, 1000, 1.0)?, 0.0);
/// # Ok::<(), liveclip_sync::SyncError>(())
/// ```
pub fn estimate_sync_offset(
    reference: &[f32],
    candidate: &[f32],
    sample_rate: u32,
    max_shift_seconds: f32,
) -> Result<f32, SyncError> {
    let candidates =
        estimate_sync_candidates(reference, candidate, sample_rate, max_shift_seconds, 1)?;
    Ok(candidates.first().map_or(0.0, |c| c.lag_seconds))
}
