//! Alignment result types

use serde::{Deserialize, Serialize};

/// One ranked lag hypothesis
///
/// `lag_seconds` is the shift such that `candidate[t + lag] ≈ reference[t]`:
/// a positive lag means the candidate track is delayed relative to the
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncCandidate {
    /// Lag in seconds (positive = candidate delayed)
    pub lag_seconds: f32,

    /// Combined score: weighted amplitude and vocal NCC
    pub score: f32,

    /// Amplitude-envelope NCC at this lag
    pub amp_score: f32,

    /// Vocal-emphasis NCC at this lag
    pub vocal_score: f32,

    /// Overlap the scores were computed over, in fine-envelope samples
    pub overlap_samples: usize,

    /// Score relative to the top candidate (top = 1.0, 0 when the top score is ~0)
    pub score_ratio: f32,

    /// True when the lag descends from the end-anchor heuristic rather than
    /// the correlation search
    pub injected: bool,
}

/// Lag surviving the coarse stage, in coarse-envelope samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CoarseLag {
    pub lag: i64,
    pub score: f32,
    pub injected: bool,
}

/// Lag scored by the fine stage, in fine-envelope samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RefinedLag {
    pub lag: i64,
    pub score: f32,
    pub amp_score: f32,
    pub vocal_score: f32,
    pub overlap: usize,
    pub injected: bool,
}
