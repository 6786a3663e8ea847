//! Configuration parameters for alignment and beat detection
//!
//! Every heuristic constant the pipeline depends on lives here. The values
//! were tuned empirically against live concert recordings; changing them
//! changes which lag wins on real material.

use serde::{Deserialize, Serialize};

/// Default search window for sync offsets, in seconds
pub const DEFAULT_MAX_SHIFT_SECONDS: f32 = 8.0;

/// Default number of ranked candidates for exploratory use
pub const DEFAULT_CANDIDATE_LIMIT: usize = 4;

/// Vocal-emphasis feature parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocalConfig {
    /// Lower band edge in Hz (default: 180.0)
    pub low_cut_hz: f32,

    /// Upper band edge in Hz, clamped below Nyquist (default: 1800.0)
    pub high_cut_hz: f32,

    /// The band is unusable unless the clamped high cut exceeds this (default: 200.0)
    pub min_high_cut_hz: f32,

    /// Slow baseline moving-average window in seconds (default: 0.12)
    pub baseline_seconds: f32,

    /// Fraction of rectified energy kept on top of the transient term (default: 0.35)
    pub rectified_floor: f32,

    /// Shortest signal the spectral path will process (default: 8)
    pub min_samples: usize,
}

impl Default for VocalConfig {
    fn default() -> Self {
        Self {
            low_cut_hz: 180.0,
            high_cut_hz: 1800.0,
            min_high_cut_hz: 200.0,
            baseline_seconds: 0.12,
            rectified_floor: 0.35,
            min_samples: 8,
        }
    }
}

/// Alignment (sync offset) configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Coarse stage envelope rate in Hz (default: 24)
    pub coarse_rate: u32,

    /// Fine stage envelope rate in Hz (default: 90)
    pub fine_rate: u32,

    /// Minimum coarse peaks collected per feature (default: 3)
    /// The actual count is `max(min_coarse_peaks, limit + 2)`.
    pub min_coarse_peaks: usize,

    /// Minimum separation between coarse peaks in seconds (default: 0.75)
    pub coarse_peak_separation_seconds: f32,

    /// Coarse candidates closer than this are merged (default: 0.75)
    pub coarse_dedupe_seconds: f32,

    /// Refine window scale relative to the fine rate (default: 0.6)
    /// The half-width is `max(fine_rate, fine_rate * scale)` fine samples.
    pub refine_window_scale: f32,

    /// Minimum separation between fine peaks in seconds (default: 0.2)
    pub fine_peak_separation_seconds: f32,

    /// Refined candidates closer than this are merged (default: 0.35)
    pub fine_dedupe_seconds: f32,

    /// Weight of the amplitude NCC in the combined score (default: 0.45)
    pub amplitude_weight: f32,

    /// Weight of the vocal NCC in the combined score (default: 0.55)
    pub vocal_weight: f32,

    /// Radius around the end anchor searched for a refined match (default: 2.5)
    pub anchor_search_seconds: f32,

    /// Vocal-emphasis extractor parameters
    pub vocal: VocalConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            coarse_rate: 24,
            fine_rate: 90,
            min_coarse_peaks: 3,
            coarse_peak_separation_seconds: 0.75,
            coarse_dedupe_seconds: 0.75,
            refine_window_scale: 0.6,
            fine_peak_separation_seconds: 0.2,
            fine_dedupe_seconds: 0.35,
            amplitude_weight: 0.45,
            vocal_weight: 0.55,
            anchor_search_seconds: 2.5,
            vocal: VocalConfig::default(),
        }
    }
}

/// Beat marker detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatConfig {
    /// Envelope rate in Hz (default: 120)
    pub target_rate: u32,

    /// Minimum spacing between markers in seconds (default: 0.22)
    pub min_spacing_seconds: f32,

    /// Maximum number of markers returned (default: 2000)
    pub max_markers: usize,

    /// Fast moving-average window in seconds (default: 0.05)
    pub fast_window_seconds: f32,

    /// Slow moving-average window in seconds (default: 0.35)
    pub slow_window_seconds: f32,

    /// Local flux floor window in seconds (default: 0.6)
    pub local_floor_window_seconds: f32,

    /// Global floor as a fraction of peak flux (default: 0.12)
    pub global_floor_ratio: f32,

    /// Multiplier applied to the local floor (default: 1.35)
    pub local_floor_multiplier: f32,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            target_rate: 120,
            min_spacing_seconds: 0.22,
            max_markers: 2000,
            fast_window_seconds: 0.05,
            slow_window_seconds: 0.35,
            local_floor_window_seconds: 0.6,
            global_floor_ratio: 0.12,
            local_floor_multiplier: 1.35,
        }
    }
}

/// Convert a duration in seconds to a sample count at `rate`, never below 1
pub(crate) fn seconds_to_samples(seconds: f32, rate: u32) -> usize {
    ((seconds * rate as f32) as usize).max(1)
}
