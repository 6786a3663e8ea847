//! # LiveClip Sync
//!
//! Audio alignment engine for matching live concert video clips against a
//! master recording, plus a beat marker detector for cut timing.
//!
//! ## Features
//!
//! - **Sync offset estimation**: coarse-to-fine lag search over amplitude and
//!   vocal-emphasis envelopes, returning ranked lag candidates
//! - **End anchor**: duration-difference heuristic that recovers matches
//!   sitting at the edge of the search window
//! - **Beat markers**: envelope flux with an adaptive floor and enforced spacing
//! - **WAV loading**: 16-bit PCM files downmixed to mono
//!
//! ## Quick Start
//!
//! ```no_run
//! use liveclip_sync::{estimate_sync_candidates, load_wav_mono, DEFAULT_MAX_SHIFT_SECONDS};
//!
//! let (video, sample_rate) = load_wav_mono("clip.wav")?;
//! let (master, _) = load_wav_mono("master.wav")?;
//!
//! let candidates =
//!     estimate_sync_candidates(&video, &master, sample_rate, DEFAULT_MAX_SHIFT_SECONDS, 4)?;
//! for c in &candidates {
//!     println!("lag {:+.3}s (score {:.3}, ratio {:.2})", c.lag_seconds, c.score, c.score_ratio);
//! }
//! # Ok::<(), liveclip_sync::SyncError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! PCM → Envelopes (amplitude + vocal, 24 Hz) → Coarse peaks + end anchor
//!     → Envelopes (90 Hz) → Windowed refinement → Ranking → Candidates
//!
//! PCM → Envelope (120 Hz) → Fast/slow flux → Adaptive peaks → Beat markers
//! ```
//!
//! The spectral part of the vocal feature needs the default `fft` cargo
//! feature; without it the amplitude envelope is used in its place.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alignment;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use alignment::result::SyncCandidate;
pub use alignment::{
    estimate_sync_candidates, estimate_sync_candidates_with_config, estimate_sync_offset,
};
pub use config::{
    BeatConfig, SyncConfig, VocalConfig, DEFAULT_CANDIDATE_LIMIT, DEFAULT_MAX_SHIFT_SECONDS,
};
pub use error::SyncError;
pub use features::onset::beat_markers::{detect_beat_markers, detect_beat_markers_with_config};
pub use io::wav::{
    detect_beat_markers_from_wav_file, estimate_sync_offset_from_wav_files, load_wav_mono,
};
