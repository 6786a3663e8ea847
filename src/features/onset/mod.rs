//! Onset detection modules
//!
//! - Beat markers from fast/slow envelope flux with an adaptive floor

pub mod beat_markers;
