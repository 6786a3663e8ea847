//! Feature extraction modules
//!
//! This module contains the signal features and scorers the alignment and
//! beat detection pipelines are built from:
//! - Vocal-emphasis envelopes (spectral strategy with amplitude fallback)
//! - Lag correlation scoring (dot product and localized NCC)
//! - Lag peak selection
//! - Onset (beat marker) detection

pub mod correlation;
pub mod onset;
pub mod peak_picking;
pub mod vocal;
