//! Signal preprocessing modules
//!
//! This module contains utilities for preparing audio for alignment:
//! - Normalization (zero mean, unit energy)
//! - Envelope downsampling and moving averages
//! - Channel mixing (multi-channel to mono)

pub mod channel_mixer;
pub mod envelope;
pub mod normalization;
