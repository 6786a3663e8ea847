//! Audio I/O modules
//!
//! WAV loading into the mono `f32` form the alignment core consumes, plus
//! file-based convenience wrappers around the public entry points.

pub mod wav;
