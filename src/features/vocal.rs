//! Vocal-emphasis envelope extraction
//!
//! Loud stage instruments and crowd noise dominate a plain amplitude envelope.
//! The vocal-emphasis feature keeps only the vocal register of the signal and
//! favors sudden articulation changes over sustained energy:
//!
//! 1. Mean-center the signal and transform it to the frequency domain
//! 2. Zero every bin outside `[low_cut, min(high_cut, nyquist - 1)]`
//! 3. Transform back, rectify, and subtract a slow moving-average baseline
//! 4. `feature = max(0, rectified - baseline) + floor * rectified`
//! 5. Bucket-average the feature exactly like the amplitude envelope
//!
//! Extraction is a strategy ([`SpectralFeatureExtractor`]). The transform-based
//! variant needs the `fft` feature; whenever it is unavailable or its
//! preconditions fail (short signal, band above Nyquist) the amplitude envelope
//! is produced instead. Callers always get an envelope at the requested rate.

use crate::config::VocalConfig;
use crate::error::SyncError;
use crate::preprocessing::envelope::envelope_downsample;

/// Strategy producing a feature envelope from raw PCM
///
/// Implementors provide the full-rate feature signal; bucketing it to an
/// envelope rate is shared, so one feature can serve several rates.
pub trait SpectralFeatureExtractor {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Full-rate feature signal, one value per input sample
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidParameter` if `sample_rate` is 0
    fn feature(&self, signal: &[f32], sample_rate: u32) -> Result<Vec<f32>, SyncError>;

    /// Produce `(envelope, envelope_rate)` at roughly `target_rate`
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidParameter` if `sample_rate` is 0
    fn extract(
        &self,
        signal: &[f32],
        sample_rate: u32,
        target_rate: u32,
    ) -> Result<(Vec<f32>, u32), SyncError> {
        let feature = self.feature(signal, sample_rate)?;
        envelope_downsample(&feature, sample_rate, target_rate)
    }
}

fn check_sample_rate(sample_rate: u32) -> Result<(), SyncError> {
    if sample_rate == 0 {
        return Err(SyncError::InvalidParameter(
            "sample_rate must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Plain amplitude envelope, used when spectral filtering is not possible
#[derive(Debug, Clone, Copy, Default)]
pub struct AmplitudeFallback;

impl SpectralFeatureExtractor for AmplitudeFallback {
    fn name(&self) -> &'static str {
        "amplitude-fallback"
    }

    fn feature(&self, signal: &[f32], sample_rate: u32) -> Result<Vec<f32>, SyncError> {
        check_sample_rate(sample_rate)?;
        Ok(signal.to_vec())
    }
}

/// Usable `(low, high)` band for `sample_rate`, if any
///
/// The high cut is clamped to `nyquist - 1`; the band is rejected unless the
/// clamped high cut exceeds both the low cut and `min_high_cut_hz`.
pub fn usable_band(config: &VocalConfig, sample_rate: u32) -> Option<(f32, f32)> {
    let nyquist = sample_rate as f32 / 2.0;
    let high = config.high_cut_hz.min(nyquist - 1.0);
    if high <= config.min_high_cut_hz || high <= config.low_cut_hz {
        return None;
    }
    Some((config.low_cut_hz, high))
}

/// FFT band-pass + transient emphasis
#[cfg(feature = "fft")]
#[derive(Debug, Clone)]
pub struct BandEmphasisExtractor {
    config: VocalConfig,
}

#[cfg(feature = "fft")]
impl BandEmphasisExtractor {
    /// Create an extractor with the given band and emphasis parameters
    pub fn new(config: VocalConfig) -> Self {
        Self { config }
    }

    /// Zero-phase band-pass via full-length FFT
    fn band_pass(signal: &[f32], sample_rate: u32, low: f32, high: f32) -> Vec<f32> {
        use rustfft::num_complex::Complex;
        use rustfft::FftPlanner;

        let n = signal.len();
        let mean = signal.iter().map(|&x| x as f64).sum::<f64>() / n as f64;

        let mut spectrum: Vec<Complex<f32>> = signal
            .iter()
            .map(|&x| Complex::new((x as f64 - mean) as f32, 0.0))
            .collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);
        fft.process(&mut spectrum);

        // Bin k and its mirror n - k carry the same frequency
        let bin_hz = sample_rate as f32 / n as f32;
        for (k, bin) in spectrum.iter_mut().enumerate() {
            let freq = k.min(n - k) as f32 * bin_hz;
            if freq < low || freq > high {
                *bin = Complex::new(0.0, 0.0);
            }
        }

        let ifft = planner.plan_fft_inverse(n);
        ifft.process(&mut spectrum);

        let scale = 1.0 / n as f32;
        spectrum.iter().map(|x| x.re * scale).collect()
    }

    /// Rectified transient emphasis of a band-limited signal
    fn emphasize(&self, band_limited: &[f32], sample_rate: u32) -> Vec<f32> {
        use crate::config::seconds_to_samples;
        use crate::preprocessing::envelope::moving_average;

        let rectified: Vec<f32> = band_limited.iter().map(|x| x.abs()).collect();
        let window = seconds_to_samples(self.config.baseline_seconds, sample_rate);
        let baseline = moving_average(&rectified, window);

        rectified
            .iter()
            .zip(&baseline)
            .map(|(&r, &b)| (r - b).max(0.0) + self.config.rectified_floor * r)
            .collect()
    }
}

#[cfg(feature = "fft")]
impl SpectralFeatureExtractor for BandEmphasisExtractor {
    fn name(&self) -> &'static str {
        "band-emphasis"
    }

    fn feature(&self, signal: &[f32], sample_rate: u32) -> Result<Vec<f32>, SyncError> {
        check_sample_rate(sample_rate)?;

        if signal.len() < self.config.min_samples {
            log::debug!(
                "Signal too short for band emphasis ({} samples), using amplitude envelope",
                signal.len()
            );
            return AmplitudeFallback.feature(signal, sample_rate);
        }

        let Some((low, high)) = usable_band(&self.config, sample_rate) else {
            log::debug!(
                "No usable vocal band at {} Hz, using amplitude envelope",
                sample_rate
            );
            return AmplitudeFallback.feature(signal, sample_rate);
        };

        log::debug!(
            "Band emphasis: {} samples @ {} Hz, band=[{:.0}, {:.0}] Hz",
            signal.len(),
            sample_rate,
            low,
            high
        );

        let band_limited = Self::band_pass(signal, sample_rate, low, high);
        Ok(self.emphasize(&band_limited, sample_rate))
    }
}

/// Pick the best available extractor for this build
pub fn default_extractor(config: &VocalConfig) -> Box<dyn SpectralFeatureExtractor> {
    #[cfg(feature = "fft")]
    {
        Box::new(BandEmphasisExtractor::new(config.clone()))
    }
    #[cfg(not(feature = "fft"))]
    {
        let _ = config;
        log::warn!("Built without `fft`, vocal emphasis uses the amplitude envelope");
        Box::new(AmplitudeFallback)
    }
}

/// Vocal-emphasis envelope of `signal` at roughly `target_rate`
///
/// # Errors
///
/// Returns `SyncError::InvalidParameter` if `sample_rate` is 0
pub fn vocal_emphasis_envelope(
    signal: &[f32],
    sample_rate: u32,
    target_rate: u32,
    config: &VocalConfig,
) -> Result<(Vec<f32>, u32), SyncError> {
    default_extractor(config).extract(signal, sample_rate, target_rate)
}
