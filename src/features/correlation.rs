//! Lag correlation scoring
//!
//! Two scores share one overlap rule. For a lag `L` the candidate sample
//! `candidate[t + L]` is compared with `reference[t]` for every `t` where both
//! exist:
//!
//! - lag >= 0: `candidate[L..]` against `reference[..]`
//! - lag < 0: `candidate[..]` against `reference[-L..]`
//!
//! Both slices are truncated to the shorter of the two. Lags whose overlap is
//! shorter than [`min_overlap`] are not scored at all.
//!
//! - [`dot_product_score`] sums elementwise products of pre-normalized
//!   sequences (coarse and fine lag scans).
//! - [`ncc_score`] mean-centers the raw overlap slices and divides by their
//!   combined energy (precise scoring of a handful of lags).

/// Combined energies at or below this make the NCC score 0
const NCC_EPSILON: f64 = 1e-9;

/// Score of one lag together with the overlap it was computed over
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagScore {
    /// Similarity score
    pub score: f32,

    /// Number of overlapping samples
    pub overlap: usize,
}

/// Minimum overlap in samples for a lag to be scored at `rate`
///
/// `max(4, rate / 5)`, i.e. a fifth of a second but never fewer than 4 samples.
pub fn min_overlap(rate: u32) -> usize {
    (rate as usize / 5).max(4)
}

/// Overlapping slices of `reference` and `candidate` at `lag`
///
/// Returns two empty slices when the sequences do not overlap.
pub fn overlap_slices<'a>(
    reference: &'a [f32],
    candidate: &'a [f32],
    lag: i64,
) -> (&'a [f32], &'a [f32]) {
    let shift = lag.unsigned_abs() as usize;
    let (ref_start, cand_start) = if lag >= 0 { (0, shift) } else { (shift, 0) };

    if ref_start >= reference.len() || cand_start >= candidate.len() {
        return (&[], &[]);
    }

    let len = (reference.len() - ref_start).min(candidate.len() - cand_start);
    (
        &reference[ref_start..ref_start + len],
        &candidate[cand_start..cand_start + len],
    )
}

/// Raw dot product of two pre-normalized sequences at `lag`
///
/// # Arguments
///
/// * `reference` - Normalized reference sequence
/// * `candidate` - Normalized candidate sequence
/// * `lag` - Shift in samples (positive = candidate delayed)
/// * `rate` - Sequence rate in Hz, used for the minimum overlap
///
/// # Returns
///
/// `None` when the overlap is shorter than [`min_overlap`]
pub fn dot_product_score(
    reference: &[f32],
    candidate: &[f32],
    lag: i64,
    rate: u32,
) -> Option<LagScore> {
    let (ref_slice, cand_slice) = overlap_slices(reference, candidate, lag);
    let overlap = ref_slice.len();
    if overlap < min_overlap(rate) {
        return None;
    }

    let score: f64 = ref_slice
        .iter()
        .zip(cand_slice)
        .map(|(&r, &c)| r as f64 * c as f64)
        .sum();

    Some(LagScore {
        score: score as f32,
        overlap,
    })
}

/// Localized normalized cross-correlation at `lag`
///
/// Each overlap slice is centered on its own mean, then
/// `sum(ref * cand) / sqrt(sum(ref^2) * sum(cand^2))`.
///
/// # Returns
///
/// `None` when the overlap is shorter than [`min_overlap`]; a score of exactly
/// 0 when the overlap is near-silent.
pub fn ncc_score(reference: &[f32], candidate: &[f32], lag: i64, rate: u32) -> Option<LagScore> {
    let (ref_slice, cand_slice) = overlap_slices(reference, candidate, lag);
    let overlap = ref_slice.len();
    if overlap < min_overlap(rate) {
        return None;
    }

    let ref_mean = ref_slice.iter().map(|&x| x as f64).sum::<f64>() / overlap as f64;
    let cand_mean = cand_slice.iter().map(|&x| x as f64).sum::<f64>() / overlap as f64;

    let mut cross = 0.0f64;
    let mut ref_energy = 0.0f64;
    let mut cand_energy = 0.0f64;
    for (&r, &c) in ref_slice.iter().zip(cand_slice) {
        let r = r as f64 - ref_mean;
        let c = c as f64 - cand_mean;
        cross += r * c;
        ref_energy += r * r;
        cand_energy += c * c;
    }

    let denominator = (ref_energy * cand_energy).sqrt();
    let score = if denominator <= NCC_EPSILON {
        0.0
    } else {
        (cross / denominator) as f32
    };

    Some(LagScore { score, overlap })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| ((i * 7) % 11) as f32).collect()
    }

    #[test]
    fn test_overlap_positive_lag() {
        let reference = [0.0, 1.0, 2.0, 3.0];
        let candidate = [9.0, 9.0, 0.0, 1.0, 2.0];
        let (r, c) = overlap_slices(&reference, &candidate, 2);
        assert_eq!(r, &[0.0, 1.0, 2.0]);
        assert_eq!(c, &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_overlap_negative_lag() {
        let reference = [5.0, 6.0, 7.0, 8.0];
        let candidate = [7.0, 8.0, 9.0];
        let (r, c) = overlap_slices(&reference, &candidate, -2);
        assert_eq!(r, &[7.0, 8.0]);
        assert_eq!(c, &[7.0, 8.0]);
    }

    #[test]
    fn test_overlap_beyond_length_is_empty() {
        let (r, c) = overlap_slices(&[1.0, 2.0], &[1.0, 2.0], 5);
        assert!(r.is_empty() && c.is_empty());
        let (r, c) = overlap_slices(&[1.0, 2.0], &[1.0, 2.0], -5);
        assert!(r.is_empty() && c.is_empty());
    }

    #[test]
    fn test_min_overlap() {
        assert_eq!(min_overlap(10), 4);
        assert_eq!(min_overlap(24), 4);
        assert_eq!(min_overlap(90), 18);
    }

    #[test]
    fn test_dot_product_excludes_short_overlap() {
        let signal = ramp(10);
        assert!(dot_product_score(&signal, &signal, 7, 24).is_none());
        assert!(dot_product_score(&signal, &signal, 6, 24).is_some());
    }

    #[test]
    fn test_dot_product_value() {
        let reference = [1.0, 2.0, 3.0, 4.0, 5.0];
        let candidate = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let scored = dot_product_score(&reference, &candidate, 1, 10).unwrap();
        assert_eq!(scored.overlap, 5);
        assert!((scored.score - 55.0).abs() < 1e-4);
    }

    #[test]
    fn test_ncc_identical_is_one() {
        let signal = ramp(100);
        let scored = ncc_score(&signal, &signal, 0, 50).unwrap();
        assert!((scored.score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ncc_shift_recovered() {
        let reference = ramp(120);
        let mut candidate = vec![0.0f32; 15];
        candidate.extend_from_slice(&reference);
        let aligned = ncc_score(&reference, &candidate, 15, 50).unwrap();
        let misaligned = ncc_score(&reference, &candidate, 13, 50).unwrap();
        assert!((aligned.score - 1.0).abs() < 1e-5);
        assert!(misaligned.score < aligned.score);
    }

    #[test]
    fn test_ncc_is_scale_invariant() {
        let reference = ramp(80);
        let candidate: Vec<f32> = reference.iter().map(|x| 0.2 * x + 3.0).collect();
        let scored = ncc_score(&reference, &candidate, 0, 50).unwrap();
        assert!((scored.score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ncc_silent_overlap_is_zero() {
        let reference = ramp(50);
        let candidate = vec![0.0f32; 50];
        let scored = ncc_score(&reference, &candidate, 0, 20).unwrap();
        assert_eq!(scored.score, 0.0);
    }

    #[test]
    fn test_ncc_short_overlap_is_none() {
        let signal = ramp(20);
        assert!(ncc_score(&signal, &signal, 18, 20).is_none());
    }
}
