//! Candidate merging and final ranking

use super::result::{RefinedLag, SyncCandidate};
use crate::config::SyncConfig;
use crate::features::peak_picking::{rank_order, score_ratio};

/// Drop items lying closer than `min_separation_seconds` to a better one
///
/// `sorted` must already be in rank order; the first item of every cluster wins.
pub(crate) fn dedupe_by_lag<T, F>(
    sorted: Vec<T>,
    min_separation_seconds: f32,
    rate: u32,
    lag_of: F,
) -> Vec<T>
where
    F: Fn(&T) -> i64,
{
    let min_separation = min_separation_seconds * rate as f32;
    let mut kept: Vec<T> = Vec::with_capacity(sorted.len());
    for item in sorted {
        let lag = lag_of(&item);
        if kept
            .iter()
            .all(|k| lag_of(k).abs_diff(lag) as f32 >= min_separation)
        {
            kept.push(item);
        }
    }
    kept
}

/// Turn the fine stage output into the final candidate list
///
/// # Arguments
///
/// * `refined` - Every scored fine lag
/// * `rate` - Fine envelope rate
/// * `limit` - Maximum number of candidates returned
/// * `anchor_seconds` - End-anchor lag, if one was injected
/// * `config` - Alignment configuration
///
/// # Returns
///
/// Candidates sorted by descending score, pairwise at least
/// `fine_dedupe_seconds` apart, with `score_ratio` relative to the first
pub(crate) fn rank_refined(
    mut refined: Vec<RefinedLag>,
    rate: u32,
    limit: usize,
    anchor_seconds: Option<f32>,
    config: &SyncConfig,
) -> Vec<SyncCandidate> {
    if limit == 0 || refined.is_empty() || rate == 0 {
        return Vec::new();
    }

    refined.sort_by(|a, b| rank_order(a.score, a.lag, b.score, b.lag));
    let mut kept = dedupe_by_lag(refined.clone(), config.fine_dedupe_seconds, rate, |r| r.lag);
    kept.truncate(limit);

    if let Some(anchor) = anchor_seconds {
        splice_anchor(&mut kept, &refined, anchor, rate, limit, config);
    }

    let top = kept.first().map_or(0.0, |c| c.score);
    kept.into_iter()
        .map(|r| SyncCandidate {
            lag_seconds: r.lag as f32 / rate as f32,
            score: r.score,
            amp_score: r.amp_score,
            vocal_score: r.vocal_score,
            overlap_samples: r.overlap,
            score_ratio: score_ratio(r.score, top),
            injected: r.injected,
        })
        .collect()
}

/// Make sure the best lag near the end anchor is represented in `kept`
///
/// `refined` must be in rank order, so the first lag inside the search
/// radius is the best one there.
fn splice_anchor(
    kept: &mut Vec<RefinedLag>,
    refined: &[RefinedLag],
    anchor_seconds: f32,
    rate: u32,
    limit: usize,
    config: &SyncConfig,
) {
    let anchor_lag = anchor_seconds * rate as f32;
    let radius = config.anchor_search_seconds * rate as f32;
    let min_separation = config.fine_dedupe_seconds * rate as f32;

    let Some(best) = refined
        .iter()
        .find(|r| (r.lag as f32 - anchor_lag).abs() <= radius)
    else {
        return;
    };

    if kept
        .iter()
        .any(|k| (k.lag.abs_diff(best.lag) as f32) < min_separation)
    {
        return;
    }

    log::debug!(
        "Splicing anchor-region lag {:.3}s (score {:.4}) into final ranking",
        best.lag as f32 / rate as f32,
        best.score
    );

    if kept.len() >= limit {
        kept.pop();
    }
    kept.push(*best);
    kept.sort_by(|a, b| rank_order(a.score, a.lag, b.score, b.lag));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lag(lag: i64, score: f32) -> RefinedLag {
        RefinedLag {
            lag,
            score,
            amp_score: score,
            vocal_score: score,
            overlap: 100,
            injected: false,
        }
    }

    #[test]
    fn test_dedupe_keeps_first_of_cluster() {
        let sorted = vec![10i64, 12, 40, 41, 90];
        let kept = dedupe_by_lag(sorted, 0.1, 100, |&l| l);
        assert_eq!(kept, vec![10, 40, 90]);
    }

    #[test]
    fn test_dedupe_boundary_is_kept() {
        // Exactly the separation apart is allowed
        let kept = dedupe_by_lag(vec![0i64, 10], 0.1, 100, |&l| l);
        assert_eq!(kept, vec![0, 10]);
    }

    #[test]
    fn test_rank_sorts_dedupes_and_truncates() {
        let refined = vec![
            lag(100, 0.5),
            lag(300, 0.9),
            lag(305, 0.8),
            lag(500, 0.7),
            lag(700, 0.2),
        ];
        let ranked = rank_refined(refined, 90, 3, None, &SyncConfig::default());

        let lags: Vec<f32> = ranked.iter().map(|c| c.lag_seconds * 90.0).collect();
        assert_eq!(ranked.len(), 3);
        assert!((lags[0] - 300.0).abs() < 1e-3);
        assert!((lags[1] - 500.0).abs() < 1e-3);
        assert!((lags[2] - 100.0).abs() < 1e-3);
        assert!((ranked[0].score_ratio - 1.0).abs() < 1e-6);
        assert!((ranked[2].score_ratio - 0.5 / 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_anchor_region_replaces_lowest_when_full() {
        let mut far = lag(900, 0.3);
        far.injected = true;
        let refined = vec![lag(100, 0.9), lag(300, 0.8), far];
        let anchor = 910.0 / 90.0;
        let ranked = rank_refined(refined, 90, 2, Some(anchor), &SyncConfig::default());

        assert_eq!(ranked.len(), 2);
        assert!((ranked[0].lag_seconds * 90.0 - 100.0).abs() < 1e-3);
        assert!((ranked[1].lag_seconds * 90.0 - 900.0).abs() < 1e-3);
        assert!(ranked[1].injected);
    }

    #[test]
    fn test_anchor_already_represented_is_not_duplicated() {
        let refined = vec![lag(100, 0.9), lag(110, 0.4), lag(300, 0.5)];
        let anchor = 105.0 / 90.0;
        let ranked = rank_refined(refined, 90, 4, Some(anchor), &SyncConfig::default());
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_anchor_outside_radius_is_ignored() {
        let refined = vec![lag(100, 0.9), lag(200, 0.8)];
        // 2.5 s radius at 90 Hz is 225 samples
        let anchor = 1000.0 / 90.0;
        let ranked = rank_refined(refined, 90, 1, Some(anchor), &SyncConfig::default());
        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].lag_seconds * 90.0 - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_top_score_gives_zero_ratios() {
        let refined = vec![lag(0, 0.0), lag(200, -0.2)];
        let ranked = rank_refined(refined, 90, 4, None, &SyncConfig::default());
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|c| c.score_ratio == 0.0));
    }

    #[test]
    fn test_limit_zero_and_empty_input() {
        let config = SyncConfig::default();
        assert!(rank_refined(vec![lag(10, 1.0)], 90, 0, None, &config).is_empty());
        assert!(rank_refined(Vec::new(), 90, 4, Some(1.0), &config).is_empty());
    }
}
