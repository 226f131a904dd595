//! Level count and membership depth sampling.

use crate::config::validate_log_base;
use crate::Result;
use rand::Rng;

/// Number of levels for a dataset of `n` vectors: `floor(log_base(n))`.
///
/// Exact powers of the base land on the right integer even where
/// `ln(n) / ln(log_base)` rounds just below it (e.g. `n = 243`, base 3).
///
/// ```
/// use hsw_index::level_count;
///
/// assert_eq!(level_count(2, 3.0).unwrap(), 0);
/// assert_eq!(level_count(9, 3.0).unwrap(), 2);
/// assert_eq!(level_count(243, 3.0).unwrap(), 5);
/// ```
pub fn level_count(n: usize, log_base: f64) -> Result<usize> {
    validate_log_base(log_base)?;
    if n == 0 {
        return Ok(0);
    }

    let n = n as f64;
    let mut levels = (n.ln() / log_base.ln()).floor().max(0.0) as usize;
    while levels > 0 && log_base.powi(levels as i32) > n {
        levels -= 1;
    }
    while log_base.powi(levels as i32 + 1) <= n {
        levels += 1;
    }
    Ok(levels)
}

/// Samples how many levels (counted from level 0) a new node joins.
///
/// Thresholds `θ[l]` are the cumulative normalized mass of the weights
/// `log_base^(n_levels - i)` for `i < l`, with `θ[0] = 0`. A node drawing
/// `r` joins every level from 0 upward while `θ[l] < r`, so level 0 holds
/// almost every node and each level above holds roughly `1 / log_base` as many.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSampler {
    thresholds: Vec<f64>,
}

impl LevelSampler {
    /// Precompute thresholds for `n_levels` levels.
    ///
    /// `log_base` is assumed validated (finite, > 1).
    pub fn new(n_levels: usize, log_base: f64) -> Self {
        let weights: Vec<f64> = (0..n_levels)
            .map(|i| log_base.powi((n_levels - i) as i32))
            .collect();
        let total: f64 = weights.iter().sum();

        let mut thresholds = Vec::with_capacity(n_levels);
        let mut cumulative = 0.0f64;
        for w in &weights {
            thresholds.push(cumulative);
            cumulative += w / total;
        }

        Self { thresholds }
    }

    /// Number of levels this sampler assigns into.
    pub fn n_levels(&self) -> usize {
        self.thresholds.len()
    }

    /// Ascending thresholds, `θ[0] = 0`.
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Membership depth for a uniform draw `r`: the length of the leading
    /// run of levels whose threshold is strictly below `r`.
    pub fn depth_for(&self, r: f64) -> usize {
        self.thresholds.iter().take_while(|&&t| t < r).count()
    }

    /// Draw a membership depth in `0..=n_levels`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.depth_for(rng.gen::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_level_count() {
        assert_eq!(level_count(0, 3.0).unwrap(), 0);
        assert_eq!(level_count(1, 3.0).unwrap(), 0);
        assert_eq!(level_count(2, 3.0).unwrap(), 0);
        assert_eq!(level_count(3, 3.0).unwrap(), 1);
        assert_eq!(level_count(8, 3.0).unwrap(), 1);
        assert_eq!(level_count(9, 3.0).unwrap(), 2);
        assert_eq!(level_count(26, 3.0).unwrap(), 2);
        assert_eq!(level_count(27, 3.0).unwrap(), 3);
        assert_eq!(level_count(242, 3.0).unwrap(), 4);
        assert_eq!(level_count(243, 3.0).unwrap(), 5);
        assert_eq!(level_count(1000, 10.0).unwrap(), 3);
        assert_eq!(level_count(4, 2.0).unwrap(), 2);
        assert_eq!(level_count(10, 2.5).unwrap(), 2);
    }

    #[test]
    fn test_level_count_rejects_bad_base() {
        assert!(level_count(10, 1.0).is_err());
        assert!(level_count(10, f64::NAN).is_err());
    }

    #[test]
    fn test_thresholds_two_levels() {
        // weights [9, 3] -> [0.75, 0.25] -> thresholds [0, 0.75]
        let sampler = LevelSampler::new(2, 3.0);
        assert_eq!(sampler.n_levels(), 2);
        let t = sampler.thresholds();
        assert_eq!(t[0], 0.0);
        assert!((t[1] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_thresholds_ascending() {
        let sampler = LevelSampler::new(6, 3.0);
        let t = sampler.thresholds();
        assert_eq!(t[0], 0.0);
        for pair in t.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(*t.last().unwrap() < 1.0);
    }

    #[test]
    fn test_depth_for() {
        let sampler = LevelSampler::new(2, 3.0);
        assert_eq!(sampler.depth_for(0.0), 0);
        assert_eq!(sampler.depth_for(0.1), 1);
        assert_eq!(sampler.depth_for(0.75), 1);
        assert_eq!(sampler.depth_for(0.7500001), 2);
        assert_eq!(sampler.depth_for(0.99), 2);
    }

    #[test]
    fn test_sample_is_reproducible() {
        let sampler = LevelSampler::new(4, 3.0);
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..64).map(|_| sampler.sample(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(draw(5), draw(5));
        assert!(draw(5).iter().all(|&d| d <= 4));
    }

    #[test]
    fn test_depth_distribution() {
        // Level l is joined by about (1 - θ[l]) of the nodes
        let n_levels = 3;
        let sampler = LevelSampler::new(n_levels, 3.0);
        let mut rng = StdRng::seed_from_u64(42);
        let mut members = vec![0usize; n_levels];

        let draws = 20_000;
        for _ in 0..draws {
            let depth = sampler.sample(&mut rng);
            for level in members.iter_mut().take(depth) {
                *level += 1;
            }
        }

        assert!(members[0] > members[1]);
        assert!(members[1] > members[2]);
        for (level, &count) in members.iter().enumerate() {
            let expected = (1.0 - sampler.thresholds()[level]) * draws as f64;
            let observed = count as f64;
            assert!(
                (observed - expected).abs() < 0.05 * draws as f64,
                "level {} expected ~{} got {}",
                level,
                expected,
                observed
            );
        }
    }
}
