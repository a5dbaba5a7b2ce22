//! Pattern model: historical shape distributions and conformity scoring.

use crate::domain::models::{Draw, WHITE_COUNT};

/// Band boundaries for the low/mid/high split.
const LOW_BAND_MAX: u8 = 23;
const MID_BAND_MAX: u8 = 46;
/// Decade buckets over 1-69 (7 buckets of 10).
pub const DECADE_BUCKETS: usize = 7;

/// Conformity blend weights.
const ODD_EVEN_WEIGHT: f64 = 0.25;
const SUM_WEIGHT: f64 = 0.35;
const BAND_WEIGHT: f64 = 0.25;
const DECADE_WEIGHT: f64 = 0.15;

/// Historical shape distributions of winning combinations.
#[derive(Debug, Clone)]
pub struct PatternAnalysis {
    /// P(draw has exactly k odd numbers), k = 0..=5.
    pub odd_hist: [f64; WHITE_COUNT + 1],
    /// Mean low/mid/high counts per draw.
    pub band_means: [f64; 3],
    pub sum_mean: f64,
    pub sum_std: f64,
    /// Draw counts per decade bucket.
    pub decade_hist: [u64; DECADE_BUCKETS],
    draws_analyzed: usize,
}

impl PatternAnalysis {
    pub fn neutral() -> Self {
        Self {
            odd_hist: [1.0 / (WHITE_COUNT + 1) as f64; WHITE_COUNT + 1],
            band_means: [2.0, 2.0, 1.0],
            sum_mean: 175.0,
            sum_std: 50.0,
            decade_hist: [0; DECADE_BUCKETS],
            draws_analyzed: 0,
        }
    }

    pub fn compute(draws: &[Draw]) -> Self {
        if draws.is_empty() {
            return Self::neutral();
        }

        let n = draws.len() as f64;
        let mut odd_counts = [0u64; WHITE_COUNT + 1];
        let mut band_totals = [0u64; 3];
        let mut decade_hist = [0u64; DECADE_BUCKETS];
        let mut sums = Vec::with_capacity(draws.len());

        for draw in draws {
            odd_counts[odd_count(&draw.white)] += 1;
            let bands = band_counts(&draw.white);
            for i in 0..3 {
                band_totals[i] += bands[i] as u64;
            }
            for &num in &draw.white {
                decade_hist[decade_of(num)] += 1;
            }
            sums.push(draw.white.iter().map(|&x| x as u32).sum::<u32>() as f64);
        }

        let sum_mean = sums.iter().sum::<f64>() / n;
        let sum_var = sums.iter().map(|s| (s - sum_mean).powi(2)).sum::<f64>() / n;

        let mut odd_hist = [0.0; WHITE_COUNT + 1];
        for (i, &c) in odd_counts.iter().enumerate() {
            odd_hist[i] = c as f64 / n;
        }

        Self {
            odd_hist,
            band_means: [
                band_totals[0] as f64 / n,
                band_totals[1] as f64 / n,
                band_totals[2] as f64 / n,
            ],
            sum_mean,
            sum_std: sum_var.sqrt(),
            decade_hist,
            draws_analyzed: draws.len(),
        }
    }

    /// Conformity of a candidate to historical shape norms, in [0, 1].
    ///
    /// Blend: odd/even match probability (25%), sum-within-2 sigma proximity
    /// (35%), band balance vs historical means (25%), decade diversity (15%).
    pub fn conformity(&self, candidate: &[u8; WHITE_COUNT]) -> f64 {
        if self.draws_analyzed == 0 {
            return 0.5;
        }

        // The most common odd count anchors the histogram to 1.0 so a
        // typical candidate is not penalized by histogram spread.
        let max_odd = self
            .odd_hist
            .iter()
            .cloned()
            .fold(f64::MIN, f64::max)
            .max(f64::EPSILON);
        let odd_score = self.odd_hist[odd_count(candidate)] / max_odd;

        let sum = candidate.iter().map(|&x| x as u32).sum::<u32>() as f64;
        let sum_score = if self.sum_std > 0.0 {
            (1.0 - ((sum - self.sum_mean).abs() / (2.0 * self.sum_std))).max(0.0)
        } else if (sum - self.sum_mean).abs() < f64::EPSILON {
            1.0
        } else {
            0.0
        };

        let bands = band_counts(candidate);
        let band_deviation: f64 = bands
            .iter()
            .zip(&self.band_means)
            .map(|(&c, &m)| (c as f64 - m).abs())
            .sum();
        // Total band deviation is bounded by twice the picks per draw.
        let band_score = (1.0 - band_deviation / (2.0 * WHITE_COUNT as f64)).max(0.0);

        let distinct_decades = {
            let mut seen = [false; DECADE_BUCKETS];
            for &num in candidate {
                seen[decade_of(num)] = true;
            }
            seen.iter().filter(|&&s| s).count()
        };
        let decade_score = distinct_decades as f64 / WHITE_COUNT as f64;

        ODD_EVEN_WEIGHT * odd_score
            + SUM_WEIGHT * sum_score
            + BAND_WEIGHT * band_score
            + DECADE_WEIGHT * decade_score
    }
}

pub fn odd_count(white: &[u8; WHITE_COUNT]) -> usize {
    white.iter().filter(|&&n| n % 2 == 1).count()
}

/// Candidate counts in the low (1-23), mid (24-46), high (47-69) bands.
pub fn band_counts(white: &[u8; WHITE_COUNT]) -> [u8; 3] {
    let mut bands = [0u8; 3];
    for &n in white {
        if n <= LOW_BAND_MAX {
            bands[0] += 1;
        } else if n <= MID_BAND_MAX {
            bands[1] += 1;
        } else {
            bands[2] += 1;
        }
    }
    bands
}

pub fn decade_of(num: u8) -> usize {
    (((num - 1) / 10) as usize).min(DECADE_BUCKETS - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::stats::test_support::synthetic_history;

    #[test]
    fn test_empty_history_is_neutral() {
        let p = PatternAnalysis::compute(&[]);
        assert_eq!(p.conformity(&[1, 2, 3, 4, 5]), 0.5);
    }

    #[test]
    fn test_odd_hist_sums_to_one() {
        let p = PatternAnalysis::compute(&synthetic_history(80));
        assert!((p.odd_hist.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_band_counts() {
        assert_eq!(band_counts(&[1, 23, 24, 46, 47]), [2, 2, 1]);
        assert_eq!(band_counts(&[1, 2, 3, 4, 5]), [5, 0, 0]);
    }

    #[test]
    fn test_decade_of() {
        assert_eq!(decade_of(1), 0);
        assert_eq!(decade_of(10), 0);
        assert_eq!(decade_of(11), 1);
        assert_eq!(decade_of(69), 6);
    }

    #[test]
    fn test_typical_candidate_beats_degenerate() {
        let p = PatternAnalysis::compute(&synthetic_history(120));
        // A spread, mixed-parity candidate near the historical sum mean.
        let typical = [7, 19, 33, 48, 61];
        // All-low cluster with an extreme sum.
        let degenerate = [1, 2, 3, 4, 5];
        assert!(p.conformity(&typical) > p.conformity(&degenerate));
    }

    #[test]
    fn test_conformity_in_unit_range() {
        let p = PatternAnalysis::compute(&synthetic_history(60));
        for candidate in [[1, 2, 3, 4, 5], [5, 17, 29, 42, 65], [65, 66, 67, 68, 69]] {
            let c = p.conformity(&candidate);
            assert!((0.0..=1.0).contains(&c), "conformity {} out of range", c);
        }
    }
}
