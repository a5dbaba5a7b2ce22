//! Temporal decay model: recency-weighted number probabilities.

use crate::domain::models::{Draw, SPECIAL_MAX, WHITE_MAX};

/// Recency-weighted probability vectors over both number pools.
///
/// Both vectors sum to 1 (uniform when history is empty).
#[derive(Debug, Clone)]
pub struct TemporalWeights {
    pub white: Vec<f64>,
    pub special: Vec<f64>,
}

impl TemporalWeights {
    pub fn uniform() -> Self {
        Self {
            white: vec![1.0 / WHITE_MAX as f64; WHITE_MAX as usize],
            special: vec![1.0 / SPECIAL_MAX as f64; SPECIAL_MAX as usize],
        }
    }

    /// Compute decay-weighted probabilities over `draws` (oldest to newest).
    ///
    /// `weight = exp(-decay_factor * distance)` where distance counts draws
    /// back from the most recent. The special vector only accumulates draws
    /// whose special number falls in the current 1-26 era.
    pub fn compute(draws: &[Draw], decay_factor: f64) -> Self {
        if draws.is_empty() {
            return Self::uniform();
        }

        let mut white = vec![0.0f64; WHITE_MAX as usize];
        let mut special = vec![0.0f64; SPECIAL_MAX as usize];
        let newest = draws.len() - 1;

        for (i, draw) in draws.iter().enumerate() {
            let distance = (newest - i) as f64;
            let weight = (-decay_factor * distance).exp();
            for &n in &draw.white {
                white[(n - 1) as usize] += weight;
            }
            if (1..=SPECIAL_MAX).contains(&draw.special) {
                special[(draw.special - 1) as usize] += weight;
            }
        }

        Self {
            white: normalize(white, WHITE_MAX as usize),
            special: normalize(special, SPECIAL_MAX as usize),
        }
    }
}

/// Normalize to a probability vector; uniform fallback on a zero total.
pub fn normalize(mut v: Vec<f64>, slots: usize) -> Vec<f64> {
    let total: f64 = v.iter().sum();
    if total <= 0.0 {
        return vec![1.0 / slots as f64; slots];
    }
    for x in &mut v {
        *x /= total;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Draw;
    use chrono::NaiveDate;

    fn draw(date: &str, white: [u8; 5], special: u8) -> Draw {
        Draw::new(date.parse::<NaiveDate>().unwrap(), white, special).unwrap()
    }

    #[test]
    fn test_empty_history_is_uniform() {
        let w = TemporalWeights::compute(&[], 0.05);
        assert!((w.white.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!((w.white[0] - 1.0 / 69.0).abs() < 1e-12);
        assert!((w.special[0] - 1.0 / 26.0).abs() < 1e-12);
    }

    #[test]
    fn test_vectors_sum_to_one() {
        let draws = vec![
            draw("2025-01-01", [1, 2, 3, 4, 5], 6),
            draw("2025-01-04", [10, 20, 30, 40, 50], 7),
        ];
        let w = TemporalWeights::compute(&draws, 0.05);
        assert!((w.white.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        assert!((w.special.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_recent_draw_outweighs_older() {
        // Scenario: older draw {1..5}+6, newer draw {10,20,30,40,50}+7.
        let draws = vec![
            draw("2025-01-01", [1, 2, 3, 4, 5], 6),
            draw("2025-01-04", [10, 20, 30, 40, 50], 7),
        ];
        let w = TemporalWeights::compute(&draws, 0.05);
        for newer in [10u8, 20, 30, 40, 50] {
            for older in [1u8, 2, 3, 4, 5] {
                assert!(
                    w.white[(newer - 1) as usize] > w.white[(older - 1) as usize],
                    "{} should outweigh {}",
                    newer,
                    older
                );
            }
        }
        assert!(w.special[6] > w.special[5]);
    }

    #[test]
    fn test_normalize_zero_total_falls_back_to_uniform() {
        let v = normalize(vec![0.0; 4], 4);
        assert_eq!(v, vec![0.25; 4]);
    }
}
