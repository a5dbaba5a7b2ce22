//! Gap/drought model: absence duration and return probability.

use crate::domain::models::{Draw, SPECIAL_MAX, WHITE_MAX};

/// Expected white-ball appearance frequency per draw (5 of 69).
const WHITE_EXPECTED_FREQ: f64 = 5.0 / 69.0;
/// Expected special-number appearance frequency per draw (1 of 26).
const SPECIAL_EXPECTED_FREQ: f64 = 1.0 / 26.0;

/// Gaps and Poisson-style return probabilities for both pools.
#[derive(Debug, Clone)]
pub struct GapAnalysis {
    /// Draws since each white number last appeared.
    pub white_gap: Vec<u32>,
    pub special_gap: Vec<u32>,
    /// Normalized return probabilities; each vector sums to 1.
    pub white_return: Vec<f64>,
    pub special_return: Vec<f64>,
}

impl GapAnalysis {
    pub fn uniform() -> Self {
        Self {
            white_gap: vec![0; WHITE_MAX as usize],
            special_gap: vec![0; SPECIAL_MAX as usize],
            white_return: vec![1.0 / WHITE_MAX as f64; WHITE_MAX as usize],
            special_return: vec![1.0 / SPECIAL_MAX as f64; SPECIAL_MAX as usize],
        }
    }

    /// Compute gaps over `draws` (oldest to newest).
    ///
    /// A number that never appeared has gap = history length. Return
    /// probability is proportional to `1 - exp(-expected_freq * gap)`.
    pub fn compute(draws: &[Draw]) -> Self {
        if draws.is_empty() {
            return Self::uniform();
        }

        let white_gap = gaps(draws, WHITE_MAX, |draw, n| draw.white.contains(&n));
        let special_gap = gaps(draws, SPECIAL_MAX, |draw, n| draw.special == n);

        Self {
            white_return: return_probabilities(&white_gap, WHITE_EXPECTED_FREQ),
            special_return: return_probabilities(&special_gap, SPECIAL_EXPECTED_FREQ),
            white_gap,
            special_gap,
        }
    }
}

/// Scan newest-first, stopping at the first occurrence of each number.
fn gaps<F>(draws: &[Draw], max: u8, contains: F) -> Vec<u32>
where
    F: Fn(&Draw, u8) -> bool,
{
    (1..=max)
        .map(|n| {
            draws
                .iter()
                .rev()
                .position(|draw| contains(draw, n))
                .unwrap_or(draws.len()) as u32
        })
        .collect()
}

fn return_probabilities(gaps: &[u32], expected_freq: f64) -> Vec<f64> {
    let raw: Vec<f64> = gaps
        .iter()
        .map(|&g| 1.0 - (-expected_freq * g as f64).exp())
        .collect();
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return vec![1.0 / gaps.len() as f64; gaps.len()];
    }
    raw.into_iter().map(|p| p / total).collect()
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
        let g = GapAnalysis::compute(&[]);
        assert!((g.white_return.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(g.white_gap.iter().all(|&x| x == 0));
    }

    #[test]
    fn test_gap_counts() {
        let draws = vec![
            draw("2025-01-01", [1, 2, 3, 4, 5], 6),
            draw("2025-01-04", [10, 20, 30, 40, 50], 7),
            draw("2025-01-06", [1, 11, 21, 31, 41], 8),
        ];
        let g = GapAnalysis::compute(&draws);
        // 1 appeared in the newest draw.
        assert_eq!(g.white_gap[0], 0);
        // 10 appeared one draw back.
        assert_eq!(g.white_gap[9], 1);
        // 2 appeared two draws back.
        assert_eq!(g.white_gap[1], 2);
    }

    #[test]
    fn test_never_appeared_number_has_max_gap_and_max_return() {
        // Number 7 never appears in a 3-draw history.
        let draws = vec![
            draw("2025-01-01", [1, 2, 3, 4, 5], 6),
            draw("2025-01-04", [10, 20, 30, 40, 50], 7),
            draw("2025-01-06", [11, 21, 31, 41, 51], 8),
        ];
        let g = GapAnalysis::compute(&draws);
        assert_eq!(g.white_gap[6], 3);

        let max = g
            .white_return
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        assert!((g.white_return[6] - max).abs() < 1e-12);
    }

    #[test]
    fn test_return_probabilities_sum_to_one() {
        let draws = vec![
            draw("2025-01-01", [1, 2, 3, 4, 5], 6),
            draw("2025-01-04", [10, 20, 30, 40, 50], 7),
        ];
        let g = GapAnalysis::compute(&draws);
        assert!((g.white_return.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        assert!((g.special_return.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_all_zero_gaps_fall_back_to_uniform() {
        let v = return_probabilities(&[0, 0, 0], 0.1);
        assert_eq!(v, vec![1.0 / 3.0; 3]);
    }
}
