//! Momentum model: short-window vs long-window frequency trend.

use crate::domain::models::{Draw, SPECIAL_MAX, WHITE_MAX};

/// Per-number momentum scores plus rising/falling leader boards.
#[derive(Debug, Clone)]
pub struct MomentumScores {
    pub white: Vec<f64>,
    pub special: Vec<f64>,
    /// Top 10 white numbers by momentum.
    pub rising: Vec<u8>,
    /// Bottom 10 white numbers by momentum.
    pub falling: Vec<u8>,
}

impl MomentumScores {
    pub fn neutral() -> Self {
        Self {
            white: vec![0.0; WHITE_MAX as usize],
            special: vec![0.0; SPECIAL_MAX as usize],
            rising: Vec::new(),
            falling: Vec::new(),
        }
    }

    /// Compute momentum over `draws` (oldest to newest).
    ///
    /// `momentum = (short_freq - long_freq) / long_freq`, with 1.0 when a
    /// number is absent from the long window but present in the short one.
    /// Histories shorter than the short window are all-neutral.
    pub fn compute(draws: &[Draw], short_window: usize, long_window: usize) -> Self {
        if draws.len() < short_window {
            return Self::neutral();
        }

        let short = &draws[draws.len() - short_window.min(draws.len())..];
        let long = &draws[draws.len() - long_window.min(draws.len())..];

        let white = momentum_vector(
            &white_frequencies(short),
            short.len(),
            &white_frequencies(long),
            long.len(),
        );
        let special = momentum_vector(
            &special_frequencies(short),
            short.len(),
            &special_frequencies(long),
            long.len(),
        );

        let mut ranked: Vec<u8> = (1..=WHITE_MAX).collect();
        ranked.sort_by(|&a, &b| {
            white[(b - 1) as usize]
                .partial_cmp(&white[(a - 1) as usize])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let rising = ranked.iter().take(10).copied().collect();
        let falling = ranked.iter().rev().take(10).copied().collect();

        Self { white, special, rising, falling }
    }
}

fn momentum_vector(
    short_counts: &[u32],
    short_len: usize,
    long_counts: &[u32],
    long_len: usize,
) -> Vec<f64> {
    short_counts
        .iter()
        .zip(long_counts)
        .map(|(&s, &l)| {
            let short_freq = s as f64 / short_len as f64;
            let long_freq = l as f64 / long_len as f64;
            if l == 0 {
                if s > 0 {
                    1.0
                } else {
                    0.0
                }
            } else {
                (short_freq - long_freq) / long_freq
            }
        })
        .collect()
}

fn white_frequencies(draws: &[Draw]) -> Vec<u32> {
    let mut counts = vec![0u32; WHITE_MAX as usize];
    for draw in draws {
        for &n in &draw.white {
            counts[(n - 1) as usize] += 1;
        }
    }
    counts
}

fn special_frequencies(draws: &[Draw]) -> Vec<u32> {
    let mut counts = vec![0u32; SPECIAL_MAX as usize];
    for draw in draws {
        if (1..=SPECIAL_MAX).contains(&draw.special) {
            counts[(draw.special - 1) as usize] += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::stats::test_support::synthetic_history;
    use crate::domain::models::Draw;
    use chrono::NaiveDate;

    #[test]
    fn test_insufficient_history_is_neutral() {
        let draws = synthetic_history(5);
        let m = MomentumScores::compute(&draws, 10, 50);
        assert!(m.white.iter().all(|&x| x == 0.0));
        assert!(m.rising.is_empty());
    }

    #[test]
    fn test_hot_number_rises() {
        // Number 7 appears in every recent draw but never earlier.
        let mut date = "2024-06-01".parse::<NaiveDate>().unwrap();
        let mut draws = Vec::new();
        for _ in 0..40 {
            draws.push(Draw::new(date, [60, 61, 62, 63, 64], 5).unwrap());
            date = date.succ_opt().unwrap();
        }
        for _ in 0..10 {
            draws.push(Draw::new(date, [7, 11, 21, 31, 41], 5).unwrap());
            date = date.succ_opt().unwrap();
        }

        let m = MomentumScores::compute(&draws, 10, 50);
        assert!(m.white[6] > 0.0);
        assert!(m.rising.contains(&7));
        // 60 fell out of the short window entirely.
        assert!(m.white[59] < 0.0);
        assert!(m.falling.contains(&60));
    }

    #[test]
    fn test_absent_from_long_present_in_short_is_one() {
        // 48 draws total: number 3 only in the final 8 (long window = all 48).
        let mut date = "2024-06-01".parse::<NaiveDate>().unwrap();
        let mut draws = Vec::new();
        for _ in 0..40 {
            draws.push(Draw::new(date, [60, 61, 62, 63, 64], 5).unwrap());
            date = date.succ_opt().unwrap();
        }
        for _ in 0..8 {
            draws.push(Draw::new(date, [3, 11, 21, 31, 41], 5).unwrap());
            date = date.succ_opt().unwrap();
        }
        let m = MomentumScores::compute(&draws, 10, 50);
        // 3 is in the long window too (long window covers all 48 draws), so
        // its momentum is finite and positive, not the sentinel 1.0.
        assert!(m.white[2] > 0.0);

        // A history where 3 is wholly absent from the long window is not
        // constructible (long covers short), so the sentinel only fires for
        // long windows truncated by history; verified directly:
        let v = super::momentum_vector(&[1], 10, &[0], 50);
        assert_eq!(v[0], 1.0);
    }

    #[test]
    fn test_leader_boards_have_ten_entries() {
        let draws = synthetic_history(60);
        let m = MomentumScores::compute(&draws, 10, 50);
        assert_eq!(m.rising.len(), 10);
        assert_eq!(m.falling.len(), 10);
    }
}
