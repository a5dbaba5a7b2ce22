//! Adaptive analysis window sizing.
//!
//! The window over draw history widens when recent white-ball frequencies
//! are stable and narrows when they are volatile: variance of per-number
//! appearance counts over the last 50 draws is interpolated linearly into
//! a window of 50 to 200 draws, capped at history length.

use crate::domain::models::{Draw, WHITE_MAX};

/// Draws sampled when measuring frequency variance.
const VARIANCE_SAMPLE: usize = 50;
/// Smallest window the interpolation can produce.
pub const MIN_WINDOW: usize = 50;
/// Largest window the interpolation can produce.
pub const MAX_WINDOW: usize = 200;
/// Variance at or below this maps to the largest window.
const LOW_VARIANCE: f64 = 2.0;
/// Variance at or above this maps to the smallest window.
const HIGH_VARIANCE: f64 = 8.0;

/// Compute the adaptive window size for `draws` (ordered oldest to newest).
pub fn adaptive_window(draws: &[Draw]) -> usize {
    if draws.len() <= MIN_WINDOW {
        return draws.len();
    }

    let sample = &draws[draws.len().saturating_sub(VARIANCE_SAMPLE)..];
    let variance = frequency_variance(sample);

    let fraction = ((variance - LOW_VARIANCE) / (HIGH_VARIANCE - LOW_VARIANCE)).clamp(0.0, 1.0);
    // High variance -> short window.
    let window = MAX_WINDOW as f64 - fraction * (MAX_WINDOW - MIN_WINDOW) as f64;
    (window.round() as usize).min(draws.len())
}

/// Variance of per-number white-ball appearance counts over `draws`.
pub fn frequency_variance(draws: &[Draw]) -> f64 {
    let mut counts = [0u32; WHITE_MAX as usize];
    for draw in draws {
        for &n in &draw.white {
            counts[(n - 1) as usize] += 1;
        }
    }

    let mean = counts.iter().sum::<u32>() as f64 / counts.len() as f64;
    counts
        .iter()
        .map(|&c| {
            let d = c as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / counts.len() as f64
}
