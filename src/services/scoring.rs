//! Multi-dimensional ticket quality scoring.
//!
//! Scores any 5+1 combination, self-generated or externally supplied, on
//! four axes in [0, 1] and blends them into an overall score used for
//! ranking.

use serde::{Deserialize, Serialize};

use crate::domain::models::{Draw, WHITE_COUNT};
use crate::services::stats::patterns::{band_counts, decade_of, DECADE_BUCKETS};
use crate::services::stats::PatternAnalysis;

/// Blend weights for the overall score.
const DIVERSITY_WEIGHT: f64 = 0.25;
const BALANCE_WEIGHT: f64 = 0.25;
const PATTERN_WEIGHT: f64 = 0.35;
const SIMILARITY_WEIGHT: f64 = 0.15;

/// Ideal low/mid/high split for a 5-number ticket.
const IDEAL_BANDS: [f64; 3] = [2.0, 2.0, 1.0];
/// Historical draws considered for similarity.
const SIMILARITY_LOOKBACK: usize = 100;
/// Jaccard similarity considered optimal: overlapping history somewhat
/// without duplicating it.
const OPTIMAL_SIMILARITY: f64 = 0.5;

/// Qualitative label for the balance axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioQuality {
    Balanced,
    Moderate,
    Unbalanced,
}

impl RatioQuality {
    fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Balanced
        } else if score >= 0.6 {
            Self::Moderate
        } else {
            Self::Unbalanced
        }
    }
}

/// Per-axis scores for one ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketScore {
    pub diversity: f64,
    pub balance: f64,
    pub ratio_quality: RatioQuality,
    pub pattern: f64,
    pub similarity: f64,
    pub overall: f64,
}

pub struct ScoringEngine<'a> {
    patterns: &'a PatternAnalysis,
    /// Most recent draws, newest last.
    history: &'a [Draw],
}

impl<'a> ScoringEngine<'a> {
    pub fn new(patterns: &'a PatternAnalysis, history: &'a [Draw]) -> Self {
        Self { patterns, history }
    }

    pub fn score(&self, white: &[u8; WHITE_COUNT]) -> TicketScore {
        let diversity = diversity_score(white);
        let balance = balance_score(white);
        let pattern = self.patterns.conformity(white);
        let similarity = self.similarity_score(white);

        TicketScore {
            diversity,
            balance,
            ratio_quality: RatioQuality::from_score(balance),
            pattern,
            similarity,
            overall: DIVERSITY_WEIGHT * diversity
                + BALANCE_WEIGHT * balance
                + PATTERN_WEIGHT * pattern
                + SIMILARITY_WEIGHT * similarity,
        }
    }

    /// Max Jaccard similarity against the recent history, scored by
    /// closeness to the optimal midpoint rather than at either extreme.
    fn similarity_score(&self, white: &[u8; WHITE_COUNT]) -> f64 {
        let start = self.history.len().saturating_sub(SIMILARITY_LOOKBACK);
        let max_similarity = self.history[start..]
            .iter()
            .map(|draw| jaccard(white, &draw.white))
            .fold(0.0f64, f64::max);

        1.0 - (max_similarity - OPTIMAL_SIMILARITY).abs() / OPTIMAL_SIMILARITY.max(1.0 - OPTIMAL_SIMILARITY)
    }
}

/// Normalized Shannon entropy of the ticket's spread across decade bins.
pub fn diversity_score(white: &[u8; WHITE_COUNT]) -> f64 {
    let mut bins = [0u8; DECADE_BUCKETS];
    for &n in white {
        bins[decade_of(n)] += 1;
    }

    let total = WHITE_COUNT as f64;
    let entropy: f64 = bins
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum();

    entropy / (DECADE_BUCKETS as f64).log2()
}

/// 1 minus the total deviation from the ideal 2/2/1 low/mid/high split,
/// normalized by the ticket size.
pub fn balance_score(white: &[u8; WHITE_COUNT]) -> f64 {
    let bands = band_counts(white);
    let deviation: f64 = bands
        .iter()
        .zip(&IDEAL_BANDS)
        .map(|(&c, &ideal)| (c as f64 - ideal).abs())
        .sum();
    (1.0 - deviation / WHITE_COUNT as f64).max(0.0)
}

fn jaccard(a: &[u8; WHITE_COUNT], b: &[u8; WHITE_COUNT]) -> f64 {
    let intersection = a.iter().filter(|x| b.contains(x)).count() as f64;
    let union = (WHITE_COUNT * 2) as f64 - intersection;
    intersection / union
}

/// Mean/std/min/max per axis over a scored batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisSummary {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub diversity: AxisSummary,
    pub balance: AxisSummary,
    pub pattern: AxisSummary,
    pub similarity: AxisSummary,
    pub overall: AxisSummary,
}

pub fn summarize(scores: &[TicketScore]) -> Option<BatchSummary> {
    if scores.is_empty() {
        return None;
    }
    Some(BatchSummary {
        diversity: axis(scores.iter().map(|s| s.diversity)),
        balance: axis(scores.iter().map(|s| s.balance)),
        pattern: axis(scores.iter().map(|s| s.pattern)),
        similarity: axis(scores.iter().map(|s| s.similarity)),
        overall: axis(scores.iter().map(|s| s.overall)),
    })
}

fn axis(values: impl Iterator<Item = f64>) -> AxisSummary {
    let values: Vec<f64> = values.collect();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    AxisSummary {
        mean,
        std: var.sqrt(),
        min: values.iter().cloned().fold(f64::INFINITY, f64::min),
        max: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    }
}
