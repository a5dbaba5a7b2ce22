//! Draw and ticket domain models.
//!
//! A draw is one official lottery result: five distinct white balls in 1-69
//! plus one special number in 1-26. Draws are append-only; tickets are
//! generated predictions evaluated once against their target draw.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Number of white balls per draw.
pub const WHITE_COUNT: usize = 5;
/// Highest white-ball number.
pub const WHITE_MAX: u8 = 69;
/// Highest special number in the current numbering era.
pub const SPECIAL_MAX: u8 = 26;

/// One official lottery result for a specific date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub date: NaiveDate,
    pub white: [u8; WHITE_COUNT],
    pub special: u8,
}

impl Draw {
    pub fn new(date: NaiveDate, white: [u8; WHITE_COUNT], special: u8) -> DomainResult<Self> {
        validate_numbers(&white, special)?;
        Ok(Self { date, white, special })
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_numbers(&self.white, self.special)
    }
}

/// Validate a 5+1 number combination: ranges and pairwise-distinct whites.
pub fn validate_numbers(white: &[u8; WHITE_COUNT], special: u8) -> DomainResult<()> {
    for &n in white {
        if n < 1 || n > WHITE_MAX {
            return Err(DomainError::InvalidDraw(format!(
                "white ball {} out of range (1-{})",
                n, WHITE_MAX
            )));
        }
    }
    if special < 1 || special > SPECIAL_MAX {
        return Err(DomainError::InvalidDraw(format!(
            "special number {} out of range (1-{})",
            special, SPECIAL_MAX
        )));
    }
    for i in 0..white.len() {
        for j in (i + 1)..white.len() {
            if white[i] == white[j] {
                return Err(DomainError::InvalidDraw(format!(
                    "duplicate white ball {}",
                    white[i]
                )));
            }
        }
    }
    Ok(())
}

/// Identifier of the algorithm that produced a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    TemporalFrequency,
    Momentum,
    GapTheory,
    Pattern,
    Hybrid,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        Self::TemporalFrequency,
        Self::Momentum,
        Self::GapTheory,
        Self::Pattern,
        Self::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TemporalFrequency => "temporal_frequency",
            Self::Momentum => "momentum",
            Self::GapTheory => "gap_theory",
            Self::Pattern => "pattern",
            Self::Hybrid => "hybrid",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "temporal_frequency" => Some(Self::TemporalFrequency),
            "momentum" => Some(Self::Momentum),
            "gap_theory" => Some(Self::GapTheory),
            "pattern" => Some(Self::Pattern),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated prediction targeting a future draw.
///
/// Evaluation fields stay `None` until the target draw's official result
/// exists; tickets are evaluated exactly once and never re-mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub draw_date: NaiveDate,
    pub strategy: StrategyKind,
    pub white: [u8; WHITE_COUNT],
    pub special: u8,
    pub confidence: f64,
    pub evaluated: bool,
    pub matches_main: Option<u8>,
    pub matches_special: Option<bool>,
    pub prize_amount: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    pub fn new(
        draw_date: NaiveDate,
        strategy: StrategyKind,
        white: [u8; WHITE_COUNT],
        special: u8,
        confidence: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            draw_date,
            strategy,
            white,
            special,
            confidence: confidence.clamp(0.0, 1.0),
            evaluated: false,
            matches_main: None,
            matches_special: None,
            prize_amount: None,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_numbers(&self.white, self.special)
    }
}
