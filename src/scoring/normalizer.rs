//! Score normalization
//!
//! Different scoring systems have floated around this codebase's history
//! (20, 15, 12 and 10-point scales). Every consumer downstream of the
//! scanner sees exactly one scale: 0-10, two decimals. This module is the
//! single conversion point and the validator for the three score aliases
//! every emitted opportunity must carry.

use crate::scanner::types::Opportunity;
use crate::utils::{clamp, round2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSystem {
    TwentyPoint,
    FifteenPoint,
    TwelvePoint,
    TenPoint,
}

impl ScoreSystem {
    pub fn max_score(&self) -> f64 {
        match self {
            ScoreSystem::TwentyPoint => 20.0,
            ScoreSystem::FifteenPoint => 15.0,
            ScoreSystem::TwelvePoint => 12.0,
            ScoreSystem::TenPoint => 10.0,
        }
    }

    /// Guess the system from a raw value's magnitude
    pub fn detect(raw_score: f64) -> ScoreSystem {
        if raw_score > 15.0 {
            ScoreSystem::TwentyPoint
        } else if raw_score > 12.0 {
            ScoreSystem::FifteenPoint
        } else if raw_score > 10.0 {
            ScoreSystem::TwelvePoint
        } else {
            ScoreSystem::TenPoint
        }
    }
}

/// Convert a raw score to the canonical 0-10 scale
pub fn normalize_score(raw_score: f64, system: ScoreSystem) -> f64 {
    if !raw_score.is_finite() || raw_score < 0.0 {
        return 0.0;
    }
    round2(clamp(raw_score / system.max_score() * 10.0, 0.0, 10.0))
}

/// Normalize every score field on an opportunity in place, auto-detecting
/// the source system by magnitude. Negative raw scores floor at 0.
pub fn normalize_opportunity(opportunity: &mut Opportunity) {
    let system = ScoreSystem::detect(opportunity.score);
    normalize_opportunity_with(opportunity, system);
}

/// Normalize with a known source system (the scanner always knows it emits
/// on the 20-point scale).
pub fn normalize_opportunity_with(opportunity: &mut Opportunity, system: ScoreSystem) {
    let normalized = normalize_score(opportunity.score, system);
    opportunity.score = normalized;
    opportunity.confluence_score = normalized;
    opportunity.final_score = normalized;
    opportunity.score_breakdown.total = normalized;
}

/// All three score aliases present, numeric and inside [0, 10]
pub fn validate_score_fields(opportunity: &Opportunity) -> bool {
    [
        opportunity.score,
        opportunity.confluence_score,
        opportunity.final_score,
    ]
    .iter()
    .all(|value| value.is_finite() && (0.0..=10.0).contains(value))
}
