//! Tier classification
//!
//! Five-tier quality system instead of a binary approve/reject, so position
//! sizing can scale down with setup quality. Classification is a pure
//! function of (normalized score, probability, risk/reward); first matching
//! rule wins:
//!
//! - elite:           score >= 8.0, prob >= 0.75, R:R >= 2.5
//! - professional:    score >= 6.5, prob >= 0.65, R:R >= 2.0
//! - speculative:     score >= 5.0, prob >= 0.55, R:R >= 1.5
//! - high_risk:       score >= 4.0
//! - not_recommended: everything else

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Elite,
    Professional,
    Speculative,
    HighRisk,
    NotRecommended,
}

impl Tier {
    /// Classify an opportunity into a quality tier.
    ///
    /// `score` is the normalized 0-10 confluence score, `probability` the
    /// estimated win probability, `risk_reward` the planned R:R ratio.
    pub fn classify(score: f64, probability: f64, risk_reward: f64) -> Tier {
        if score >= 8.0 && probability >= 0.75 && risk_reward >= 2.5 {
            Tier::Elite
        } else if score >= 6.5 && probability >= 0.65 && risk_reward >= 2.0 {
            Tier::Professional
        } else if score >= 5.0 && probability >= 0.55 && risk_reward >= 1.5 {
            Tier::Speculative
        } else if score >= 4.0 {
            Tier::HighRisk
        } else {
            Tier::NotRecommended
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Elite => "elite",
            Tier::Professional => "professional",
            Tier::Speculative => "speculative",
            Tier::HighRisk => "high_risk",
            Tier::NotRecommended => "not_recommended",
        }
    }

    /// Color glyph for console and report output
    pub fn color(&self) -> &'static str {
        match self {
            Tier::Elite => "🟢",
            Tier::Professional => "🟡",
            Tier::Speculative => "🟠",
            Tier::HighRisk => "🔴",
            Tier::NotRecommended => "⛔",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Elite => "Elite",
            Tier::Professional => "Professional",
            Tier::Speculative => "Speculative",
            Tier::HighRisk => "High Risk",
            Tier::NotRecommended => "Not Recommended",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Tier::Elite => "OPEN - excellent setup with 75%+ expected win rate",
            Tier::Professional => "CAUTION - good setup, reduce position size (65-74% win rate)",
            Tier::Speculative => {
                "HIGH RISK - experienced traders only, minimum size (55-64% win rate)"
            }
            Tier::HighRisk => "NOT RECOMMENDED - low confluence (<55%), paper trade only",
            Tier::NotRecommended => "SKIP - setup too weak (<50% win rate)",
        }
    }

    /// Multiplier applied to the base position size (base = 2% account risk)
    pub fn size_multiplier(&self) -> f64 {
        match self {
            Tier::Elite => 1.0,
            Tier::Professional => 0.75,
            Tier::Speculative => 0.5,
            Tier::HighRisk => 0.25,
            Tier::NotRecommended => 0.0,
        }
    }

    pub fn expected_win_rate(&self) -> f64 {
        match self {
            Tier::Elite => 0.75,
            Tier::Professional => 0.68,
            Tier::Speculative => 0.58,
            Tier::HighRisk => 0.48,
            Tier::NotRecommended => 0.35,
        }
    }

    /// Only the top three tiers are tradeable
    pub fn tradeable(&self) -> bool {
        matches!(self, Tier::Elite | Tier::Professional | Tier::Speculative)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elite_boundary() {
        assert_eq!(Tier::classify(8.0, 0.75, 2.5), Tier::Elite);
        // One notch under each gate drops out of elite
        assert_eq!(Tier::classify(7.9, 0.74, 2.4), Tier::Professional);
    }

    #[test]
    fn test_professional_boundary() {
        assert_eq!(Tier::classify(6.5, 0.65, 2.0), Tier::Professional);
        assert_eq!(Tier::classify(6.4, 0.64, 1.9), Tier::Speculative);
    }

    #[test]
    fn test_speculative_boundary() {
        assert_eq!(Tier::classify(5.0, 0.55, 1.5), Tier::Speculative);
        // Fails probability gate but clears the score-only high-risk rule
        assert_eq!(Tier::classify(5.0, 0.54, 1.5), Tier::HighRisk);
    }

    #[test]
    fn test_high_risk_ignores_probability_and_rr() {
        assert_eq!(Tier::classify(4.0, 0.0, 0.0), Tier::HighRisk);
        assert_eq!(Tier::classify(3.99, 0.9, 5.0), Tier::NotRecommended);
    }

    #[test]
    fn test_high_score_with_weak_rr_falls_through() {
        // Elite score but R:R below every tradeable gate
        assert_eq!(Tier::classify(9.0, 0.9, 1.0), Tier::HighRisk);
    }

    #[test]
    fn test_lookups_are_consistent() {
        for tier in [
            Tier::Elite,
            Tier::Professional,
            Tier::Speculative,
            Tier::HighRisk,
            Tier::NotRecommended,
        ] {
            assert!(!tier.display_name().is_empty());
            assert!(!tier.recommendation().is_empty());
            assert!(tier.expected_win_rate() > 0.0 && tier.expected_win_rate() < 1.0);
        }
        assert_eq!(Tier::Elite.size_multiplier(), 1.0);
        assert_eq!(Tier::NotRecommended.size_multiplier(), 0.0);
        assert!(Tier::Speculative.tradeable());
        assert!(!Tier::HighRisk.tradeable());
    }

    #[test]
    fn test_classify_is_idempotent() {
        let first = Tier::classify(7.2, 0.7, 2.2);
        let second = Tier::classify(7.2, 0.7, 2.2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&Tier::NotRecommended).unwrap(),
            "\"not_recommended\""
        );
    }
}
