//! Smart display selection
//!
//! Turns a ranked direction partition into at most three annotated
//! opportunities. The golden rule: never fail on empty input - the caller
//! always gets a well-formed (possibly empty) list, and a separate report
//! explains an empty direction.
//!
//! Each displayed opportunity gets a recommendation band from its score and
//! tier relative to the adaptive threshold, plus a regime warning (and a
//! downgrade) when it trades against a strong reference trend.

use serde::{Deserialize, Serialize};

use crate::logger::{self, LogTag};
use crate::regime::{MarketRegime, RegimeType};
use crate::scanner::types::Opportunity;
use crate::tiers::Tier;
use crate::types::Side;
use crate::utils::round2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationLevel {
    StrongBuy,
    CautiousBuy,
    Speculative,
    Avoid,
    Skip,
}

impl RecommendationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationLevel::StrongBuy => "strong_buy",
            RecommendationLevel::CautiousBuy => "cautious_buy",
            RecommendationLevel::Speculative => "speculative",
            RecommendationLevel::Avoid => "avoid",
            RecommendationLevel::Skip => "skip",
        }
    }

    /// Bands stronger than `speculative` get downgraded on regime conflicts
    fn stronger_than_speculative(&self) -> bool {
        matches!(
            self,
            RecommendationLevel::StrongBuy | RecommendationLevel::CautiousBuy
        )
    }
}

/// Report returned when a direction has nothing to show
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoOpportunitiesReport {
    pub direction: Side,
    pub count: usize,
    pub message: String,
    pub explanation: String,
    pub what_we_wait_for: String,
    /// True when an empty direction is the expected outcome of the regime
    pub is_normal: bool,
}

pub struct SmartDisplay;

impl SmartDisplay {
    /// Select up to three opportunities (input is sorted by score
    /// descending; ranking preserves input order) and annotate each.
    pub fn select_top_with_warnings(
        opportunities: &[Opportunity],
        threshold: f64,
        regime: &MarketRegime,
    ) -> Vec<Opportunity> {
        let mut result = Vec::new();

        for (idx, opportunity) in opportunities.iter().take(3).enumerate() {
            let mut enhanced = opportunity.clone();
            annotate_opportunity(&mut enhanced, idx + 1, threshold, regime);
            result.push(enhanced);
        }

        if result.len() < 3 {
            logger::debug(
                LogTag::Display,
                &format!(
                    "Only {} opportunities available for display, target was 3",
                    result.len()
                ),
            );
        }

        result
    }

    /// Explain an empty direction instead of returning nothing
    pub fn no_opportunities_report(
        direction: Side,
        regime: &MarketRegime,
        total_scanned: usize,
    ) -> NoOpportunitiesReport {
        let regime_type = regime.regime_type;
        NoOpportunitiesReport {
            direction,
            count: 0,
            message: format!(
                "No {} opportunities found across {} scanned assets",
                direction.as_str().to_uppercase(),
                total_scanned
            ),
            explanation: explain_empty(direction, regime_type).to_string(),
            what_we_wait_for: wait_conditions(direction).to_string(),
            is_normal: is_empty_normal(direction, regime_type),
        }
    }
}

/// Attach rank, recommendation band, regime warning and threshold
/// metadata to one opportunity. Shared by the top-3 selection and the
/// scanner's never-empty top-up.
pub(crate) fn annotate_opportunity(
    opportunity: &mut Opportunity,
    rank: usize,
    threshold: f64,
    regime: &MarketRegime,
) {
    opportunity.rank = Some(rank);
    apply_recommendation_band(opportunity, threshold);
    apply_regime_warning(opportunity, regime);
    opportunity.threshold_used = Some(threshold);
    opportunity.meets_threshold = Some(opportunity.score >= threshold);
    opportunity.score_vs_threshold = Some(round2(opportunity.score - threshold));
}

fn apply_recommendation_band(opportunity: &mut Opportunity, threshold: f64) {
    let score = opportunity.score;
    let tier = opportunity.tier;

    if score >= threshold && tier == Tier::Elite {
        opportunity.warning = None;
        opportunity.display_recommendation =
            Some("EXCELLENT SETUP - recommended for execution".to_string());
        opportunity.recommendation_level = Some(RecommendationLevel::StrongBuy);
    } else if score >= threshold && tier == Tier::Professional {
        opportunity.warning =
            Some("Professional tier - consider reduced position size".to_string());
        opportunity.display_recommendation =
            Some("GOOD SETUP - cautiously recommended".to_string());
        opportunity.recommendation_level = Some(RecommendationLevel::CautiousBuy);
    } else if score >= threshold - 0.5
        && !matches!(tier, Tier::NotRecommended | Tier::HighRisk)
    {
        opportunity.warning = Some(format!(
            "Score {:.1} close to threshold {:.1} - extra caution",
            score, threshold
        ));
        opportunity.display_recommendation =
            Some("ACCEPTABLE - experienced traders only, minimum size".to_string());
        opportunity.recommendation_level = Some(RecommendationLevel::Speculative);
    } else if score >= 4.0 {
        opportunity.warning = Some(format!(
            "Score {:.1} BELOW threshold {:.1} - high risk",
            score, threshold
        ));
        opportunity.display_recommendation =
            Some("HIGH RISK - not recommended, paper trade only".to_string());
        opportunity.recommendation_level = Some(RecommendationLevel::Avoid);
    } else {
        opportunity.warning = Some(format!(
            "Score {:.1} VERY LOW - shown for completeness only",
            score
        ));
        opportunity.display_recommendation =
            Some("SKIP - setup too weak, educational only".to_string());
        opportunity.recommendation_level = Some(RecommendationLevel::Skip);
    }
}

fn apply_regime_warning(opportunity: &mut Opportunity, regime: &MarketRegime) {
    let against_trend = match (regime.regime_type, opportunity.side) {
        (RegimeType::StrongBull, Side::Short) => {
            Some("AGAINST TREND: BTC in strong uptrend, SHORT is extremely risky")
        }
        (RegimeType::StrongBear, Side::Long) => {
            Some("AGAINST TREND: BTC in strong downtrend, LONG is extremely risky")
        }
        _ => None,
    };

    match against_trend {
        Some(warning) => {
            opportunity.regime_warning = Some(warning.to_string());
            if opportunity
                .recommendation_level
                .map(|level| level.stronger_than_speculative())
                .unwrap_or(false)
            {
                opportunity.recommendation_level = Some(RecommendationLevel::Speculative);
            }
        }
        None => {
            opportunity.regime_warning = None;
        }
    }
}

fn explain_empty(direction: Side, regime_type: RegimeType) -> &'static str {
    match (direction, regime_type) {
        (Side::Long, RegimeType::StrongBear) => {
            "In a strong bear market LONG opportunities are rare and dangerous; \
             most assets follow BTC down. This is a NORMAL situation."
        }
        (Side::Short, RegimeType::StrongBull) => {
            "In a strong bull market SHORT opportunities are rare and risky; \
             shorting an uptrend is a low-probability strategy. This is a \
             NORMAL situation."
        }
        (Side::Long, _) => {
            "No quality LONG setups currently meet the acceptance criteria. \
             Better to wait for clearer signals."
        }
        (Side::Short, _) => {
            "No quality SHORT setups currently meet the acceptance criteria. \
             Better to wait for clearer signals."
        }
    }
}

fn wait_conditions(direction: Side) -> &'static str {
    match direction {
        Side::Long => {
            "Waiting for: BTC stabilization or upward reversal; oversold \
             conditions across timeframes; volume spike with bullish candles; \
             reversal pattern formation; a test of strong support"
        }
        Side::Short => {
            "Waiting for: BTC weakness or downward reversal; overbought \
             conditions across timeframes; distribution volume with bearish \
             candles; topping pattern formation; a test of strong resistance"
        }
    }
}

fn is_empty_normal(direction: Side, regime_type: RegimeType) -> bool {
    matches!(
        (direction, regime_type),
        (Side::Long, RegimeType::StrongBear) | (Side::Short, RegimeType::StrongBull)
    )
}
