//! Confluence scoring
//!
//! The scorer composes heterogeneous evidence (trend, momentum, order flow,
//! smart-money structure, session timing, whale activity, volume profile)
//! into one raw score on a 20-point scale. It runs in two phases:
//!
//! - Phase A: penalties. Weak or contradictory conditions subtract first,
//!   and can push the raw score negative (floor -5.0).
//! - Phase B: positive components, each capped individually.
//!
//! Normalization to the canonical 0-10 scale happens downstream in
//! `normalizer`; the raw value is kept for diagnostics.

mod components;
mod penalties;
mod probability;
pub mod normalizer;

pub use probability::estimate_probability;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logger::{self, LogTag};
use crate::session::TradingSession;
use crate::types::{AssetAnalysis, CompositeSignal, Side, Timeframe, TimeframeAnalysis, TrendDirection};
use crate::utils::{clamp, round2};

pub const RAW_SCORE_FLOOR: f64 = -5.0;
pub const RAW_SCORE_CEILING: f64 = 20.0;

/// Context the scanner supplies alongside the analysis
#[derive(Debug, Clone)]
pub struct ScoreInputs {
    /// Planned reward-to-risk ratio from the entry plan
    pub risk_reward: f64,
    /// Current trading session
    pub session: TradingSession,
    /// Reference-asset (BTC) 4h trend direction, when known
    pub btc_trend: Option<TrendDirection>,
}

/// Per-component record of how the raw score came together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Signed contribution per component
    pub components: BTreeMap<String, f64>,
    pub penalties_applied: Vec<String>,
    pub penalties_total: f64,
    pub warnings: Vec<String>,
    /// Raw total in [-5, 20]; rewritten to the normalized value downstream
    pub total: f64,
}

/// Infer the trade direction from the composite signal. BUY-family signals
/// go long, SELL-family short; HOLD falls back to the per-timeframe vote
/// counts (ties go long).
pub fn infer_side(composite: &CompositeSignal) -> Side {
    if composite.signal.is_buy() {
        Side::Long
    } else if composite.signal.is_sell() {
        Side::Short
    } else if composite.buy_signals >= composite.sell_signals {
        Side::Long
    } else {
        Side::Short
    }
}

/// Primary timeframe for structural evidence: 4h when analyzed, otherwise
/// the highest timeframe available.
pub(crate) fn structural_tf(analysis: &AssetAnalysis) -> Option<&TimeframeAnalysis> {
    analysis
        .timeframe(Timeframe::H4)
        .or_else(|| analysis.timeframes.values().next_back())
}

pub struct ConfluenceScorer;

impl ConfluenceScorer {
    /// Score one candidate. Never fails: missing evidence simply
    /// contributes nothing.
    pub fn score(analysis: &AssetAnalysis, side: Side, inputs: &ScoreInputs) -> ScoreBreakdown {
        let mut components = BTreeMap::new();
        let mut warnings = Vec::new();

        // Phase A - penalties first
        let penalty = penalties::apply_penalties(analysis, side);
        if let Some(warning) = penalty_warning(penalty.total) {
            warnings.push(warning);
        }

        // Phase B - positive components
        components::score_classic_ta(analysis, side, &mut components);
        components::score_order_flow(analysis, side, inputs, &mut components);
        components::score_smart_money(analysis, side, &mut components);
        components::score_bonuses(analysis, side, inputs, &mut components);

        let positive: f64 = components.values().sum();
        let total = clamp(
            positive + penalty.total,
            RAW_SCORE_FLOOR,
            RAW_SCORE_CEILING,
        );

        logger::debug(
            LogTag::Scoring,
            &format!(
                "{} {}: raw={:.2} positive={:.2} penalties={:.2}",
                analysis.symbol,
                side,
                total,
                positive,
                penalty.total
            ),
        );

        ScoreBreakdown {
            components,
            penalties_applied: penalty.applied,
            penalties_total: round2(penalty.total),
            warnings,
            total: round2(total),
        }
    }
}

/// Severity-banded warning derived from the penalty total
fn penalty_warning(penalties_total: f64) -> Option<String> {
    if penalties_total <= -6.0 {
        Some(format!(
            "CRITICAL: confluence severely degraded (penalties {:.1})",
            penalties_total
        ))
    } else if penalties_total <= -4.0 {
        Some(format!(
            "HIGH RISK: heavy penalties applied ({:.1})",
            penalties_total
        ))
    } else if penalties_total <= -2.0 {
        Some(format!(
            "Warning: notable penalties applied ({:.1})",
            penalties_total
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        CandlestickPattern, CompositeSignal, PatternKind, SignalKind, TrendInfo, TrendStrength,
    };

    fn analysis_with(
        signal: SignalKind,
        confidence: f64,
        score: f64,
        alignment: f64,
    ) -> AssetAnalysis {
        let mut analysis = AssetAnalysis::empty("ETH/USDT");
        analysis.composite = CompositeSignal {
            signal,
            confidence,
            score,
            alignment,
            buy_signals: 3,
            sell_signals: 1,
            hold_signals: 0,
        };
        let mut h1 = TimeframeAnalysis::new(3000.0);
        h1.indicators.volume_ratio = Some(1.0);
        analysis.timeframes.insert(Timeframe::H1, h1);
        let mut h4 = TimeframeAnalysis::new(3000.0);
        h4.indicators.volume_ratio = Some(1.0);
        h4.indicators.adx = Some(24.0);
        h4.trend = TrendInfo {
            direction: TrendDirection::Uptrend,
            strength: TrendStrength::Strong,
            confidence: 0.7,
        };
        analysis.timeframes.insert(Timeframe::H4, h4);
        analysis
    }

    fn inputs() -> ScoreInputs {
        ScoreInputs {
            risk_reward: 2.0,
            session: TradingSession::European,
            btc_trend: Some(TrendDirection::Uptrend),
        }
    }

    #[test]
    fn test_infer_side() {
        let mut composite = CompositeSignal::default();
        composite.signal = SignalKind::StrongBuy;
        assert_eq!(infer_side(&composite), Side::Long);

        composite.signal = SignalKind::Sell;
        assert_eq!(infer_side(&composite), Side::Short);

        composite.signal = SignalKind::Hold;
        composite.buy_signals = 2;
        composite.sell_signals = 3;
        assert_eq!(infer_side(&composite), Side::Short);

        // Tie goes long
        composite.sell_signals = 2;
        assert_eq!(infer_side(&composite), Side::Long);
    }

    #[test]
    fn test_strong_setup_scores_high() {
        let mut analysis = analysis_with(SignalKind::StrongBuy, 0.8, 8.0, 0.85);
        if let Some(h4) = analysis.timeframes.get_mut(&Timeframe::H4) {
            h4.patterns.push(CandlestickPattern {
                name: "bullish_engulfing".to_string(),
                kind: PatternKind::Bullish,
                reliability: 0.7,
            });
            h4.indicators.volume_ratio = Some(2.1);
            h4.indicators.adx = Some(31.0);
        }
        let breakdown = ConfluenceScorer::score(&analysis, Side::Long, &inputs());
        assert!(breakdown.total > 8.0, "total={}", breakdown.total);
        assert!(breakdown.penalties_applied.is_empty());
        // Alignment 0.85 -> 2.0 base, +0.5 trend match capped at 2.0
        assert_eq!(breakdown.components["trend_alignment"], 2.0);
        assert_eq!(breakdown.components["indicator_strength"], 2.0);
        assert_eq!(breakdown.components["pattern"], 1.0);
    }

    #[test]
    fn test_hold_penalty_stack() {
        // HOLD + conf 0.35 triggers all three signal penalties
        let analysis = analysis_with(SignalKind::Hold, 0.35, 1.0, 0.4);
        let breakdown = ConfluenceScorer::score(&analysis, Side::Long, &inputs());
        assert_eq!(breakdown.penalties_total, -4.5);
        assert_eq!(breakdown.penalties_applied.len(), 3);
        assert!(breakdown
            .warnings
            .iter()
            .any(|w| w.starts_with("HIGH RISK")));
    }

    #[test]
    fn test_raw_floor() {
        let mut analysis = analysis_with(SignalKind::Hold, 0.1, 0.0, 0.0);
        // Pile on counter-trend MACD penalties across intraday timeframes
        for tf in [Timeframe::M1, Timeframe::M5, Timeframe::M15] {
            let mut tfa = TimeframeAnalysis::new(3000.0);
            tfa.indicators.volume_ratio = Some(0.1);
            tfa.indicators.macd = Some(crate::types::MacdIndicator {
                crossover: Some(crate::types::MacdCrossover::Bearish),
                histogram: -1.0,
            });
            analysis.timeframes.insert(tf, tfa);
        }
        let breakdown = ConfluenceScorer::score(&analysis, Side::Long, &inputs());
        assert_eq!(breakdown.total, RAW_SCORE_FLOOR);
        assert!(breakdown
            .warnings
            .iter()
            .any(|w| w.starts_with("CRITICAL")));
    }

    #[test]
    fn test_breakdown_total_matches_sum_when_unclamped() {
        let analysis = analysis_with(SignalKind::Buy, 0.7, 5.0, 0.7);
        let breakdown = ConfluenceScorer::score(&analysis, Side::Long, &inputs());
        let expected: f64 =
            breakdown.components.values().sum::<f64>() + breakdown.penalties_total;
        assert!((breakdown.total - round2(expected)).abs() < 1e-9);
    }
}
