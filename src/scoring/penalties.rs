//! Phase A - penalty scoring
//!
//! Penalties run before any positive evidence is counted and can drive the
//! raw score negative. Three families:
//! - signal quality (HOLD composites, low confidence)
//! - intraday volume droughts on scalping timeframes
//! - MACD crossovers against the trade direction on intraday timeframes

use crate::types::{AssetAnalysis, MacdCrossover, Side, SignalKind, Timeframe};

const INTRADAY_TIMEFRAMES: [Timeframe; 3] = [Timeframe::M1, Timeframe::M5, Timeframe::M15];

#[derive(Debug, Clone)]
pub struct PenaltyOutcome {
    pub total: f64,
    pub applied: Vec<String>,
}

impl PenaltyOutcome {
    fn new() -> Self {
        Self {
            total: 0.0,
            applied: Vec::new(),
        }
    }

    fn apply(&mut self, amount: f64, label: &str) {
        self.total += amount;
        self.applied.push(format!("{} ({:.1})", label, amount));
    }
}

pub fn apply_penalties(analysis: &AssetAnalysis, side: Side) -> PenaltyOutcome {
    let mut outcome = PenaltyOutcome::new();
    let composite = &analysis.composite;

    if composite.signal == SignalKind::Hold {
        outcome.apply(-2.0, "hold_signal");
        if composite.confidence < 0.5 {
            outcome.apply(-1.0, "hold_low_confidence");
        }
    }

    if composite.confidence < 0.4 {
        outcome.apply(-1.5, "very_low_confidence");
    }

    let entry_tf = analysis.entry_timeframe();
    if entry_tf.map(|tf| tf.is_intraday()).unwrap_or(false) {
        apply_volume_penalties(analysis, entry_tf.unwrap_or(Timeframe::M15), &mut outcome);
    }

    apply_macd_penalties(analysis, side, &mut outcome);

    outcome
}

/// Low volume on scalping timeframes. Tiered so a dead entry timeframe
/// hurts more than a quiet neighbor.
fn apply_volume_penalties(analysis: &AssetAnalysis, entry_tf: Timeframe, outcome: &mut PenaltyOutcome) {
    for tf in INTRADAY_TIMEFRAMES {
        let Some(ratio) = analysis
            .timeframe(tf)
            .and_then(|t| t.indicators.volume_ratio)
        else {
            continue;
        };

        if ratio < 0.3 {
            let amount = if tf == entry_tf { -2.0 } else { -1.5 };
            outcome.apply(amount, &format!("dead_volume_{}", tf));
        } else if ratio < 0.5 {
            let amount = match tf {
                Timeframe::M1 => -1.5,
                Timeframe::M5 => -1.0,
                _ => -0.5,
            };
            outcome.apply(amount, &format!("low_volume_{}", tf));
        } else if ratio < 0.7 && tf == entry_tf {
            outcome.apply(-0.5, &format!("soft_volume_{}", tf));
        }
    }
}

/// MACD crossovers against the trade direction on intraday timeframes
fn apply_macd_penalties(analysis: &AssetAnalysis, side: Side, outcome: &mut PenaltyOutcome) {
    let opposing = match side {
        Side::Long => MacdCrossover::Bearish,
        Side::Short => MacdCrossover::Bullish,
    };

    let opposing_count = INTRADAY_TIMEFRAMES
        .iter()
        .filter(|tf| {
            analysis
                .timeframe(**tf)
                .and_then(|t| t.indicators.macd.as_ref())
                .and_then(|m| m.crossover)
                == Some(opposing)
        })
        .count();

    if opposing_count >= 2 {
        outcome.apply(-1.5, "macd_against_direction_multi");
    } else if opposing_count == 1 {
        outcome.apply(-0.5, "macd_against_direction");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompositeSignal, MacdIndicator, TimeframeAnalysis};

    fn base_analysis(signal: SignalKind, confidence: f64) -> AssetAnalysis {
        let mut analysis = AssetAnalysis::empty("SOL/USDT");
        analysis.composite = CompositeSignal {
            signal,
            confidence,
            ..CompositeSignal::default()
        };
        analysis
    }

    fn with_intraday_tf(analysis: &mut AssetAnalysis, tf: Timeframe, volume_ratio: f64) {
        let mut tfa = TimeframeAnalysis::new(100.0);
        tfa.indicators.volume_ratio = Some(volume_ratio);
        analysis.timeframes.insert(tf, tfa);
    }

    #[test]
    fn test_no_penalties_for_clean_buy() {
        let analysis = base_analysis(SignalKind::Buy, 0.7);
        let outcome = apply_penalties(&analysis, Side::Long);
        assert_eq!(outcome.total, 0.0);
        assert!(outcome.applied.is_empty());
    }

    #[test]
    fn test_hold_penalties() {
        let outcome = apply_penalties(&base_analysis(SignalKind::Hold, 0.6), Side::Long);
        assert_eq!(outcome.total, -2.0);

        let outcome = apply_penalties(&base_analysis(SignalKind::Hold, 0.45), Side::Long);
        assert_eq!(outcome.total, -3.0);

        let outcome = apply_penalties(&base_analysis(SignalKind::Hold, 0.35), Side::Long);
        assert_eq!(outcome.total, -4.5);
    }

    #[test]
    fn test_low_confidence_without_hold() {
        let outcome = apply_penalties(&base_analysis(SignalKind::Buy, 0.3), Side::Long);
        assert_eq!(outcome.total, -1.5);
    }

    #[test]
    fn test_dead_volume_on_entry_timeframe() {
        let mut analysis = base_analysis(SignalKind::Buy, 0.7);
        with_intraday_tf(&mut analysis, Timeframe::M5, 0.2);
        // entry timeframe is 5m (lowest present)
        let outcome = apply_penalties(&analysis, Side::Long);
        assert_eq!(outcome.total, -2.0);
        assert!(outcome.applied[0].contains("dead_volume_5m"));
    }

    #[test]
    fn test_dead_volume_on_other_timeframe() {
        let mut analysis = base_analysis(SignalKind::Buy, 0.7);
        with_intraday_tf(&mut analysis, Timeframe::M1, 0.8);
        with_intraday_tf(&mut analysis, Timeframe::M15, 0.25);
        let outcome = apply_penalties(&analysis, Side::Long);
        // 15m is not the entry timeframe (1m is)
        assert_eq!(outcome.total, -1.5);
    }

    #[test]
    fn test_tiered_low_volume_bands() {
        let mut analysis = base_analysis(SignalKind::Buy, 0.7);
        with_intraday_tf(&mut analysis, Timeframe::M1, 0.45);
        with_intraday_tf(&mut analysis, Timeframe::M5, 0.45);
        with_intraday_tf(&mut analysis, Timeframe::M15, 0.45);
        let outcome = apply_penalties(&analysis, Side::Long);
        // -1.5 (1m) -1.0 (5m) -0.5 (15m)
        assert_eq!(outcome.total, -3.0);
    }

    #[test]
    fn test_soft_volume_only_on_entry() {
        let mut analysis = base_analysis(SignalKind::Buy, 0.7);
        with_intraday_tf(&mut analysis, Timeframe::M5, 0.65);
        with_intraday_tf(&mut analysis, Timeframe::M15, 0.65);
        let outcome = apply_penalties(&analysis, Side::Long);
        // only the 5m entry timeframe draws the soft-volume penalty
        assert_eq!(outcome.total, -0.5);
    }

    #[test]
    fn test_volume_penalties_skipped_for_swing_entries() {
        let mut analysis = base_analysis(SignalKind::Buy, 0.7);
        let mut h1 = TimeframeAnalysis::new(100.0);
        h1.indicators.volume_ratio = Some(0.1);
        analysis.timeframes.insert(Timeframe::H1, h1);
        let outcome = apply_penalties(&analysis, Side::Long);
        assert_eq!(outcome.total, 0.0);
    }

    #[test]
    fn test_macd_counter_trend() {
        let mut analysis = base_analysis(SignalKind::Buy, 0.7);
        for tf in [Timeframe::M5, Timeframe::M15] {
            let mut tfa = TimeframeAnalysis::new(100.0);
            tfa.indicators.volume_ratio = Some(1.0);
            tfa.indicators.macd = Some(MacdIndicator {
                crossover: Some(MacdCrossover::Bearish),
                histogram: -0.5,
            });
            analysis.timeframes.insert(tf, tfa);
        }
        let outcome = apply_penalties(&analysis, Side::Long);
        assert_eq!(outcome.total, -1.5);

        // Same crossovers support a short
        let outcome = apply_penalties(&analysis, Side::Short);
        assert_eq!(outcome.total, 0.0);
    }

    #[test]
    fn test_single_macd_counter_trend() {
        let mut analysis = base_analysis(SignalKind::Sell, 0.7);
        let mut tfa = TimeframeAnalysis::new(100.0);
        tfa.indicators.volume_ratio = Some(1.0);
        tfa.indicators.macd = Some(MacdIndicator {
            crossover: Some(MacdCrossover::Bullish),
            histogram: 0.5,
        });
        analysis.timeframes.insert(Timeframe::M15, tfa);
        let outcome = apply_penalties(&analysis, Side::Short);
        assert_eq!(outcome.total, -0.5);
    }
}
