//! Static win-probability estimator
//!
//! A pure function of the raw score and the composite signal. The output is
//! deliberately conservative: clamped to [0.25, 0.75] so no setup ever
//! reads as a near-certainty. The optional ML predictor can widen this to
//! [0.35, 0.95]; blending happens in the scanner.

use crate::types::{AssetAnalysis, SignalKind};
use crate::utils::{clamp, round2};

const PROB_FLOOR: f64 = 0.25;
const PROB_CEILING: f64 = 0.75;

/// Hard stop for low-conviction HOLD composites
const HOLD_HARD_STOP: f64 = 0.30;

pub fn estimate_probability(raw_score: f64, analysis: &AssetAnalysis) -> f64 {
    let composite = &analysis.composite;

    // A HOLD with weak confidence is not a tradeable opinion at all
    if composite.signal == SignalKind::Hold && composite.confidence < 0.5 {
        return HOLD_HARD_STOP;
    }

    let base = clamp(
        0.25 + raw_score.max(0.0) * 0.025,
        PROB_FLOOR,
        PROB_CEILING,
    );

    let confidence_multiplier = composite.confidence.max(0.3);
    let mut probability = base * confidence_multiplier;

    probability *= match composite.signal {
        SignalKind::StrongBuy | SignalKind::StrongSell => 1.1,
        SignalKind::Buy | SignalKind::Sell => 1.0,
        SignalKind::Hold => 0.5,
    };

    let magnitude = composite.score.abs();
    if magnitude < 3.0 {
        probability *= 0.7;
    } else if magnitude > 7.0 {
        probability *= 1.05;
    }

    round2(clamp(probability, PROB_FLOOR, PROB_CEILING))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompositeSignal;

    fn analysis(signal: SignalKind, confidence: f64, score: f64) -> AssetAnalysis {
        let mut a = AssetAnalysis::empty("ETH/USDT");
        a.composite = CompositeSignal {
            signal,
            confidence,
            score,
            alignment: 0.7,
            buy_signals: 3,
            sell_signals: 1,
            hold_signals: 0,
        };
        a
    }

    #[test]
    fn test_hold_hard_stop() {
        let a = analysis(SignalKind::Hold, 0.45, 1.0);
        assert_eq!(estimate_probability(10.0, &a), 0.30);
    }

    #[test]
    fn test_strong_setup_hits_ceiling() {
        // base = 0.25 + 17 * 0.025 = 0.675, x0.78 conf, x1.1 strong, x1.05
        let a = analysis(SignalKind::StrongBuy, 0.95, 8.0);
        let p = estimate_probability(17.0, &a);
        assert!(p <= 0.75);
        assert!(p >= 0.70, "p={}", p);
    }

    #[test]
    fn test_floor_on_negative_raw_score() {
        let a = analysis(SignalKind::Buy, 0.7, 5.0);
        // Negative raw contributes nothing: base stays at the floor
        let p = estimate_probability(-3.0, &a);
        assert!(p >= 0.25 * 0.7 - 1e-9);
        assert!(p <= 0.25);
    }

    #[test]
    fn test_weak_momentum_discount() {
        let weak = analysis(SignalKind::Buy, 0.8, 1.0);
        let solid = analysis(SignalKind::Buy, 0.8, 5.0);
        assert!(estimate_probability(10.0, &weak) < estimate_probability(10.0, &solid));
    }

    #[test]
    fn test_confidence_floor() {
        // confidence 0.1 still multiplies by at least 0.3
        let a = analysis(SignalKind::Buy, 0.1, 5.0);
        let p = estimate_probability(12.0, &a);
        assert!((p - 0.25).abs() < 1e-9 || p > 0.25);
    }

    #[test]
    fn test_output_bounds_and_rounding() {
        for raw in [-5.0, 0.0, 4.0, 9.5, 14.0, 20.0] {
            let a = analysis(SignalKind::StrongBuy, 0.9, 8.0);
            let p = estimate_probability(raw, &a);
            assert!((0.25..=0.75).contains(&p));
            assert_eq!(p, round2(p));
        }
    }
}
