//! Market regime detection
//!
//! The reference asset (BTC) sets the weather for the whole scan: a strong
//! trend there shifts the acceptance thresholds for every candidate. The
//! detector classifies {strong_bull, strong_bear, sideways, uncertain} from
//! the reference analysis and never fails - missing data degrades to
//! `uncertain` with reduced confidence.

pub mod snapshot;

use serde::{Deserialize, Serialize};

use crate::logger::{self, LogTag};
use crate::types::{
    AssetAnalysis, SignalKind, Timeframe, TrendDirection, TrendStrength,
};
use crate::utils::{round1, round2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeType {
    StrongBull,
    StrongBear,
    Sideways,
    Uncertain,
}

impl RegimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegimeType::StrongBull => "strong_bull",
            RegimeType::StrongBear => "strong_bear",
            RegimeType::Sideways => "sideways",
            RegimeType::Uncertain => "uncertain",
        }
    }
}

impl std::fmt::Display for RegimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// ATR-relative volatility band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    VeryLow,
    Low,
    Normal,
    Elevated,
    High,
}

impl Volatility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Volatility::VeryLow => "very_low",
            Volatility::Low => "low",
            Volatility::Normal => "normal",
            Volatility::Elevated => "elevated",
            Volatility::High => "high",
        }
    }
}

/// Metrics the regime decision was based on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeMetrics {
    pub btc_weekly_change_pct: f64,
    pub adx: f64,
    pub signal: SignalKind,
    pub signal_confidence: f64,
    pub volatility: Volatility,
    pub atr_14: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketRegime {
    #[serde(rename = "type")]
    pub regime_type: RegimeType,
    pub confidence: f64,
    pub metrics: RegimeMetrics,
    pub description: String,
    pub trading_implications: String,
}

impl MarketRegime {
    /// Regime used when the reference analysis itself failed. Lower
    /// confidence than the organic `uncertain` outcome.
    pub fn fallback() -> Self {
        Self {
            regime_type: RegimeType::Uncertain,
            confidence: 0.30,
            metrics: RegimeMetrics {
                btc_weekly_change_pct: 0.0,
                adx: 20.0,
                signal: SignalKind::Hold,
                signal_confidence: 0.5,
                volatility: Volatility::Normal,
                atr_14: 0.0,
            },
            description: describe(RegimeType::Uncertain).to_string(),
            trading_implications: implications(RegimeType::Uncertain).to_string(),
        }
    }
}

pub struct RegimeDetector;

impl RegimeDetector {
    /// Detect the current market regime from the reference-asset analysis.
    ///
    /// Total function: partial analyses fall back to neutral metric
    /// defaults and classify as `uncertain`.
    pub fn detect(reference: &AssetAnalysis) -> MarketRegime {
        let composite = &reference.composite;
        let h4 = reference.timeframe(Timeframe::H4);

        let weekly_change = weekly_change_estimate(reference);
        let adx = h4
            .and_then(|tf| tf.indicators.adx)
            .unwrap_or(20.0);
        let atr = h4.and_then(|tf| tf.indicators.atr_14).unwrap_or(0.0);
        let volatility = classify_volatility(atr, estimate_avg_atr(atr));

        let signal = composite.signal;
        let signal_confidence = composite.confidence;

        let (regime_type, confidence) = if weekly_change > 5.0
            && adx > 25.0
            && signal.is_buy()
            && signal_confidence > 0.6
        {
            let conf = (0.75 + adx / 100.0 + signal_confidence * 0.2).min(0.95);
            logger::info(
                LogTag::Regime,
                &format!(
                    "Detected STRONG BULL: reference +{:.1}%, ADX={:.1}",
                    weekly_change, adx
                ),
            );
            (RegimeType::StrongBull, conf)
        } else if weekly_change < -5.0
            && adx > 25.0
            && signal.is_sell()
            && signal_confidence > 0.6
        {
            let conf = (0.75 + adx / 100.0 + signal_confidence * 0.2).min(0.95);
            logger::info(
                LogTag::Regime,
                &format!(
                    "Detected STRONG BEAR: reference {:.1}%, ADX={:.1}",
                    weekly_change, adx
                ),
            );
            (RegimeType::StrongBear, conf)
        } else if weekly_change.abs() < 2.0 && adx < 20.0 {
            logger::info(
                LogTag::Regime,
                &format!(
                    "Detected SIDEWAYS: reference {:.1}%, ADX={:.1}",
                    weekly_change, adx
                ),
            );
            (RegimeType::Sideways, 0.70)
        } else {
            logger::info(
                LogTag::Regime,
                &format!(
                    "Detected UNCERTAIN: mixed signals, reference {:.1}%, ADX={:.1}",
                    weekly_change, adx
                ),
            );
            (RegimeType::Uncertain, 0.50)
        };

        MarketRegime {
            regime_type,
            confidence: round2(confidence),
            metrics: RegimeMetrics {
                btc_weekly_change_pct: round2(weekly_change),
                adx: round1(adx),
                signal,
                signal_confidence: round2(signal_confidence),
                volatility,
                atr_14: round2(atr),
            },
            description: describe(regime_type).to_string(),
            trading_implications: implications(regime_type).to_string(),
        }
    }
}

/// Approximate the weekly price change from the composite momentum score,
/// clamped by the 1d trend. Acknowledged-approximate: a real 1w OHLC fetch
/// would replace this single function.
fn weekly_change_estimate(reference: &AssetAnalysis) -> f64 {
    let mut estimate = reference.composite.score * 0.5;

    if let Some(d1) = reference.timeframe(Timeframe::D1) {
        let floor = match d1.trend.strength {
            TrendStrength::VeryStrong => 7.0,
            TrendStrength::Strong => 5.0,
            TrendStrength::Moderate => 3.0,
            TrendStrength::Weak => 0.0,
        };
        match d1.trend.direction {
            TrendDirection::Uptrend if floor > 0.0 => estimate = estimate.max(floor),
            TrendDirection::Downtrend if floor > 0.0 => estimate = estimate.min(-floor),
            _ => {}
        }
    }

    round2(estimate)
}

/// Baseline ATR for the volatility ratio. Without historical averages the
/// current reading plus a 10% buffer stands in for the mean.
fn estimate_avg_atr(current_atr: f64) -> f64 {
    current_atr * 1.1
}

fn classify_volatility(current_atr: f64, avg_atr: f64) -> Volatility {
    if avg_atr == 0.0 || current_atr == 0.0 {
        return Volatility::Normal;
    }

    let ratio = current_atr / avg_atr;

    if ratio > 1.5 {
        Volatility::High
    } else if ratio > 1.2 {
        Volatility::Elevated
    } else if ratio < 0.7 {
        Volatility::VeryLow
    } else if ratio < 0.9 {
        Volatility::Low
    } else {
        Volatility::Normal
    }
}

fn describe(regime: RegimeType) -> &'static str {
    match regime {
        RegimeType::StrongBull => "Strong bullish trend - upward momentum, focus on LONG setups",
        RegimeType::StrongBear => "Strong bearish trend - downward momentum, focus on SHORT setups",
        RegimeType::Sideways => "Range-bound market - no clear trend, range trading conditions",
        RegimeType::Uncertain => "Mixed signals - no clear regime, trade with caution",
    }
}

fn implications(regime: RegimeType) -> &'static str {
    match regime {
        RegimeType::StrongBull => {
            "Relax LONG thresholds, tighten SHORT thresholds. Follow the trend."
        }
        RegimeType::StrongBear => {
            "Tighten LONG thresholds, relax SHORT thresholds. Short the bounces."
        }
        RegimeType::Sideways => "Moderate thresholds both ways. Trade the range boundaries.",
        RegimeType::Uncertain => "Strict thresholds both ways. Wait for clarity.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompositeSignal, TimeframeAnalysis, TrendInfo};

    fn reference(
        signal: SignalKind,
        confidence: f64,
        score: f64,
        adx: f64,
        d1_direction: TrendDirection,
        d1_strength: TrendStrength,
    ) -> AssetAnalysis {
        let mut analysis = AssetAnalysis::empty("BTC/USDT");
        analysis.composite = CompositeSignal {
            signal,
            confidence,
            score,
            alignment: 0.8,
            buy_signals: 4,
            sell_signals: 1,
            hold_signals: 1,
        };

        let mut h4 = TimeframeAnalysis::new(50_000.0);
        h4.indicators.adx = Some(adx);
        h4.indicators.atr_14 = Some(800.0);
        analysis.timeframes.insert(Timeframe::H4, h4);

        let mut d1 = TimeframeAnalysis::new(50_000.0);
        d1.trend = TrendInfo {
            direction: d1_direction,
            strength: d1_strength,
            confidence: 0.8,
        };
        analysis.timeframes.insert(Timeframe::D1, d1);

        analysis
    }

    #[test]
    fn test_strong_bull_detection() {
        let analysis = reference(
            SignalKind::StrongBuy,
            0.78,
            15.0,
            32.0,
            TrendDirection::Uptrend,
            TrendStrength::VeryStrong,
        );
        let regime = RegimeDetector::detect(&analysis);
        assert_eq!(regime.regime_type, RegimeType::StrongBull);
        // 0.75 + 0.32 + 0.156 caps at 0.95
        assert!(regime.confidence >= 0.85);
        assert!(regime.metrics.btc_weekly_change_pct > 5.0);
    }

    #[test]
    fn test_strong_bear_detection() {
        let analysis = reference(
            SignalKind::StrongSell,
            0.7,
            -14.0,
            28.0,
            TrendDirection::Downtrend,
            TrendStrength::Strong,
        );
        let regime = RegimeDetector::detect(&analysis);
        assert_eq!(regime.regime_type, RegimeType::StrongBear);
        assert!(regime.metrics.btc_weekly_change_pct < -5.0);
    }

    #[test]
    fn test_sideways_detection() {
        let analysis = reference(
            SignalKind::Hold,
            0.45,
            1.0,
            15.0,
            TrendDirection::Sideways,
            TrendStrength::Weak,
        );
        let regime = RegimeDetector::detect(&analysis);
        assert_eq!(regime.regime_type, RegimeType::Sideways);
        assert_eq!(regime.confidence, 0.70);
    }

    #[test]
    fn test_uncertain_on_mixed_signals() {
        // Momentum up but weak sell signal: none of the strong gates pass
        let analysis = reference(
            SignalKind::Sell,
            0.5,
            8.0,
            30.0,
            TrendDirection::Uptrend,
            TrendStrength::Strong,
        );
        let regime = RegimeDetector::detect(&analysis);
        assert_eq!(regime.regime_type, RegimeType::Uncertain);
        assert_eq!(regime.confidence, 0.50);
    }

    #[test]
    fn test_empty_analysis_degrades_to_uncertain() {
        let regime = RegimeDetector::detect(&AssetAnalysis::empty("BTC/USDT"));
        assert_eq!(regime.regime_type, RegimeType::Uncertain);
        assert!(regime.confidence >= 0.30);
    }

    #[test]
    fn test_fallback_regime() {
        let regime = MarketRegime::fallback();
        assert_eq!(regime.regime_type, RegimeType::Uncertain);
        assert_eq!(regime.confidence, 0.30);
    }

    #[test]
    fn test_volatility_bands() {
        assert_eq!(classify_volatility(0.0, 0.0), Volatility::Normal);
        assert_eq!(classify_volatility(160.0, 100.0), Volatility::High);
        // Exactly 1.5x the baseline stays elevated (strict > for high)
        assert_eq!(classify_volatility(150.0, 100.0), Volatility::Elevated);
        assert_eq!(classify_volatility(125.0, 100.0), Volatility::Elevated);
        assert_eq!(classify_volatility(100.0, 100.0), Volatility::Normal);
        assert_eq!(classify_volatility(85.0, 100.0), Volatility::Low);
        assert_eq!(classify_volatility(60.0, 100.0), Volatility::VeryLow);
    }

    #[test]
    fn test_weekly_change_trend_clamp() {
        // Weak composite score but very strong daily uptrend lifts the floor
        let analysis = reference(
            SignalKind::Buy,
            0.7,
            2.0,
            30.0,
            TrendDirection::Uptrend,
            TrendStrength::VeryStrong,
        );
        assert_eq!(weekly_change_estimate(&analysis), 7.0);
    }
}
