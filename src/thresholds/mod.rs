//! Adaptive acceptance thresholds
//!
//! Base threshold is 7.0/10 per direction. The regime shifts it: trading
//! with a strong trend gets a lower bar, trading against it a higher one,
//! volatility and trend strength nudge both. Results are clamped to
//! [5.0, 9.0] and rounded to one decimal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logger::{self, LogTag};
use crate::regime::{MarketRegime, RegimeType, Volatility};
use crate::types::Side;
use crate::utils::{clamp, round1};

const BASE_THRESHOLD: f64 = 7.0;
const THRESHOLD_FLOOR: f64 = 5.0;
const THRESHOLD_CEILING: f64 = 9.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveThresholds {
    pub long: f64,
    pub short: f64,
    pub regime_type: RegimeType,
    pub volatility: Volatility,
    pub adx: f64,
    /// Human-readable record of every adjustment applied
    pub adjustments: BTreeMap<String, String>,
    pub reasoning: String,
}

impl AdaptiveThresholds {
    /// Calculate per-direction thresholds from the detected regime
    pub fn calculate(regime: &MarketRegime) -> AdaptiveThresholds {
        let regime_type = regime.regime_type;
        let volatility = regime.metrics.volatility;
        let adx = regime.metrics.adx;

        let mut long = BASE_THRESHOLD;
        let mut short = BASE_THRESHOLD;
        let mut adjustments = BTreeMap::new();

        match regime_type {
            RegimeType::StrongBull => {
                long -= 1.0;
                short += 1.5;
                adjustments.insert(
                    "regime".to_string(),
                    "LONG -1.0, SHORT +1.5 (strong bull)".to_string(),
                );
            }
            RegimeType::StrongBear => {
                long += 1.5;
                short -= 1.0;
                adjustments.insert(
                    "regime".to_string(),
                    "LONG +1.5, SHORT -1.0 (strong bear)".to_string(),
                );
            }
            RegimeType::Sideways => {
                adjustments.insert(
                    "regime".to_string(),
                    "No adjustment (sideways)".to_string(),
                );
            }
            RegimeType::Uncertain => {
                long += 0.5;
                short += 0.5;
                adjustments.insert(
                    "regime".to_string(),
                    "LONG +0.5, SHORT +0.5 (uncertain, be cautious)".to_string(),
                );
            }
        }

        match volatility {
            Volatility::High => {
                long += 0.5;
                short += 0.5;
                adjustments.insert(
                    "volatility".to_string(),
                    "Both +0.5 (high volatility)".to_string(),
                );
            }
            Volatility::VeryLow => {
                long -= 0.25;
                short -= 0.25;
                adjustments.insert(
                    "volatility".to_string(),
                    "Both -0.25 (very low volatility)".to_string(),
                );
            }
            _ => {
                adjustments.insert(
                    "volatility".to_string(),
                    "No adjustment (normal volatility)".to_string(),
                );
            }
        }

        // Very strong trends make with-trend entries easier still
        if adx > 35.0 {
            match regime_type {
                RegimeType::StrongBull => {
                    long -= 0.25;
                    adjustments.insert(
                        "trend_strength".to_string(),
                        "LONG -0.25 (very strong uptrend)".to_string(),
                    );
                }
                RegimeType::StrongBear => {
                    short -= 0.25;
                    adjustments.insert(
                        "trend_strength".to_string(),
                        "SHORT -0.25 (very strong downtrend)".to_string(),
                    );
                }
                _ => {}
            }
        }

        let long = round1(clamp(long, THRESHOLD_FLOOR, THRESHOLD_CEILING));
        let short = round1(clamp(short, THRESHOLD_FLOOR, THRESHOLD_CEILING));

        let reasoning = format!(
            "Regime: {}, Vol: {}, ADX: {:.1} -> LONG {:.1}, SHORT {:.1}",
            regime_type.as_str(),
            volatility.as_str(),
            adx,
            long,
            short
        );
        logger::info(LogTag::Thresholds, &reasoning);

        AdaptiveThresholds {
            long,
            short,
            regime_type,
            volatility,
            adx,
            adjustments,
            reasoning,
        }
    }

    pub fn for_side(&self, side: Side) -> f64 {
        match side {
            Side::Long => self.long,
            Side::Short => self.short,
        }
    }

    /// Why the threshold for a direction sits where it does
    pub fn explanation(regime_type: RegimeType, side: Side) -> &'static str {
        match (regime_type, side) {
            (RegimeType::StrongBull, Side::Long) => {
                "Threshold lowered - the bull trend supports LONG entries"
            }
            (RegimeType::StrongBull, Side::Short) => {
                "Threshold raised - SHORT against the trend needs high conviction"
            }
            (RegimeType::StrongBear, Side::Long) => {
                "Threshold raised - LONG against the trend needs high conviction"
            }
            (RegimeType::StrongBear, Side::Short) => {
                "Threshold lowered - the bear trend supports SHORT entries"
            }
            (RegimeType::Sideways, _) => "Base threshold - range-bound market, neutral criteria",
            (RegimeType::Uncertain, _) => "Threshold raised - uncertainty demands caution",
        }
    }
}
