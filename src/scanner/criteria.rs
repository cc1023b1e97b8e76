//! Scan criteria and universe filtering
//!
//! The universe filter runs before any per-candidate I/O: minimum volume,
//! optional 24h change range, and the stable/stable exclusion. Indicator
//! criteria run after analysis and reject candidates whose 4h indicators
//! miss the requested ranges.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::{AssetAnalysis, MacdCrossover, MarketType, Ticker, Timeframe};

/// Stablecoins and fiat quotes; a pair of any two is dead weight in a scan
static STABLE_AND_FIAT: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "USDT", "USDC", "BUSD", "DAI", "TUSD", "USDP", "USDD", "FRAX", "LUSD", "MIM", "RLUSD",
        "TRY", "BRL", "EUR", "GBP", "AUD", "RUB",
    ]
    .into_iter()
    .collect()
});

/// Price position requirement relative to the 4h EMA-50
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceVsEma {
    Above,
    Below,
}

/// Post-analysis indicator gates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorCriteria {
    /// Inclusive RSI-14 range on the 4h timeframe
    pub rsi_range: Option<(f64, f64)>,
    pub macd_crossover: Option<MacdCrossover>,
    pub price_vs_ema50: Option<PriceVsEma>,
    /// Require an active 4h Bollinger squeeze (breakout preset)
    #[serde(default)]
    pub require_bb_squeeze: bool,
}

impl IndicatorCriteria {
    pub fn is_empty(&self) -> bool {
        self.rsi_range.is_none()
            && self.macd_crossover.is_none()
            && self.price_vs_ema50.is_none()
            && !self.require_bb_squeeze
    }

    /// Check a candidate's 4h indicators against the gates. Missing
    /// indicator values use neutral defaults, mirroring the analyzer's
    /// partial output contract.
    pub fn matches(&self, analysis: &AssetAnalysis) -> bool {
        if self.is_empty() {
            return true;
        }

        let Some(h4) = analysis.timeframe(Timeframe::H4) else {
            return false;
        };

        if let Some((lo, hi)) = self.rsi_range {
            let rsi = h4.indicators.rsi_14.unwrap_or(50.0);
            if rsi < lo || rsi > hi {
                return false;
            }
        }

        if let Some(wanted) = self.macd_crossover {
            let actual = h4.indicators.macd.as_ref().and_then(|m| m.crossover);
            if actual != Some(wanted) {
                return false;
            }
        }

        if let Some(requirement) = self.price_vs_ema50 {
            let price = h4.current_price;
            let ema50 = h4.indicators.ema_50.unwrap_or(0.0);
            match requirement {
                PriceVsEma::Above if price <= ema50 => return false,
                PriceVsEma::Below if price >= ema50 => return false,
                _ => {}
            }
        }

        if self.require_bb_squeeze {
            let squeeze = h4
                .indicators
                .bollinger
                .as_ref()
                .map(|bb| bb.squeeze)
                .unwrap_or(false);
            if !squeeze {
                return false;
            }
        }

        true
    }
}

/// Scan request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanCriteria {
    pub market_type: MarketType,
    pub min_volume_24h: f64,
    /// Inclusive 24h change range in percent
    pub price_change_range: Option<(f64, f64)>,
    #[serde(default)]
    pub indicators: IndicatorCriteria,
    /// Force whale enrichment regardless of volume
    #[serde(default)]
    pub include_whale: bool,
    #[serde(default)]
    pub include_volume_profile: bool,
}

impl Default for ScanCriteria {
    fn default() -> Self {
        Self {
            market_type: MarketType::Spot,
            min_volume_24h: 100_000.0,
            price_change_range: None,
            indicators: IndicatorCriteria::default(),
            include_whale: false,
            include_volume_profile: false,
        }
    }
}

/// Both legs of the pair are stable or fiat: nothing to trade there.
/// The symbol is normalized by stripping `/`, `-` and `:` before the
/// prefix/suffix membership test.
pub fn is_stable_stable_pair(symbol: &str) -> bool {
    let normalized: String = symbol
        .chars()
        .filter(|c| !matches!(c, '/' | '-' | ':'))
        .collect::<String>()
        .to_uppercase();

    let prefix_stable = STABLE_AND_FIAT
        .iter()
        .any(|asset| normalized.starts_with(asset));
    let suffix_stable = STABLE_AND_FIAT
        .iter()
        .any(|asset| normalized.ends_with(asset));

    prefix_stable && suffix_stable
}

/// Pre-analysis universe filter
pub fn passes_universe_filter(ticker: &Ticker, criteria: &ScanCriteria) -> bool {
    if ticker.volume_24h < criteria.min_volume_24h {
        return false;
    }

    if let Some((lo, hi)) = criteria.price_change_range {
        if ticker.change_24h < lo || ticker.change_24h > hi {
            return false;
        }
    }

    !is_stable_stable_pair(&ticker.symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BollingerIndicator, MacdIndicator, TimeframeAnalysis};

    fn ticker(symbol: &str, volume: f64, change: f64) -> Ticker {
        Ticker {
            symbol: symbol.to_string(),
            price: 100.0,
            change_24h: change,
            volume_24h: volume,
            high_24h: 103.0,
            low_24h: 97.0,
            bid: 99.9,
            ask: 100.1,
        }
    }

    #[test]
    fn test_stable_stable_pairs() {
        assert!(is_stable_stable_pair("USDC/USDT"));
        assert!(is_stable_stable_pair("RLUSD/USDT"));
        assert!(is_stable_stable_pair("USDT/TRY"));
        assert!(is_stable_stable_pair("DAI-EUR"));
        assert!(is_stable_stable_pair("usdc:usdt"));
        assert!(!is_stable_stable_pair("BTC/USDT"));
        assert!(!is_stable_stable_pair("USDT/BTC"));
        assert!(!is_stable_stable_pair("ETH/EUR"));
    }

    #[test]
    fn test_universe_filter_volume_and_change() {
        let criteria = ScanCriteria {
            min_volume_24h: 1_000_000.0,
            price_change_range: Some((-5.0, 5.0)),
            ..ScanCriteria::default()
        };
        assert!(passes_universe_filter(
            &ticker("BTC/USDT", 2_000_000.0, 2.0),
            &criteria
        ));
        assert!(!passes_universe_filter(
            &ticker("BTC/USDT", 500_000.0, 2.0),
            &criteria
        ));
        assert!(!passes_universe_filter(
            &ticker("BTC/USDT", 2_000_000.0, 9.0),
            &criteria
        ));
        assert!(!passes_universe_filter(
            &ticker("USDC/USDT", 2_000_000.0, 0.0),
            &criteria
        ));
    }

    fn analysis_with_h4(f: impl FnOnce(&mut TimeframeAnalysis)) -> AssetAnalysis {
        let mut analysis = AssetAnalysis::empty("ETH/USDT");
        let mut h4 = TimeframeAnalysis::new(100.0);
        f(&mut h4);
        analysis.timeframes.insert(Timeframe::H4, h4);
        analysis
    }

    #[test]
    fn test_empty_criteria_always_match() {
        let criteria = IndicatorCriteria::default();
        assert!(criteria.matches(&AssetAnalysis::empty("X/USDT")));
    }

    #[test]
    fn test_rsi_range() {
        let criteria = IndicatorCriteria {
            rsi_range: Some((0.0, 30.0)),
            ..IndicatorCriteria::default()
        };
        let oversold = analysis_with_h4(|h4| h4.indicators.rsi_14 = Some(25.0));
        let neutral = analysis_with_h4(|h4| h4.indicators.rsi_14 = Some(55.0));
        assert!(criteria.matches(&oversold));
        assert!(!criteria.matches(&neutral));
        // Missing RSI defaults to 50: outside the oversold band
        let missing = analysis_with_h4(|_| {});
        assert!(!criteria.matches(&missing));
    }

    #[test]
    fn test_macd_crossover_gate() {
        let criteria = IndicatorCriteria {
            macd_crossover: Some(MacdCrossover::Bullish),
            ..IndicatorCriteria::default()
        };
        let bullish = analysis_with_h4(|h4| {
            h4.indicators.macd = Some(MacdIndicator {
                crossover: Some(MacdCrossover::Bullish),
                histogram: 0.4,
            })
        });
        let none = analysis_with_h4(|_| {});
        assert!(criteria.matches(&bullish));
        assert!(!criteria.matches(&none));
    }

    #[test]
    fn test_price_vs_ema() {
        let criteria = IndicatorCriteria {
            price_vs_ema50: Some(PriceVsEma::Above),
            ..IndicatorCriteria::default()
        };
        let above = analysis_with_h4(|h4| h4.indicators.ema_50 = Some(95.0));
        let below = analysis_with_h4(|h4| h4.indicators.ema_50 = Some(105.0));
        assert!(criteria.matches(&above));
        assert!(!criteria.matches(&below));
    }

    #[test]
    fn test_bb_squeeze_gate() {
        let criteria = IndicatorCriteria {
            require_bb_squeeze: true,
            ..IndicatorCriteria::default()
        };
        let squeezed = analysis_with_h4(|h4| {
            h4.indicators.bollinger = Some(BollingerIndicator {
                squeeze: true,
                width: 1.2,
            })
        });
        let wide = analysis_with_h4(|h4| {
            h4.indicators.bollinger = Some(BollingerIndicator {
                squeeze: false,
                width: 6.0,
            })
        });
        assert!(criteria.matches(&squeezed));
        assert!(!criteria.matches(&wide));
        assert!(!criteria.matches(&analysis_with_h4(|_| {})));
    }

    #[test]
    fn test_missing_h4_fails_non_empty_criteria() {
        let criteria = IndicatorCriteria {
            rsi_range: Some((0.0, 100.0)),
            ..IndicatorCriteria::default()
        };
        assert!(!criteria.matches(&AssetAnalysis::empty("X/USDT")));
    }
}
