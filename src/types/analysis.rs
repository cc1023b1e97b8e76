use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::market::{Side, Timeframe};
use super::structure::{
    BreakOfStructure, CandlestickPattern, FairValueGap, LiquidityGrab, OrderBlock, VolumeProfile,
};

/// Composite multi-timeframe signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::StrongBuy => "STRONG_BUY",
            SignalKind::Buy => "BUY",
            SignalKind::Hold => "HOLD",
            SignalKind::Sell => "SELL",
            SignalKind::StrongSell => "STRONG_SELL",
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, SignalKind::StrongBuy | SignalKind::Buy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, SignalKind::StrongSell | SignalKind::Sell)
    }

    pub fn is_strong(&self) -> bool {
        matches!(self, SignalKind::StrongBuy | SignalKind::StrongSell)
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Uptrend,
    Downtrend,
    Sideways,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Uptrend => "uptrend",
            TrendDirection::Downtrend => "downtrend",
            TrendDirection::Sideways => "sideways",
        }
    }

    pub fn supports(&self, side: Side) -> bool {
        matches!(
            (self, side),
            (TrendDirection::Uptrend, Side::Long) | (TrendDirection::Downtrend, Side::Short)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl TrendStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendStrength::Weak => "weak",
            TrendStrength::Moderate => "moderate",
            TrendStrength::Strong => "strong",
            TrendStrength::VeryStrong => "very_strong",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendInfo {
    pub direction: TrendDirection,
    pub strength: TrendStrength,
    pub confidence: f64,
}

impl Default for TrendInfo {
    fn default() -> Self {
        Self {
            direction: TrendDirection::Sideways,
            strength: TrendStrength::Weak,
            confidence: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdCrossover {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub crossover: Option<MacdCrossover>,
    pub histogram: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollingerIndicator {
    pub squeeze: bool,
    /// Band width as percent of price
    pub width: f64,
}

/// Indicator values for one timeframe. Fields are optional because the
/// analyzer emits only what the candle history supports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorBundle {
    pub rsi_14: Option<f64>,
    pub macd: Option<MacdIndicator>,
    pub ema_50: Option<f64>,
    pub atr_14: Option<f64>,
    pub adx: Option<f64>,
    /// Current volume relative to its rolling average
    pub volume_ratio: Option<f64>,
    pub bollinger: Option<BollingerIndicator>,
}

/// Full analysis of one (symbol, timeframe)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeframeAnalysis {
    pub current_price: f64,
    #[serde(default)]
    pub indicators: IndicatorBundle,
    #[serde(default)]
    pub trend: TrendInfo,
    /// Support levels below price, nearest first
    #[serde(default)]
    pub support_levels: Vec<f64>,
    /// Resistance levels above price, nearest first
    #[serde(default)]
    pub resistance_levels: Vec<f64>,
    #[serde(default)]
    pub patterns: Vec<CandlestickPattern>,
    #[serde(default)]
    pub order_blocks: Vec<OrderBlock>,
    #[serde(default)]
    pub fair_value_gaps: Vec<FairValueGap>,
    #[serde(default)]
    pub liquidity_grabs: Vec<LiquidityGrab>,
    #[serde(default)]
    pub break_of_structure: Option<BreakOfStructure>,
    #[serde(default)]
    pub volume_profile: Option<VolumeProfile>,
}

impl TimeframeAnalysis {
    pub fn new(current_price: f64) -> Self {
        Self {
            current_price,
            indicators: IndicatorBundle::default(),
            trend: TrendInfo::default(),
            support_levels: Vec::new(),
            resistance_levels: Vec::new(),
            patterns: Vec::new(),
            order_blocks: Vec::new(),
            fair_value_gaps: Vec::new(),
            liquidity_grabs: Vec::new(),
            break_of_structure: None,
            volume_profile: None,
        }
    }
}

/// Aggregated signal across analyzed timeframes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeSignal {
    pub signal: SignalKind,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Momentum score in [-10, 10]
    pub score: f64,
    /// Cross-timeframe agreement in [0, 1]
    pub alignment: f64,
    pub buy_signals: u32,
    pub sell_signals: u32,
    pub hold_signals: u32,
}

impl Default for CompositeSignal {
    fn default() -> Self {
        Self {
            signal: SignalKind::Hold,
            confidence: 0.5,
            score: 0.0,
            alignment: 0.5,
            buy_signals: 0,
            sell_signals: 0,
            hold_signals: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CvdSignal {
    BullishAbsorption,
    BearishAbsorption,
    AggressiveBuying,
    AggressiveSelling,
    Neutral,
}

/// Cumulative volume delta read-out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvdAnalysis {
    pub signal: CvdSignal,
    /// Aggressor buy volume / aggressor sell volume
    pub aggressive_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhaleActivity {
    Accumulation,
    Distribution,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    StrongBearish,
}

impl FlowDirection {
    pub fn is_bullish(&self) -> bool {
        matches!(self, FlowDirection::StrongBullish | FlowDirection::Bullish)
    }

    pub fn is_bearish(&self) -> bool {
        matches!(self, FlowDirection::StrongBearish | FlowDirection::Bearish)
    }
}

/// Large-order flow summary from the whale detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhaleAnalysis {
    pub activity: WhaleActivity,
    pub flow: FlowDirection,
    pub confidence: f64,
}

/// Complete per-symbol analysis handed to the scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetAnalysis {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub timeframes: BTreeMap<Timeframe, TimeframeAnalysis>,
    pub composite: CompositeSignal,
    #[serde(default)]
    pub cvd: Option<CvdAnalysis>,
    #[serde(default)]
    pub whale: Option<WhaleAnalysis>,
}

impl AssetAnalysis {
    /// Bare analysis with a neutral composite, used as a scoring fallback
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            timestamp: Utc::now(),
            timeframes: BTreeMap::new(),
            composite: CompositeSignal::default(),
            cvd: None,
            whale: None,
        }
    }

    pub fn timeframe(&self, tf: Timeframe) -> Option<&TimeframeAnalysis> {
        self.timeframes.get(&tf)
    }

    /// The lowest analyzed timeframe; drives entry timing
    pub fn entry_timeframe(&self) -> Option<Timeframe> {
        self.timeframes.keys().next().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_helpers() {
        assert!(SignalKind::StrongBuy.is_buy());
        assert!(SignalKind::Sell.is_sell());
        assert!(!SignalKind::Hold.is_buy());
        assert!(SignalKind::StrongSell.is_strong());
        assert!(!SignalKind::Buy.is_strong());
    }

    #[test]
    fn test_entry_timeframe_is_lowest() {
        let mut analysis = AssetAnalysis::empty("BTC/USDT");
        analysis
            .timeframes
            .insert(Timeframe::H4, TimeframeAnalysis::new(50_000.0));
        analysis
            .timeframes
            .insert(Timeframe::H1, TimeframeAnalysis::new(50_000.0));
        assert_eq!(analysis.entry_timeframe(), Some(Timeframe::H1));
    }

    #[test]
    fn test_signal_serde_wire_format() {
        let json = serde_json::to_string(&SignalKind::StrongBuy).unwrap();
        assert_eq!(json, "\"STRONG_BUY\"");
    }

    #[test]
    fn test_trend_supports() {
        assert!(TrendDirection::Uptrend.supports(Side::Long));
        assert!(!TrendDirection::Sideways.supports(Side::Long));
        assert!(!TrendDirection::Sideways.supports(Side::Short));
    }
}
