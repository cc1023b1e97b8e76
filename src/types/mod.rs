//! Data model shared across the scanning pipeline
//!
//! Everything here is ephemeral per scan: tickers and analyses are rebuilt
//! on every pass and never cached by the engine itself.

pub mod analysis;
pub mod market;
pub mod structure;

pub use analysis::{
    AssetAnalysis, CompositeSignal, CvdAnalysis, CvdSignal, FlowDirection, IndicatorBundle,
    MacdCrossover, MacdIndicator, BollingerIndicator, SignalKind, TimeframeAnalysis, TrendDirection,
    TrendInfo, TrendStrength, WhaleActivity, WhaleAnalysis,
};
pub use market::{Candle, MarketType, Side, Ticker, Timeframe};
pub use structure::{
    BreakOfStructure, CandlestickPattern, FairValueGap, LiquidityGrab, OrderBlock, PatternKind,
    StructureKind, ValueAreaPosition, VolumeProfile,
};
