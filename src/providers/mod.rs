//! Consumed external interfaces
//!
//! The engine depends on these trait seams, never on concrete exchange or
//! indicator implementations. Optional capabilities ship with null objects
//! (`null` module) so the scanner degrades gracefully when a subsystem is
//! absent instead of branching on `Option` everywhere.

pub mod null;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ScanError;
use crate::types::{
    AssetAnalysis, Candle, MarketType, Ticker, Timeframe, VolumeProfile, WhaleAnalysis,
};

/// Open position as reported by the account provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPosition {
    pub symbol: String,
    pub side: String,
    pub size: f64,
}

/// Account snapshot; `balance_total` is None when the exchange withholds it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountInfo {
    pub balance_total: Option<f64>,
    pub positions: Vec<OpenPosition>,
}

/// Full-universe ticker feed. An empty result is a fatal API condition.
#[async_trait]
pub trait TickerSource: Send + Sync {
    async fn get_all_tickers(&self, market_type: MarketType) -> Result<Vec<Ticker>, ScanError>;
}

/// Technical analysis provider (indicators, trend, patterns, structure)
#[async_trait]
pub trait AssetAnalyzer: Send + Sync {
    async fn analyze_asset(
        &self,
        symbol: &str,
        timeframes: &[Timeframe],
        include_patterns: bool,
    ) -> Result<AssetAnalysis, ScanError>;
}

/// Raw OHLCV feed, consumed by the opening-range breakout detector
#[async_trait]
pub trait CandleSource: Send + Sync {
    async fn get_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, ScanError>;
}

/// Pairwise Pearson correlation in [-1, 1]
#[async_trait]
pub trait CorrelationProvider: Send + Sync {
    async fn correlation(&self, symbol_a: &str, symbol_b: &str) -> Result<f64, ScanError>;
}

/// Account balance and open positions
#[async_trait]
pub trait AccountProvider: Send + Sync {
    async fn account_info(&self) -> Result<AccountInfo, ScanError>;
}

/// Optional large-order flow detector
#[async_trait]
pub trait WhaleDetector: Send + Sync {
    fn available(&self) -> bool {
        true
    }

    async fn detect_whale_activity(&self, symbol: &str) -> Result<WhaleAnalysis, ScanError>;
}

/// Optional volume profile analyzer
#[async_trait]
pub trait VolumeProfileAnalyzer: Send + Sync {
    fn available(&self) -> bool {
        true
    }

    async fn volume_profile(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<VolumeProfile, ScanError>;
}
