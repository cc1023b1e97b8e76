//! Scanner configuration
//!
//! Every knob has a production default; a TOML file can override any subset.
//! The host application owns where the file lives and when it is loaded.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::Timeframe;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Reference asset that sets the market regime
    pub reference_symbol: String,
    /// Timeframes analyzed for the reference asset and every candidate
    pub scan_timeframes: Vec<Timeframe>,
    /// Concurrent candidate analyses in flight
    pub concurrency: usize,
    /// Candidate pool size = limit * limit_factor, capped at max_candidates
    pub limit_factor: usize,
    pub max_candidates: usize,
    /// Default minimum 24h quote volume for the universe filter
    pub min_volume_24h: f64,
    /// Candidates correlated above this with a held symbol are skipped
    pub correlation_limit: f64,
    /// Correlation cache TTL in seconds
    pub correlation_cache_secs: u64,
    /// Account risk per trade (0.02 = 2%)
    pub risk_percent: f64,
    /// 24h volume above which whale enrichment turns on automatically
    pub whale_volume_threshold: f64,
    /// Raw-score floor for the never-empty top-up
    pub topup_floor_raw: f64,
    /// Signals auto-tracked per scan when tracking is on
    pub default_track_limit: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            reference_symbol: "BTC/USDT".to_string(),
            scan_timeframes: vec![Timeframe::H1, Timeframe::H4],
            concurrency: 10,
            limit_factor: 5,
            max_candidates: 100,
            min_volume_24h: 100_000.0,
            correlation_limit: 0.70,
            correlation_cache_secs: 300,
            risk_percent: 0.02,
            whale_volume_threshold: 5_000_000.0,
            topup_floor_raw: 3.0,
            default_track_limit: 3,
        }
    }
}

impl ScannerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid scanner config")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("failed to read config file {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&raw)
    }

    /// Candidate pool size for a requested result limit
    pub fn candidate_pool(&self, limit: usize) -> usize {
        (limit * self.limit_factor).min(self.max_candidates)
    }
}
