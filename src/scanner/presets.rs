//! Preset scans
//!
//! Thin wrappers that dress `scan_market` in ready-made criteria: oversold
//! and overbought RSI sweeps, Bollinger-squeeze breakout hunting, trend
//! reversal candidates, and the session-gated opening-range breakout scan.
//! Every preset returns the standard scan envelope.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};

use super::criteria::{IndicatorCriteria, ScanCriteria};
use super::orb::{self, OrbSetup};
use super::{MarketScanner, ScanResult};
use crate::logger::{self, LogTag};
use crate::session::SessionProvider;
use crate::types::{MarketType, Timeframe};

/// Default result size for preset scans
const PRESET_LIMIT: usize = 10;
/// Candle window handed to the ORB detector
const ORB_CANDLE_LIMIT: usize = 50;
/// Opening-range span in minutes
const ORB_RANGE_MINUTES: u32 = 30;

impl MarketScanner {
    /// Assets with a 4h RSI under 30
    pub async fn find_oversold_assets(
        &self,
        market_type: MarketType,
        min_volume_24h: f64,
    ) -> ScanResult {
        let criteria = ScanCriteria {
            market_type,
            min_volume_24h,
            indicators: IndicatorCriteria {
                rsi_range: Some((0.0, 30.0)),
                ..IndicatorCriteria::default()
            },
            ..ScanCriteria::default()
        };
        self.scan_market(&criteria, PRESET_LIMIT, false, None).await
    }

    /// Assets with a 4h RSI over 70
    pub async fn find_overbought_assets(
        &self,
        market_type: MarketType,
        min_volume_24h: f64,
    ) -> ScanResult {
        let criteria = ScanCriteria {
            market_type,
            min_volume_24h,
            indicators: IndicatorCriteria {
                rsi_range: Some((70.0, 100.0)),
                ..IndicatorCriteria::default()
            },
            ..ScanCriteria::default()
        };
        self.scan_market(&criteria, PRESET_LIMIT, false, None).await
    }

    /// Assets coiled in a 4h Bollinger squeeze, ready to move
    pub async fn find_breakout_opportunities(
        &self,
        market_type: MarketType,
        min_volume_24h: f64,
    ) -> ScanResult {
        let criteria = ScanCriteria {
            market_type,
            min_volume_24h,
            indicators: IndicatorCriteria {
                require_bb_squeeze: true,
                ..IndicatorCriteria::default()
            },
            ..ScanCriteria::default()
        };
        self.scan_market(&criteria, PRESET_LIMIT, false, None).await
    }

    /// Reversal candidates. Divergence detection proper lives in the
    /// analyzer; here the pattern/structure components of the confluence
    /// score surface the evidence, so this is a plain delegate.
    pub async fn find_trend_reversals(
        &self,
        market_type: MarketType,
        min_volume_24h: f64,
    ) -> ScanResult {
        let criteria = ScanCriteria {
            market_type,
            min_volume_24h,
            ..ScanCriteria::default()
        };
        self.scan_market(&criteria, PRESET_LIMIT, false, None).await
    }

    /// Opening-range breakout scan. Detects ORB setups on 5m candles for
    /// the most liquid symbols, then runs the full scoring pipeline over
    /// just those symbols. Outside the european/us sessions this returns
    /// an empty successful envelope.
    pub async fn find_orb_opportunities(
        &self,
        market_type: MarketType,
        min_volume_24h: f64,
    ) -> ScanResult {
        let session = self.sessions.current_session();
        if !orb::is_orb_session(session) {
            logger::info(
                LogTag::Scanner,
                &format!("ORB scan skipped: {} session", session),
            );
            return ScanResult::empty_success(0);
        }

        let Some(candles) = self.candles.clone() else {
            logger::warning(LogTag::Scanner, "ORB scan skipped: no candle source");
            return ScanResult::empty_success(0);
        };

        let criteria = ScanCriteria {
            market_type,
            min_volume_24h,
            ..ScanCriteria::default()
        };

        // Most liquid candidates first; the detector is cheap but the
        // candle fetches are not.
        let universe = match self.tickers.get_all_tickers(market_type).await {
            Ok(universe) if !universe.is_empty() => universe,
            Ok(_) => {
                return ScanResult::failure("ticker source returned no symbols".to_string())
            }
            Err(err) => return ScanResult::failure(err.to_string()),
        };
        let total_scanned = universe.len();

        let mut ranked: Vec<&crate::types::Ticker> = universe
            .iter()
            .filter(|ticker| super::criteria::passes_universe_filter(ticker, &criteria))
            .collect();
        ranked.sort_by(|a, b| {
            b.volume_24h
                .partial_cmp(&a.volume_24h)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let candidates: Vec<String> = ranked
            .into_iter()
            .take(self.config.candidate_pool(PRESET_LIMIT))
            .map(|ticker| ticker.symbol.clone())
            .collect();

        let setups: HashSet<String> = stream::iter(candidates)
            .map(|symbol| {
                let candles = candles.clone();
                async move {
                    match candles.get_ohlcv(&symbol, Timeframe::M5, ORB_CANDLE_LIMIT).await {
                        Ok(window) => {
                            let setup = orb::detect_orb_setup(
                                &window,
                                Timeframe::M5,
                                ORB_RANGE_MINUTES,
                                session,
                            );
                            if let OrbSetup::Setup { side, .. } = &setup {
                                logger::info(
                                    LogTag::Scanner,
                                    &format!("ORB setup: {} {}", symbol, side),
                                );
                                Some(symbol)
                            } else {
                                None
                            }
                        }
                        Err(err) => {
                            logger::debug(
                                LogTag::Scanner,
                                &format!("{} candle fetch failed: {}", symbol, err),
                            );
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .filter_map(|entry| async move { entry })
            .collect()
            .await;

        if setups.is_empty() {
            logger::info(LogTag::Scanner, "ORB scan found no setups");
            return ScanResult::empty_success(total_scanned);
        }

        match self
            .scan_internal(&criteria, PRESET_LIMIT, false, None, Some(setups))
            .await
        {
            Ok(result) => result,
            Err(err) => ScanResult::failure(err.to_string()),
        }
    }
}
