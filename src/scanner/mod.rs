//! Market scanner
//!
//! Drives a single scan end to end: read the reference regime, filter the
//! ticker universe, analyze surviving candidates under bounded concurrency,
//! score and tier each, split by direction and hand the partitions to the
//! display layer. The scanner is an error boundary - per-candidate failures
//! drop that candidate, and only universe-level failures produce a
//! `success: false` envelope.

pub mod criteria;
pub mod orb;
pub mod presets;
pub mod types;

pub use criteria::{is_stable_stable_pair, IndicatorCriteria, PriceVsEma, ScanCriteria};
pub use types::{Opportunity, ScanResult};

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::cache::TtlCache;
use crate::config::ScannerConfig;
use crate::display::SmartDisplay;
use crate::entry::EntryPlanner;
use crate::errors::ScanError;
use crate::logger::{self, LogTag};
use crate::ml::{ProbabilityModel, SignalFeatures};
use crate::providers::null::{NoAccount, NullVolumeProfileAnalyzer, NullWhaleDetector};
use crate::providers::{
    AccountProvider, AssetAnalyzer, CandleSource, CorrelationProvider, TickerSource,
    VolumeProfileAnalyzer, WhaleDetector,
};
use crate::regime::snapshot::RegimeSnapshotStore;
use crate::regime::{MarketRegime, RegimeDetector};
use crate::scoring::normalizer::{
    normalize_opportunity_with, validate_score_fields, ScoreSystem,
};
use crate::scoring::{estimate_probability, ConfluenceScorer, ScoreInputs};
use crate::session::{SessionManager, SessionProvider, TradingSession};
use crate::thresholds::AdaptiveThresholds;
use crate::tiers::Tier;
use crate::tracker::{NewSignal, NullSignalTracker, SignalTracker};
use crate::types::{Side, Ticker, Timeframe, TrendDirection};

pub struct MarketScanner {
    tickers: Arc<dyn TickerSource>,
    analyzer: Arc<dyn AssetAnalyzer>,
    correlations: Arc<dyn CorrelationProvider>,
    account: Arc<dyn AccountProvider>,
    whale: Arc<dyn WhaleDetector>,
    volume_profiles: Arc<dyn VolumeProfileAnalyzer>,
    sessions: Arc<dyn SessionProvider>,
    candles: Option<Arc<dyn CandleSource>>,
    ml: Option<Arc<dyn ProbabilityModel>>,
    tracker: Arc<dyn SignalTracker>,
    snapshots: Option<Arc<RegimeSnapshotStore>>,
    correlation_cache: TtlCache<(String, String), f64>,
    config: ScannerConfig,
}

impl MarketScanner {
    /// Scanner with the mandatory collaborators; optional capabilities
    /// start as null objects and attach via the `with_*` methods.
    pub fn new(
        tickers: Arc<dyn TickerSource>,
        analyzer: Arc<dyn AssetAnalyzer>,
        correlations: Arc<dyn CorrelationProvider>,
        config: ScannerConfig,
    ) -> Self {
        let cache_ttl = Duration::from_secs(config.correlation_cache_secs);
        Self {
            tickers,
            analyzer,
            correlations,
            account: Arc::new(NoAccount),
            whale: Arc::new(NullWhaleDetector),
            volume_profiles: Arc::new(NullVolumeProfileAnalyzer),
            sessions: Arc::new(SessionManager::new()),
            candles: None,
            ml: None,
            tracker: Arc::new(NullSignalTracker),
            snapshots: None,
            correlation_cache: TtlCache::new(cache_ttl, 1024),
            config,
        }
    }

    pub fn with_account(mut self, account: Arc<dyn AccountProvider>) -> Self {
        self.account = account;
        self
    }

    pub fn with_whale_detector(mut self, whale: Arc<dyn WhaleDetector>) -> Self {
        self.whale = whale;
        self
    }

    pub fn with_volume_profiles(mut self, analyzer: Arc<dyn VolumeProfileAnalyzer>) -> Self {
        self.volume_profiles = analyzer;
        self
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn SessionProvider>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_candles(mut self, candles: Arc<dyn CandleSource>) -> Self {
        self.candles = Some(candles);
        self
    }

    pub fn with_probability_model(mut self, model: Arc<dyn ProbabilityModel>) -> Self {
        self.ml = Some(model);
        self
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn SignalTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn with_snapshot_store(mut self, store: Arc<RegimeSnapshotStore>) -> Self {
        self.snapshots = Some(store);
        self
    }

    /// Run one market scan. Never panics and never returns an Err: all
    /// failure modes are folded into the result envelope.
    pub async fn scan_market(
        &self,
        criteria: &ScanCriteria,
        limit: usize,
        auto_track: bool,
        track_limit: Option<usize>,
    ) -> ScanResult {
        match self
            .scan_internal(criteria, limit, auto_track, track_limit, None)
            .await
        {
            Ok(result) => result,
            Err(err) => {
                logger::error(LogTag::Scanner, &format!("Scan failed: {}", err));
                ScanResult::failure(err.to_string())
            }
        }
    }

    pub(crate) async fn scan_internal(
        &self,
        criteria: &ScanCriteria,
        limit: usize,
        auto_track: bool,
        track_limit: Option<usize>,
        symbol_filter: Option<HashSet<String>>,
    ) -> Result<ScanResult, ScanError> {
        logger::info(
            LogTag::Scanner,
            &format!(
                "Scan started: market={} min_volume={} limit={}",
                criteria.market_type.as_str(),
                criteria.min_volume_24h,
                limit
            ),
        );

        // Step 1: reference regime, persisted best-effort
        let (regime, btc_trend) = self.detect_regime().await;
        if let Some(store) = &self.snapshots {
            store.record_best_effort(&regime, Utc::now());
        }
        let thresholds = AdaptiveThresholds::calculate(&regime);

        // Step 2-3: account context (non-fatal) and held symbols
        let (balance, held) = self.account_context().await;

        // Step 4: ticker universe; empty is fatal
        let universe = self.tickers.get_all_tickers(criteria.market_type).await?;
        if universe.is_empty() {
            return Err(ScanError::UniverseFetch(
                "ticker source returned no symbols".to_string(),
            ));
        }
        let total_scanned = universe.len();

        // Step 5-6: pre-analysis filter, volume-ranked candidate pool
        let mut candidates: Vec<Ticker> = universe
            .into_iter()
            .filter(|ticker| criteria::passes_universe_filter(ticker, criteria))
            .filter(|ticker| {
                symbol_filter
                    .as_ref()
                    .map(|set| set.contains(&ticker.symbol))
                    .unwrap_or(true)
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.volume_24h
                .partial_cmp(&a.volume_24h)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(self.config.candidate_pool(limit.max(1)));

        logger::info(
            LogTag::Scanner,
            &format!(
                "Universe {} -> {} candidates after filters",
                total_scanned,
                candidates.len()
            ),
        );

        // Step 7: bounded-concurrency candidate pipeline. The admission
        // index keeps final ordering deterministic regardless of
        // completion order.
        let session = self.sessions.current_session();
        let held_ref = &held;
        let mut scored: Vec<(usize, Opportunity)> =
            stream::iter(candidates.into_iter().enumerate())
                .map(|(index, ticker)| async move {
                    self.analyze_candidate(&ticker, criteria, held_ref, balance, btc_trend, session)
                        .await
                        .map(|opportunity| (index, opportunity))
                })
                .buffer_unordered(self.config.concurrency.max(1))
                .filter_map(|entry| async move { entry })
                .collect()
                .await;

        // Step 8: sort by raw score, admission order breaks ties
        scored.sort_by(|a, b| {
            b.1.raw_score_20
                .partial_cmp(&a.1.raw_score_20)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        // Step 9: normalize to 0-10, classify tiers, enforce invariants
        let mut opportunities: Vec<Opportunity> = Vec::with_capacity(scored.len());
        for (_, mut opportunity) in scored {
            normalize_opportunity_with(&mut opportunity, ScoreSystem::TwentyPoint);
            opportunity.apply_tier();
            if validate_score_fields(&opportunity) {
                opportunities.push(opportunity);
            } else {
                logger::error(
                    LogTag::Scanner,
                    &format!(
                        "{}",
                        ScanError::InvariantViolation {
                            symbol: opportunity.symbol.clone()
                        }
                    ),
                );
            }
        }

        // Step 10: direction partitions (already sorted)
        let longs: Vec<Opportunity> = opportunities
            .iter()
            .filter(|o| o.side == Side::Long)
            .cloned()
            .collect();
        let shorts: Vec<Opportunity> = opportunities
            .iter()
            .filter(|o| o.side == Side::Short)
            .cloned()
            .collect();

        // Step 11: smart display plus the never-empty top-up
        let mut top_longs = SmartDisplay::select_top_with_warnings(&longs, thresholds.long, &regime);
        self.top_up(&mut top_longs, &longs, thresholds.long, &regime);
        let mut top_shorts =
            SmartDisplay::select_top_with_warnings(&shorts, thresholds.short, &regime);
        self.top_up(&mut top_shorts, &shorts, thresholds.short, &regime);

        // Step 12: optional ML probability refinement on displayed entries
        if let Some(model) = &self.ml {
            if model.model_available() {
                for opportunity in top_longs.iter_mut().chain(top_shorts.iter_mut()) {
                    blend_probability(opportunity, model.as_ref(), btc_trend, session);
                }
            }
        }

        // Step 13: optional auto-tracking, failures logged only
        if auto_track && self.tracker.available() {
            let track_limit = track_limit.unwrap_or(self.config.default_track_limit);
            self.track_signals(top_longs.iter().chain(top_shorts.iter()), track_limit)
                .await;
        }

        // Step 14: assemble
        let mut tier_distribution: BTreeMap<Tier, usize> = BTreeMap::new();
        for opportunity in &opportunities {
            *tier_distribution.entry(opportunity.tier).or_insert(0) += 1;
        }

        let total_analyzed = opportunities.len();
        logger::info(
            LogTag::Scanner,
            &format!(
                "Scan complete: analyzed={} longs={} shorts={} displayed={}/{}",
                total_analyzed,
                longs.len(),
                shorts.len(),
                top_longs.len(),
                top_shorts.len()
            ),
        );

        Ok(ScanResult {
            success: true,
            top_3_longs: top_longs,
            top_3_shorts: top_shorts,
            market_regime: Some(regime),
            adaptive_thresholds: Some(thresholds),
            tier_distribution,
            total_scanned,
            total_analyzed,
            all_longs_count: longs.len(),
            all_shorts_count: shorts.len(),
            error: None,
            scanned_count: total_scanned,
            found_count: total_analyzed,
            opportunities,
        })
    }

    /// Reference-asset regime; analysis failure degrades to the fallback
    async fn detect_regime(&self) -> (MarketRegime, Option<TrendDirection>) {
        match self
            .analyzer
            .analyze_asset(
                &self.config.reference_symbol,
                &self.config.scan_timeframes,
                true,
            )
            .await
        {
            Ok(reference) => {
                let btc_trend = reference
                    .timeframe(Timeframe::H4)
                    .map(|tf| tf.trend.direction);
                (RegimeDetector::detect(&reference), btc_trend)
            }
            Err(err) => {
                logger::warning(
                    LogTag::Scanner,
                    &format!(
                        "{}",
                        ScanError::ReferenceAnalysis(err.to_string())
                    ),
                );
                (MarketRegime::fallback(), None)
            }
        }
    }

    /// Balance and held symbols; a failing account provider defers sizing
    async fn account_context(&self) -> (Option<f64>, HashSet<String>) {
        match self.account.account_info().await {
            Ok(info) => {
                let held = info
                    .positions
                    .iter()
                    .map(|p| p.symbol.clone())
                    .collect::<HashSet<_>>();
                (info.balance_total, held)
            }
            Err(err) => {
                logger::warning(
                    LogTag::Scanner,
                    &format!("{}", ScanError::BalanceUnavailable(err.to_string())),
                );
                (None, HashSet::new())
            }
        }
    }

    /// Full per-candidate pipeline. Any failure drops the candidate.
    async fn analyze_candidate(
        &self,
        ticker: &Ticker,
        criteria: &ScanCriteria,
        held: &HashSet<String>,
        balance: Option<f64>,
        btc_trend: Option<TrendDirection>,
        session: TradingSession,
    ) -> Option<Opportunity> {
        if held.contains(&ticker.symbol) {
            logger::debug(
                LogTag::Scanner,
                &format!("{} skipped: position already open", ticker.symbol),
            );
            return None;
        }

        // Correlation filter against every held symbol
        for held_symbol in held {
            if let Some(correlation) = self.cached_correlation(&ticker.symbol, held_symbol).await {
                if correlation > self.config.correlation_limit {
                    logger::debug(
                        LogTag::Scanner,
                        &format!(
                            "{} skipped: correlation {:.2} with held {}",
                            ticker.symbol, correlation, held_symbol
                        ),
                    );
                    return None;
                }
            }
        }

        let mut analysis = match self
            .analyzer
            .analyze_asset(&ticker.symbol, &self.config.scan_timeframes, true)
            .await
        {
            Ok(analysis) => analysis,
            Err(err) => {
                logger::warning(
                    LogTag::Scanner,
                    &format!(
                        "{}",
                        ScanError::CandidateAnalysis {
                            symbol: ticker.symbol.clone(),
                            reason: err.to_string(),
                        }
                    ),
                );
                return None;
            }
        };

        if !criteria.indicators.matches(&analysis) {
            return None;
        }

        // Optional enrichments; their failures are not candidate failures
        let wants_whale = criteria.include_whale
            || ticker.volume_24h > self.config.whale_volume_threshold;
        if wants_whale && self.whale.available() {
            match self.whale.detect_whale_activity(&ticker.symbol).await {
                Ok(whale) => analysis.whale = Some(whale),
                Err(err) => logger::debug(
                    LogTag::Scanner,
                    &format!("{} whale enrichment failed: {}", ticker.symbol, err),
                ),
            }
        }

        if criteria.include_volume_profile && self.volume_profiles.available() {
            match self
                .volume_profiles
                .volume_profile(&ticker.symbol, Timeframe::H4)
                .await
            {
                Ok(profile) => {
                    if let Some(h4) = analysis.timeframes.get_mut(&Timeframe::H4) {
                        h4.volume_profile = Some(profile);
                    }
                }
                Err(err) => logger::debug(
                    LogTag::Scanner,
                    &format!("{} volume profile failed: {}", ticker.symbol, err),
                ),
            }
        }

        let entry_plan = EntryPlanner::build(&analysis, ticker, balance, self.config.risk_percent);
        let side = entry_plan.side;

        let inputs = ScoreInputs {
            risk_reward: entry_plan.risk_reward,
            session,
            btc_trend,
        };
        let breakdown = ConfluenceScorer::score(&analysis, side, &inputs);
        let probability = estimate_probability(breakdown.total, &analysis);
        let reasoning = generate_reasoning(&breakdown);

        Some(Opportunity::from_candidate(
            ticker,
            analysis,
            entry_plan,
            breakdown,
            probability,
            reasoning,
        ))
    }

    /// Correlation with a per-scan cache; provider failures read as
    /// "no correlation information" and do not drop the candidate.
    async fn cached_correlation(&self, symbol_a: &str, symbol_b: &str) -> Option<f64> {
        let key = if symbol_a <= symbol_b {
            (symbol_a.to_string(), symbol_b.to_string())
        } else {
            (symbol_b.to_string(), symbol_a.to_string())
        };

        if let Some(value) = self.correlation_cache.get(&key) {
            return Some(value);
        }

        match self.correlations.correlation(symbol_a, symbol_b).await {
            Ok(value) => {
                self.correlation_cache.insert(key, value);
                Some(value)
            }
            Err(err) => {
                logger::debug(
                    LogTag::Scanner,
                    &format!(
                        "correlation {}/{} unavailable: {}",
                        symbol_a, symbol_b, err
                    ),
                );
                None
            }
        }
    }

    /// Never-empty contract: when the display yields fewer than three,
    /// pull further partition entries down to the raw-score floor.
    fn top_up(
        &self,
        displayed: &mut Vec<Opportunity>,
        partition: &[Opportunity],
        threshold: f64,
        regime: &MarketRegime,
    ) {
        if displayed.len() >= 3 {
            return;
        }

        let mut shown: HashSet<String> =
            displayed.iter().map(|o| o.symbol.clone()).collect();

        for candidate in partition {
            if displayed.len() >= 3 {
                break;
            }
            if shown.contains(&candidate.symbol) {
                continue;
            }
            if candidate.raw_score_20 < self.config.topup_floor_raw {
                continue;
            }
            let rank = displayed.len() + 1;
            let mut extra = candidate.clone();
            crate::display::annotate_opportunity(&mut extra, rank, threshold, regime);
            shown.insert(extra.symbol.clone());
            displayed.push(extra);
        }
    }

    /// Record displayed signals with the tracker, best-effort
    async fn track_signals<'a, I: Iterator<Item = &'a Opportunity>>(
        &self,
        displayed: I,
        track_limit: usize,
    ) {
        for opportunity in displayed.take(track_limit) {
            let analysis_data = match serde_json::to_value(&opportunity.analysis) {
                Ok(value) => value,
                Err(err) => {
                    logger::warning(
                        LogTag::Tracker,
                        &format!("{} analysis serialization failed: {}", opportunity.symbol, err),
                    );
                    continue;
                }
            };

            let pattern = opportunity
                .analysis
                .timeframe(Timeframe::H4)
                .and_then(|tf| tf.patterns.first())
                .map(|p| p.name.clone());

            let signal = NewSignal {
                symbol: opportunity.symbol.clone(),
                side: opportunity.side,
                entry_price: opportunity.entry_plan.entry_price,
                stop_loss: opportunity.entry_plan.stop_loss,
                take_profit: opportunity.entry_plan.take_profit,
                confluence_score: opportunity.score,
                probability: opportunity.probability,
                analysis_data,
                timeframe: opportunity
                    .entry_plan
                    .entry_timeframe
                    .map(|tf| tf.as_str().to_string()),
                pattern_type: pattern.clone(),
                pattern_name: pattern,
            };

            match self.tracker.record_signal(signal).await {
                Ok(signal_id) => logger::info(
                    LogTag::Tracker,
                    &format!("{} tracked as {}", opportunity.symbol, signal_id),
                ),
                Err(err) => logger::warning(
                    LogTag::Tracker,
                    &format!(
                        "{}",
                        ScanError::TrackerWrite {
                            symbol: opportunity.symbol.clone(),
                            reason: err.to_string(),
                        }
                    ),
                ),
            }
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }
}

/// Blend the static probability with the ML prediction and keep the tier
/// consistent with the blended value.
fn blend_probability(
    opportunity: &mut Opportunity,
    model: &dyn ProbabilityModel,
    btc_trend: Option<TrendDirection>,
    session: TradingSession,
) {
    let h4 = opportunity.analysis.timeframe(Timeframe::H4);
    let features = SignalFeatures {
        confluence_score: opportunity.score,
        volume_ratio: h4
            .and_then(|tf| tf.indicators.volume_ratio)
            .unwrap_or(1.0),
        btc_aligned: btc_trend
            .map(|trend| trend.supports(opportunity.side))
            .unwrap_or(false),
        rsi_14: h4.and_then(|tf| tf.indicators.rsi_14).unwrap_or(50.0),
        risk_reward: opportunity.entry_plan.risk_reward,
        pattern_type: h4
            .and_then(|tf| tf.patterns.first())
            .map(|p| p.name.clone()),
        session,
    };

    let static_probability = opportunity.probability;
    let ml_probability = model.predict_probability(&features);
    let blended = crate::utils::round2((static_probability + ml_probability) / 2.0);

    opportunity.static_probability = Some(static_probability);
    opportunity.probability = blended;
    opportunity.apply_tier();
}

/// One-line explanation of why the setup scored the way it did
fn generate_reasoning(breakdown: &crate::scoring::ScoreBreakdown) -> String {
    let normalized = breakdown.total / 2.0;
    let quality = if normalized >= 7.5 {
        "Excellent"
    } else if normalized >= 6.5 {
        "Good"
    } else if normalized >= 5.5 {
        "Average"
    } else {
        "Weak"
    };

    let mut top: Vec<(&String, &f64)> = breakdown.components.iter().collect();
    top.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
    let factors: Vec<String> = top
        .iter()
        .take(3)
        .filter(|(_, value)| **value > 0.0)
        .map(|(name, value)| format!("{} +{:.1}", name, value))
        .collect();

    if factors.is_empty() {
        format!("{} setup", quality)
    } else {
        format!("{} setup. Key factors: {}", quality, factors.join("; "))
    }
}
