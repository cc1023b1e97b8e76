use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::display::RecommendationLevel;
use crate::entry::EntryPlan;
use crate::regime::MarketRegime;
use crate::scoring::ScoreBreakdown;
use crate::thresholds::AdaptiveThresholds;
use crate::tiers::Tier;
use crate::types::{AssetAnalysis, Side, Ticker};

/// One scored trading opportunity. Built raw by the candidate pipeline,
/// then normalized, tiered and (for the displayed few) annotated by the
/// display layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub symbol: String,
    pub current_price: f64,
    pub change_24h: f64,
    pub volume_24h: f64,
    pub side: Side,

    /// Raw confluence score on the 20-point scale, kept for diagnostics
    pub raw_score_20: f64,
    /// Normalized 0-10 score; `confluence_score` and `final_score` are
    /// aliases kept in lockstep by the normalizer
    pub score: f64,
    pub confluence_score: f64,
    pub final_score: f64,

    pub probability: f64,
    /// Static probability preserved when the ML predictor blends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_probability: Option<f64>,

    pub entry_plan: EntryPlan,
    pub analysis: AssetAnalysis,
    pub score_breakdown: ScoreBreakdown,
    pub reasoning: String,

    pub tier: Tier,
    pub tier_color: String,
    pub tier_name: String,
    pub tier_recommendation: String,
    pub position_size_multiplier: f64,

    // Display metadata, present only on displayed opportunities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_used: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meets_threshold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_vs_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regime_warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_recommendation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_level: Option<RecommendationLevel>,
}

impl Opportunity {
    /// Fresh opportunity straight out of the candidate pipeline: score
    /// fields still carry the raw 20-point value, tier not yet assigned.
    pub fn from_candidate(
        ticker: &Ticker,
        analysis: AssetAnalysis,
        entry_plan: EntryPlan,
        breakdown: ScoreBreakdown,
        probability: f64,
        reasoning: String,
    ) -> Self {
        let raw = breakdown.total;
        Self {
            symbol: ticker.symbol.clone(),
            current_price: ticker.price,
            change_24h: ticker.change_24h,
            volume_24h: ticker.volume_24h,
            side: entry_plan.side,
            raw_score_20: raw,
            score: raw,
            confluence_score: raw,
            final_score: raw,
            probability,
            static_probability: None,
            entry_plan,
            analysis,
            score_breakdown: breakdown,
            reasoning,
            tier: Tier::NotRecommended,
            tier_color: Tier::NotRecommended.color().to_string(),
            tier_name: Tier::NotRecommended.display_name().to_string(),
            tier_recommendation: Tier::NotRecommended.recommendation().to_string(),
            position_size_multiplier: Tier::NotRecommended.size_multiplier(),
            rank: None,
            threshold_used: None,
            meets_threshold: None,
            score_vs_threshold: None,
            warning: None,
            regime_warning: None,
            display_recommendation: None,
            recommendation_level: None,
        }
    }

    /// Re-derive the tier (and its lookups) from the current score fields
    pub fn apply_tier(&mut self) {
        let tier = Tier::classify(self.score, self.probability, self.entry_plan.risk_reward);
        self.tier = tier;
        self.tier_color = tier.color().to_string();
        self.tier_name = tier.display_name().to_string();
        self.tier_recommendation = tier.recommendation().to_string();
        self.position_size_multiplier = tier.size_multiplier();
    }
}

/// Uniform scan envelope. `success == false` only for universe-level
/// failures; short or empty result lists are still successes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub success: bool,
    pub opportunities: Vec<Opportunity>,
    pub top_3_longs: Vec<Opportunity>,
    pub top_3_shorts: Vec<Opportunity>,
    pub market_regime: Option<MarketRegime>,
    pub adaptive_thresholds: Option<AdaptiveThresholds>,
    pub tier_distribution: BTreeMap<Tier, usize>,
    pub total_scanned: usize,
    pub total_analyzed: usize,
    pub all_longs_count: usize,
    pub all_shorts_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub scanned_count: usize,
    pub found_count: usize,
}

impl ScanResult {
    /// Successful scan that found nothing to analyze (off-session presets,
    /// empty symbol filters). Distinct from a failure: `success` stays true.
    pub fn empty_success(total_scanned: usize) -> Self {
        Self {
            success: true,
            opportunities: Vec::new(),
            top_3_longs: Vec::new(),
            top_3_shorts: Vec::new(),
            market_regime: None,
            adaptive_thresholds: None,
            tier_distribution: BTreeMap::new(),
            total_scanned,
            total_analyzed: 0,
            all_longs_count: 0,
            all_shorts_count: 0,
            error: None,
            scanned_count: total_scanned,
            found_count: 0,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            opportunities: Vec::new(),
            top_3_longs: Vec::new(),
            top_3_shorts: Vec::new(),
            market_regime: None,
            adaptive_thresholds: None,
            tier_distribution: BTreeMap::new(),
            total_scanned: 0,
            total_analyzed: 0,
            all_longs_count: 0,
            all_shorts_count: 0,
            error: Some(error),
            scanned_count: 0,
            found_count: 0,
        }
    }
}
