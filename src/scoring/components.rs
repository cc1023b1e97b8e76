//! Phase B - positive scoring components
//!
//! Four component families, each capped:
//! - classic TA (max 6): trend alignment, indicator strength, pattern, S/R
//! - order flow (max 4): CVD, volume, reference-asset support
//! - smart money (max 3): order block, fair value gap, break of structure
//! - bonuses (max 6): liquidity grab, session, R:R, ADX, whale, volume profile

use std::collections::BTreeMap;

use super::{structural_tf, ScoreInputs};
use crate::session::TradingSession;
use crate::types::{
    AssetAnalysis, CvdSignal, Side, TimeframeAnalysis, ValueAreaPosition, WhaleActivity,
};

fn add(components: &mut BTreeMap<String, f64>, key: &str, value: f64) {
    if value != 0.0 {
        components.insert(key.to_string(), value);
    }
}

// ---------------------------------------------------------------------------
// Classic TA (max 6)
// ---------------------------------------------------------------------------

pub fn score_classic_ta(
    analysis: &AssetAnalysis,
    side: Side,
    components: &mut BTreeMap<String, f64>,
) {
    add(components, "trend_alignment", trend_alignment(analysis, side));
    add(
        components,
        "indicator_strength",
        indicator_strength(analysis.composite.score),
    );
    add(components, "pattern", pattern_match(analysis, side));
    add(
        components,
        "support_resistance",
        support_resistance(analysis, side),
    );
}

/// Cross-timeframe alignment plus a structural-trend match, capped at 2.0
fn trend_alignment(analysis: &AssetAnalysis, side: Side) -> f64 {
    let alignment = analysis.composite.alignment;
    let mut value: f64 = if alignment >= 0.8 {
        2.0
    } else if alignment >= 0.6 {
        1.5
    } else if alignment >= 0.5 {
        1.0
    } else {
        0.0
    };

    if let Some(tf) = structural_tf(analysis) {
        if tf.trend.direction.supports(side) {
            value += 0.5;
        }
    }

    value.min(2.0)
}

fn indicator_strength(composite_score: f64) -> f64 {
    let magnitude = composite_score.abs();
    if magnitude >= 7.0 {
        2.0
    } else if magnitude >= 5.0 {
        1.5
    } else if magnitude >= 3.0 {
        1.0
    } else {
        0.5
    }
}

/// Any structural-timeframe candlestick pattern agreeing with the direction
fn pattern_match(analysis: &AssetAnalysis, side: Side) -> f64 {
    let Some(tf) = structural_tf(analysis) else {
        return 0.0;
    };
    if tf.patterns.iter().any(|p| p.kind.supports(side)) {
        1.0
    } else {
        0.0
    }
}

/// Proximity to the nearest level in the trade's favor: a long close above
/// support, a short close below resistance. Base credit 0.5.
fn support_resistance(analysis: &AssetAnalysis, side: Side) -> f64 {
    let Some(tf) = structural_tf(analysis) else {
        return 0.0;
    };
    let price = tf.current_price;
    if price <= 0.0 {
        return 0.0;
    }

    let nearest_distance_pct = match side {
        Side::Long => tf
            .support_levels
            .iter()
            .filter(|level| **level < price)
            .map(|level| (price - level) / price * 100.0)
            .fold(None::<f64>, |best, d| {
                Some(best.map_or(d, |b: f64| b.min(d)))
            }),
        Side::Short => tf
            .resistance_levels
            .iter()
            .filter(|level| **level > price)
            .map(|level| (level - price) / price * 100.0)
            .fold(None::<f64>, |best, d| {
                Some(best.map_or(d, |b: f64| b.min(d)))
            }),
    };

    match nearest_distance_pct {
        Some(d) if d <= 2.0 => 1.0,
        Some(d) if d <= 5.0 => 0.8,
        _ => 0.5,
    }
}

// ---------------------------------------------------------------------------
// Order flow (max 4)
// ---------------------------------------------------------------------------

pub fn score_order_flow(
    analysis: &AssetAnalysis,
    side: Side,
    inputs: &ScoreInputs,
    components: &mut BTreeMap<String, f64>,
) {
    add(components, "cvd", cvd_alignment(analysis, side));
    add(components, "volume", volume_strength(analysis));
    add(
        components,
        "reference_support",
        reference_support(inputs, side),
    );
}

/// CVD agreement: absorption in the trade's favor is the strongest signal,
/// plain aggression weaker, absorption against the trade costs a point.
fn cvd_alignment(analysis: &AssetAnalysis, side: Side) -> f64 {
    let Some(cvd) = &analysis.cvd else {
        return 0.0;
    };
    match (cvd.signal, side) {
        (CvdSignal::BullishAbsorption, Side::Long)
        | (CvdSignal::BearishAbsorption, Side::Short) => 2.0,
        (CvdSignal::AggressiveBuying, Side::Long)
        | (CvdSignal::AggressiveSelling, Side::Short) => 1.5,
        (CvdSignal::BearishAbsorption, Side::Long)
        | (CvdSignal::BullishAbsorption, Side::Short) => -1.0,
        _ => 0.0,
    }
}

fn volume_strength(analysis: &AssetAnalysis) -> f64 {
    let ratio = structural_tf(analysis)
        .and_then(|tf| tf.indicators.volume_ratio)
        .unwrap_or(1.0);
    if ratio >= 2.0 {
        1.0
    } else if ratio >= 1.5 {
        0.8
    } else if ratio >= 1.2 {
        0.5
    } else {
        0.0
    }
}

/// Reference asset (BTC) blowing the same way as the trade
fn reference_support(inputs: &ScoreInputs, side: Side) -> f64 {
    match inputs.btc_trend {
        Some(direction) if direction.supports(side) => 1.0,
        Some(crate::types::TrendDirection::Sideways) => 0.5,
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Smart money (max 3)
// ---------------------------------------------------------------------------

pub fn score_smart_money(
    analysis: &AssetAnalysis,
    side: Side,
    components: &mut BTreeMap<String, f64>,
) {
    let Some(tf) = structural_tf(analysis) else {
        return;
    };

    add(components, "order_block", order_block_match(tf, side));
    add(components, "fair_value_gap", fvg_match(tf, side));
    add(
        components,
        "break_of_structure",
        bos_match(tf, side),
    );
}

fn order_block_match(tf: &TimeframeAnalysis, side: Side) -> f64 {
    if tf.order_blocks.iter().any(|ob| ob.kind.supports(side)) {
        1.0
    } else {
        0.0
    }
}

/// Nearest same-direction fair value gap within 2% of price
fn fvg_match(tf: &TimeframeAnalysis, side: Side) -> f64 {
    let price = tf.current_price;
    if price <= 0.0 {
        return 0.0;
    }

    tf.fair_value_gaps
        .iter()
        .filter(|gap| gap.kind.supports(side))
        .filter(|gap| ((gap.midpoint() - price) / price).abs() * 100.0 <= 2.0)
        .map(|gap| if gap.strong { 1.0 } else { 0.75 })
        .fold(0.0, f64::max)
}

fn bos_match(tf: &TimeframeAnalysis, side: Side) -> f64 {
    match &tf.break_of_structure {
        Some(bos) if bos.kind.supports(side) => 1.0,
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Bonuses (max 6)
// ---------------------------------------------------------------------------

pub fn score_bonuses(
    analysis: &AssetAnalysis,
    side: Side,
    inputs: &ScoreInputs,
    components: &mut BTreeMap<String, f64>,
) {
    if let Some(tf) = structural_tf(analysis) {
        add(
            components,
            "liquidity_grab",
            liquidity_grab_match(tf, side),
        );
        add(components, "adx", adx_strength(tf));
        add(
            components,
            "volume_profile",
            volume_profile_confluence(tf, side),
        );
    }

    add(components, "session", session_bonus(inputs.session));
    add(components, "risk_reward", rr_bonus(inputs.risk_reward));
    add(components, "whale", whale_alignment(analysis, side));
}

fn liquidity_grab_match(tf: &TimeframeAnalysis, side: Side) -> f64 {
    tf.liquidity_grabs
        .iter()
        .filter(|grab| grab.kind.supports(side))
        .map(|grab| if grab.strong { 1.0 } else { 0.5 })
        .fold(0.0, f64::max)
}

fn session_bonus(session: TradingSession) -> f64 {
    match session {
        TradingSession::Overlap => 1.0,
        TradingSession::European | TradingSession::Us => 0.75,
        TradingSession::Asian => 0.25,
    }
}

fn rr_bonus(risk_reward: f64) -> f64 {
    if risk_reward >= 3.0 {
        1.0
    } else if risk_reward >= 2.5 {
        0.75
    } else if risk_reward >= 2.0 {
        0.5
    } else {
        0.0
    }
}

fn adx_strength(tf: &TimeframeAnalysis) -> f64 {
    let adx = tf.indicators.adx.unwrap_or(0.0);
    if adx > 30.0 {
        1.0
    } else if adx > 25.0 {
        0.75
    } else if adx > 20.0 {
        0.5
    } else {
        0.0
    }
}

/// Whale activity and flow both agreeing earns the full bonus, one of the
/// two a half.
fn whale_alignment(analysis: &AssetAnalysis, side: Side) -> f64 {
    let Some(whale) = &analysis.whale else {
        return 0.0;
    };

    let activity_match = matches!(
        (whale.activity, side),
        (WhaleActivity::Accumulation, Side::Long) | (WhaleActivity::Distribution, Side::Short)
    );
    let flow_match = match side {
        Side::Long => whale.flow.is_bullish(),
        Side::Short => whale.flow.is_bearish(),
    };

    match (activity_match, flow_match) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.5,
        (false, false) => 0.0,
    }
}

/// Price at the value-area edge in the trade's favor (discount for longs,
/// premium for shorts) or sitting on the POC.
fn volume_profile_confluence(tf: &TimeframeAnalysis, side: Side) -> f64 {
    let Some(vp) = &tf.volume_profile else {
        return 0.0;
    };

    let edge_match = matches!(
        (vp.current_position, side),
        (ValueAreaPosition::BelowVa, Side::Long) | (ValueAreaPosition::AboveVa, Side::Short)
    );

    if edge_match || vp.confluence_with_poc {
        1.0
    } else if vp.current_position == ValueAreaPosition::InVa {
        0.5
    } else {
        0.0
    }
}
