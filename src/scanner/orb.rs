//! Opening Range Breakout detection
//!
//! Pure function over a candle window: the opening range (default 30
//! minutes) sets high/low bounds, a close beyond them with volume
//! confirmation and an acceptable R:R is a setup. Only runs during the
//! european/us sessions - the asian session's opening range carries no
//! signal for this strategy.

use serde::{Deserialize, Serialize};

use crate::session::TradingSession;
use crate::types::{Candle, Side, Timeframe};
use crate::utils::{round2, round6};

/// Price must clear the range by this fraction to count as a breakout
const BREAKOUT_THRESHOLD: f64 = 0.001;
/// Minimum volume versus the opening-range average
const MIN_VOLUME_RATIO: f64 = 1.5;
/// Minimum acceptable reward-to-risk
const MIN_RISK_REWARD: f64 = 2.0;
/// Target distance in opening-range heights
const TARGET_RANGE_MULTIPLE: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbStrength {
    Strong,
    Moderate,
    Weak,
}

/// A detected setup, or the reason there is none
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrbSetup {
    Setup {
        session: TradingSession,
        side: Side,
        or_high: f64,
        or_low: f64,
        or_height: f64,
        entry_price: f64,
        stop_loss: f64,
        take_profit: f64,
        risk_reward: f64,
        volume_ratio: f64,
        strength: OrbStrength,
        confidence: f64,
    },
    NoSetup {
        reason: String,
    },
}

impl OrbSetup {
    pub fn has_setup(&self) -> bool {
        matches!(self, OrbSetup::Setup { .. })
    }

    fn none(reason: &str) -> Self {
        OrbSetup::NoSetup {
            reason: reason.to_string(),
        }
    }
}

/// ORB only makes sense while the european or US open is in play
pub fn is_orb_session(session: TradingSession) -> bool {
    matches!(
        session,
        TradingSession::European | TradingSession::Us | TradingSession::Overlap
    )
}

/// Detect an opening-range breakout in `candles` (oldest first; the last
/// candle is the current one). `or_minutes` is the opening-range span.
pub fn detect_orb_setup(
    candles: &[Candle],
    timeframe: Timeframe,
    or_minutes: u32,
    session: TradingSession,
) -> OrbSetup {
    if !is_orb_session(session) {
        return OrbSetup::none("not an ORB session");
    }

    if candles.len() < 10 {
        return OrbSetup::none("insufficient candle history");
    }

    let or_candle_count = ((or_minutes / timeframe.minutes().max(1)) as usize).max(1);
    let or_candles = &candles[..or_candle_count.min(candles.len())];

    let or_high = or_candles.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let or_low = or_candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let or_height = or_high - or_low;

    if or_height <= 0.0 {
        return OrbSetup::none("zero opening range");
    }

    let current = candles[candles.len() - 1];
    let price = current.close;

    let avg_volume =
        or_candles.iter().map(|c| c.volume).sum::<f64>() / or_candles.len() as f64;
    let volume_ratio = if avg_volume > 0.0 {
        current.volume / avg_volume
    } else {
        1.0
    };

    let side = if price > or_high * (1.0 + BREAKOUT_THRESHOLD) {
        Side::Long
    } else if price < or_low * (1.0 - BREAKOUT_THRESHOLD) {
        Side::Short
    } else {
        return OrbSetup::none("no breakout detected");
    };

    if volume_ratio < MIN_VOLUME_RATIO {
        return OrbSetup::none("insufficient volume confirmation");
    }

    // Target at 2.5x the range height; the stop sits just past the far
    // side of the range, so a 2x target cannot clear the R:R gate.
    let (entry, stop_loss, take_profit) = match side {
        Side::Long => {
            let entry = or_high * (1.0 + BREAKOUT_THRESHOLD * 2.0);
            (
                entry,
                or_low * (1.0 - BREAKOUT_THRESHOLD),
                entry + or_height * TARGET_RANGE_MULTIPLE,
            )
        }
        Side::Short => {
            let entry = or_low * (1.0 - BREAKOUT_THRESHOLD * 2.0);
            (
                entry,
                or_high * (1.0 + BREAKOUT_THRESHOLD),
                entry - or_height * TARGET_RANGE_MULTIPLE,
            )
        }
    };

    let risk = (entry - stop_loss).abs();
    let reward = (take_profit - entry).abs();
    let risk_reward = if risk > 0.0 { reward / risk } else { 0.0 };

    if risk_reward < MIN_RISK_REWARD {
        return OrbSetup::none("risk/reward below minimum");
    }

    let (strength, confidence) = if volume_ratio > 1.8 && or_height / price > 0.015 {
        (OrbStrength::Strong, 0.75)
    } else if volume_ratio > 1.5 {
        (OrbStrength::Moderate, 0.70)
    } else {
        (OrbStrength::Weak, 0.65)
    };

    OrbSetup::Setup {
        session,
        side,
        or_high: round6(or_high),
        or_low: round6(or_low),
        or_height: round6(or_height),
        entry_price: round6(entry),
        stop_loss: round6(stop_loss),
        take_profit: round6(take_profit),
        risk_reward: round2(risk_reward),
        volume_ratio: round2(volume_ratio),
        strength,
        confidence,
    }
}
