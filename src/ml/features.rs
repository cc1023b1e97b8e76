//! Feature encoding for the probability model
//!
//! Seven features per signal, encoded to a flat f64 vector with
//! finite-value capping so one bad row cannot poison training.

use serde::{Deserialize, Serialize};

use crate::session::TradingSession;
use crate::tracker::CompletedSignal;
use crate::utils::finite_or;

pub const FEATURE_COUNT: usize = 7;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "confluence_score",
    "volume_ratio",
    "btc_aligned",
    "rsi_14",
    "risk_reward",
    "pattern_encoded",
    "session_encoded",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalFeatures {
    /// Normalized confluence score (0-10)
    pub confluence_score: f64,
    pub volume_ratio: f64,
    pub btc_aligned: bool,
    pub rsi_14: f64,
    pub risk_reward: f64,
    pub pattern_type: Option<String>,
    pub session: TradingSession,
}

impl SignalFeatures {
    pub fn encode(&self) -> Vec<f64> {
        vec![
            finite_or(self.confluence_score, 0.0).clamp(0.0, 10.0),
            finite_or(self.volume_ratio, 1.0).clamp(0.0, 20.0),
            if self.btc_aligned { 1.0 } else { 0.0 },
            finite_or(self.rsi_14, 50.0).clamp(0.0, 100.0),
            finite_or(self.risk_reward, 0.0).clamp(0.0, 10.0),
            encode_pattern(self.pattern_type.as_deref()) as f64,
            encode_session(self.session) as f64,
        ]
    }

    pub fn from_completed(signal: &CompletedSignal) -> Self {
        Self {
            confluence_score: signal.confluence_score,
            volume_ratio: signal.volume_ratio,
            btc_aligned: signal.btc_aligned,
            rsi_14: signal.rsi_14,
            risk_reward: signal.risk_reward,
            pattern_type: signal.pattern_type.clone(),
            session: signal.session,
        }
    }
}

fn encode_pattern(pattern_type: Option<&str>) -> u32 {
    match pattern_type.map(|p| p.to_lowercase()).as_deref() {
        Some("oversold_bounce") => 1,
        Some("breakout") => 2,
        Some("trend_following") => 3,
        Some("reversal") => 4,
        Some("engulfing") => 5,
        Some("hammer") => 6,
        Some("flag") => 7,
        _ => 0,
    }
}

fn encode_session(session: TradingSession) -> u32 {
    match session {
        TradingSession::Asian => 1,
        TradingSession::European => 2,
        TradingSession::Us => 3,
        TradingSession::Overlap => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> SignalFeatures {
        SignalFeatures {
            confluence_score: 7.5,
            volume_ratio: 1.4,
            btc_aligned: true,
            rsi_14: 58.0,
            risk_reward: 2.2,
            pattern_type: Some("breakout".to_string()),
            session: TradingSession::Us,
        }
    }

    #[test]
    fn test_encode_shape_and_values() {
        let encoded = features().encode();
        assert_eq!(encoded.len(), FEATURE_COUNT);
        assert_eq!(encoded[0], 7.5);
        assert_eq!(encoded[2], 1.0);
        assert_eq!(encoded[5], 2.0); // breakout
        assert_eq!(encoded[6], 3.0); // us session
    }

    #[test]
    fn test_unknown_pattern_encodes_zero() {
        let mut f = features();
        f.pattern_type = Some("mystery".to_string());
        assert_eq!(f.encode()[5], 0.0);
        f.pattern_type = None;
        assert_eq!(f.encode()[5], 0.0);
    }

    #[test]
    fn test_non_finite_values_capped() {
        let mut f = features();
        f.rsi_14 = f64::NAN;
        f.volume_ratio = f64::INFINITY;
        let encoded = f.encode();
        assert_eq!(encoded[3], 50.0);
        assert_eq!(encoded[1], 1.0);
    }
}
