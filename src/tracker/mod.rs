//! Signal tracker interface
//!
//! Persistence of emitted signals lives outside this crate; the engine
//! consumes a narrow seam: record a signal (minting an opaque id) and read
//! back completed outcomes for ML training. Tracking failures never affect
//! scan results.
//!
//! `MemorySignalTracker` backs tests and the ML training path;
//! `NullSignalTracker` is the disabled default.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ScanError;
use crate::session::TradingSession;
use crate::types::Side;

/// Signal as handed to the tracker at emission time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSignal {
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Normalized confluence score (0-10)
    pub confluence_score: f64,
    pub probability: f64,
    /// Full analysis payload, opaque to the tracker
    pub analysis_data: serde_json::Value,
    pub timeframe: Option<String>,
    pub pattern_type: Option<String>,
    pub pattern_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalOutcome {
    TpHit,
    SlHit,
}

impl SignalOutcome {
    pub fn is_win(&self) -> bool {
        matches!(self, SignalOutcome::TpHit)
    }
}

/// Completed signal row, feature-ready for the ML trainer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedSignal {
    pub signal_id: String,
    pub symbol: String,
    pub side: Side,
    pub outcome: SignalOutcome,
    pub completed_at: DateTime<Utc>,
    pub confluence_score: f64,
    pub risk_reward: f64,
    pub volume_ratio: f64,
    pub rsi_14: f64,
    pub btc_aligned: bool,
    pub pattern_type: Option<String>,
    pub session: TradingSession,
}

#[async_trait]
pub trait SignalTracker: Send + Sync {
    fn available(&self) -> bool {
        true
    }

    /// Record a signal; returns the minted signal id
    async fn record_signal(&self, signal: NewSignal) -> Result<String, ScanError>;

    /// Completed signals (tp_hit/sl_hit) from the last `days` days
    async fn completed_signals(&self, days: u32) -> Result<Vec<CompletedSignal>, ScanError>;
}

/// Tracking disabled
#[derive(Debug, Default)]
pub struct NullSignalTracker;

#[async_trait]
impl SignalTracker for NullSignalTracker {
    fn available(&self) -> bool {
        false
    }

    async fn record_signal(&self, _signal: NewSignal) -> Result<String, ScanError> {
        Err(ScanError::TrackerWrite {
            symbol: "-".to_string(),
            reason: "signal tracker disabled".to_string(),
        })
    }

    async fn completed_signals(&self, _days: u32) -> Result<Vec<CompletedSignal>, ScanError> {
        Ok(Vec::new())
    }
}

/// In-memory tracker for tests and single-process deployments
#[derive(Debug, Default)]
pub struct MemorySignalTracker {
    recorded: RwLock<Vec<(String, NewSignal)>>,
    completed: RwLock<Vec<CompletedSignal>>,
}

impl MemorySignalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded_count(&self) -> usize {
        self.recorded.read().len()
    }

    pub fn recorded_symbols(&self) -> Vec<String> {
        self.recorded
            .read()
            .iter()
            .map(|(_, s)| s.symbol.clone())
            .collect()
    }

    /// Seed a completed outcome (tests, replays)
    pub fn push_completed(&self, signal: CompletedSignal) {
        self.completed.write().push(signal);
    }
}

#[async_trait]
impl SignalTracker for MemorySignalTracker {
    async fn record_signal(&self, signal: NewSignal) -> Result<String, ScanError> {
        let signal_id = Uuid::new_v4().to_string();
        self.recorded.write().push((signal_id.clone(), signal));
        Ok(signal_id)
    }

    async fn completed_signals(&self, days: u32) -> Result<Vec<CompletedSignal>, ScanError> {
        let cutoff = Utc::now() - Duration::days(days as i64);
        Ok(self
            .completed
            .read()
            .iter()
            .filter(|signal| signal.completed_at >= cutoff)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_signal(symbol: &str) -> NewSignal {
        NewSignal {
            symbol: symbol.to_string(),
            side: Side::Long,
            entry_price: 100.0,
            stop_loss: 95.0,
            take_profit: 110.0,
            confluence_score: 7.5,
            probability: 0.68,
            analysis_data: serde_json::json!({"composite": {"signal": "BUY"}}),
            timeframe: Some("1h".to_string()),
            pattern_type: Some("breakout".to_string()),
            pattern_name: None,
        }
    }

    fn completed(days_ago: i64, outcome: SignalOutcome) -> CompletedSignal {
        CompletedSignal {
            signal_id: Uuid::new_v4().to_string(),
            symbol: "ETH/USDT".to_string(),
            side: Side::Long,
            outcome,
            completed_at: Utc::now() - Duration::days(days_ago),
            confluence_score: 7.0,
            risk_reward: 2.0,
            volume_ratio: 1.3,
            rsi_14: 55.0,
            btc_aligned: true,
            pattern_type: None,
            session: TradingSession::European,
        }
    }

    #[tokio::test]
    async fn test_record_mints_unique_ids() {
        let tracker = MemorySignalTracker::new();
        let a = tracker.record_signal(new_signal("ETH/USDT")).await.unwrap();
        let b = tracker.record_signal(new_signal("SOL/USDT")).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(tracker.recorded_count(), 2);
        assert_eq!(tracker.recorded_symbols(), vec!["ETH/USDT", "SOL/USDT"]);
    }

    #[tokio::test]
    async fn test_completed_signals_window() {
        let tracker = MemorySignalTracker::new();
        tracker.push_completed(completed(5, SignalOutcome::TpHit));
        tracker.push_completed(completed(40, SignalOutcome::SlHit));

        let recent = tracker.completed_signals(30).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert!(recent[0].outcome.is_win());

        let all = tracker.completed_signals(90).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_null_tracker() {
        let tracker = NullSignalTracker;
        assert!(!tracker.available());
        assert!(tracker.record_signal(new_signal("ETH/USDT")).await.is_err());
        assert!(tracker.completed_signals(30).await.unwrap().is_empty());
    }
}
