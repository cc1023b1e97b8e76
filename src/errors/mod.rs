/// Structured error handling for the scanning engine
///
/// The scanner is an error boundary: everything raised inside per-candidate
/// scope is converted into a dropped candidate, and only universe-level
/// failures surface as `success: false` envelopes. The taxonomy below keeps
/// those paths distinguishable in logs.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    /// The ticker source returned empty or failed. Fatal for the scan.
    #[error("Universe fetch failed: {0}")]
    UniverseFetch(String),

    /// Any failure during per-candidate work. Local: candidate dropped.
    #[error("Candidate analysis failed for {symbol}: {reason}")]
    CandidateAnalysis { symbol: String, reason: String },

    /// Reference-asset (BTC) analysis failed; regime falls back to uncertain.
    #[error("Reference analysis failed: {0}")]
    ReferenceAnalysis(String),

    /// Account balance could not be read; sizing is deferred, scan continues.
    #[error("Account balance unavailable: {0}")]
    BalanceUnavailable(String),

    /// Signal tracker write failed; logged, never propagated.
    #[error("Tracker write failed for {symbol}: {reason}")]
    TrackerWrite { symbol: String, reason: String },

    /// ML prediction failed; static probability formula is used instead.
    #[error("ML prediction failed: {0}")]
    MlPrediction(String),

    /// An emitted opportunity failed score-field validation and was dropped.
    #[error("Score invariant violated for {symbol}")]
    InvariantViolation { symbol: String },

    /// Generic provider failure (whale detector, volume profile, candles)
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Snapshot store error: {0}")]
    Snapshot(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScanError {
    /// Errors that abort the whole scan; everything else degrades in place
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::UniverseFetch(_))
    }
}

pub type ScanResultT<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_universe_fetch_is_fatal() {
        assert!(ScanError::UniverseFetch("empty".into()).is_fatal());
        assert!(!ScanError::CandidateAnalysis {
            symbol: "ETH/USDT".into(),
            reason: "timeout".into()
        }
        .is_fatal());
        assert!(!ScanError::BalanceUnavailable("api down".into()).is_fatal());
    }

    #[test]
    fn test_display_includes_symbol() {
        let err = ScanError::TrackerWrite {
            symbol: "SOL/USDT".into(),
            reason: "disk full".into(),
        };
        assert!(err.to_string().contains("SOL/USDT"));
    }
}
