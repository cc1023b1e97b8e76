//! Trading session clock
//!
//! Classifies UTC time into the four liquidity bands used by the scorer and
//! position sizing. Bands:
//! - Asian:    22:00 - 07:00 UTC
//! - European: 07:00 - 16:00 UTC
//! - US:       13:00 - 22:00 UTC
//! - Overlap:  13:00 - 16:00 UTC (European + US, checked first)

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingSession {
    Asian,
    European,
    Us,
    Overlap,
}

impl TradingSession {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingSession::Asian => "asian",
            TradingSession::European => "european",
            TradingSession::Us => "us",
            TradingSession::Overlap => "overlap",
        }
    }

    /// Position size multiplier for the session's expected liquidity
    pub fn position_multiplier(&self) -> f64 {
        match self {
            TradingSession::Asian => 0.7,
            TradingSession::European => 1.0,
            TradingSession::Us => 1.2,
            TradingSession::Overlap => 1.3,
        }
    }
}

impl std::fmt::Display for TradingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Session metadata for reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session: TradingSession,
    pub name: &'static str,
    pub hours_utc: &'static str,
    pub volatility: &'static str,
    pub average_volatility: f64,
}

/// Session lookup seam; the default implementation reads the wall clock
pub trait SessionProvider: Send + Sync {
    fn current_session(&self) -> TradingSession;
}

/// Wall-clock session manager
#[derive(Debug, Default)]
pub struct SessionManager;

impl SessionManager {
    pub fn new() -> Self {
        Self
    }

    /// Classify an arbitrary instant (exposed for tests and backfills)
    pub fn session_at(&self, at: DateTime<Utc>) -> TradingSession {
        let hour = at.hour();
        if (13..16).contains(&hour) {
            TradingSession::Overlap
        } else if (13..22).contains(&hour) {
            TradingSession::Us
        } else if (7..16).contains(&hour) {
            TradingSession::European
        } else {
            TradingSession::Asian
        }
    }

    pub fn session_info(&self, session: TradingSession) -> SessionInfo {
        match session {
            TradingSession::Asian => SessionInfo {
                session,
                name: "Asian Session",
                hours_utc: "22:00 - 07:00",
                volatility: "low",
                average_volatility: 0.8,
            },
            TradingSession::European => SessionInfo {
                session,
                name: "European Session",
                hours_utc: "07:00 - 16:00",
                volatility: "medium",
                average_volatility: 1.0,
            },
            TradingSession::Us => SessionInfo {
                session,
                name: "US Session",
                hours_utc: "13:00 - 22:00",
                volatility: "high",
                average_volatility: 1.2,
            },
            TradingSession::Overlap => SessionInfo {
                session,
                name: "European + US Overlap",
                hours_utc: "13:00 - 16:00",
                volatility: "very_high",
                average_volatility: 1.3,
            },
        }
    }
}

impl SessionProvider for SessionManager {
    fn current_session(&self) -> TradingSession {
        self.session_at(Utc::now())
    }
}

/// Fixed session, used by tests and deterministic replays
#[derive(Debug, Clone, Copy)]
pub struct FixedSession(pub TradingSession);

impl SessionProvider for FixedSession {
    fn current_session(&self) -> TradingSession {
        self.0
    }
}
