//! Regime snapshot store
//!
//! A compact per-scan record of the detected regime, persisted for
//! downstream consumers (reporting, threshold audits). Writes are
//! best-effort: the scanner logs failures and moves on.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::MarketRegime;
use crate::errors::ScanError;
use crate::logger::{self, LogTag};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeSnapshot {
    pub timestamp: DateTime<Utc>,
    pub regime_type: String,
    pub confidence: f64,
    pub btc_weekly_change_pct: f64,
    pub adx: f64,
    pub volatility: String,
    /// Full regime record as JSON for consumers that need the details
    pub payload: String,
}

/// SQLite-backed snapshot store. One writer at a time is plenty here;
/// the connection sits behind a mutex.
pub struct RegimeSnapshotStore {
    conn: Mutex<Connection>,
}

impl RegimeSnapshotStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory store for tests and ephemeral deployments
    pub fn open_in_memory() -> Result<Self, ScanError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, ScanError> {
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS regime_snapshots (
                timestamp TEXT PRIMARY KEY,
                regime_type TEXT NOT NULL,
                confidence REAL NOT NULL,
                btc_weekly_change_pct REAL NOT NULL,
                adx REAL NOT NULL,
                volatility TEXT NOT NULL,
                payload TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Persist one snapshot keyed by its timestamp
    pub fn record(&self, regime: &MarketRegime, at: DateTime<Utc>) -> Result<(), ScanError> {
        let payload = serde_json::to_string(regime)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO regime_snapshots
                (timestamp, regime_type, confidence, btc_weekly_change_pct, adx, volatility, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                at.to_rfc3339(),
                regime.regime_type.as_str(),
                regime.confidence,
                regime.metrics.btc_weekly_change_pct,
                regime.metrics.adx,
                regime.metrics.volatility.as_str(),
                payload,
            ],
        )?;
        Ok(())
    }

    /// Best-effort write used by the scanner; failures are logged only
    pub fn record_best_effort(&self, regime: &MarketRegime, at: DateTime<Utc>) {
        if let Err(err) = self.record(regime, at) {
            logger::warning(
                LogTag::Snapshot,
                &format!("Regime snapshot write failed: {}", err),
            );
        }
    }

    /// Most recent snapshot, if any
    pub fn latest(&self) -> Result<Option<RegimeSnapshot>, ScanError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT timestamp, regime_type, confidence, btc_weekly_change_pct,
                        adx, volatility, payload
                 FROM regime_snapshots
                 ORDER BY timestamp DESC
                 LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, f64>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(
            |(timestamp, regime_type, confidence, weekly, adx, volatility, payload)| {
                RegimeSnapshot {
                    timestamp: DateTime::parse_from_rfc3339(&timestamp)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                    regime_type,
                    confidence,
                    btc_weekly_change_pct: weekly,
                    adx,
                    volatility,
                    payload,
                }
            },
        ))
    }

    pub fn count(&self) -> Result<usize, ScanError> {
        let conn = self.conn.lock();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM regime_snapshots", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::{RegimeDetector, RegimeType};
    use crate::types::AssetAnalysis;
    use chrono::TimeZone;

    fn sample_regime() -> MarketRegime {
        RegimeDetector::detect(&AssetAnalysis::empty("BTC/USDT"))
    }

    #[test]
    fn test_record_and_read_latest() {
        let store = RegimeSnapshotStore::open_in_memory().unwrap();
        let regime = sample_regime();

        let first = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        store.record(&regime, first).unwrap();
        store.record(&regime, second).unwrap();

        let latest = store.latest().unwrap().expect("snapshot present");
        assert_eq!(latest.timestamp, second);
        assert_eq!(latest.regime_type, RegimeType::Uncertain.as_str());
        assert_eq!(store.count().unwrap(), 2);

        // Payload round-trips to a full regime record
        let parsed: MarketRegime = serde_json::from_str(&latest.payload).unwrap();
        assert_eq!(parsed.regime_type, RegimeType::Uncertain);
    }

    #[test]
    fn test_same_timestamp_replaces() {
        let store = RegimeSnapshotStore::open_in_memory().unwrap();
        let regime = sample_regime();
        let at = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        store.record(&regime, at).unwrap();
        store.record(&regime, at).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_latest_on_empty_store() {
        let store = RegimeSnapshotStore::open_in_memory().unwrap();
        assert!(store.latest().unwrap().is_none());
    }

    #[test]
    fn test_file_backed_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots.db");
        let store = RegimeSnapshotStore::open(&path).unwrap();
        store.record_best_effort(&sample_regime(), Utc::now());
        assert_eq!(store.count().unwrap(), 1);
    }
}
