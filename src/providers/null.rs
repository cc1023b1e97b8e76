//! Null objects for optional capabilities
//!
//! Each reports `available() == false`; the scanner checks availability
//! before calling and otherwise skips the enrichment step.

use async_trait::async_trait;

use super::{AccountInfo, AccountProvider, VolumeProfileAnalyzer, WhaleDetector};
use crate::errors::ScanError;
use crate::types::{Timeframe, VolumeProfile, WhaleAnalysis};

/// Whale detection disabled
#[derive(Debug, Default)]
pub struct NullWhaleDetector;

#[async_trait]
impl WhaleDetector for NullWhaleDetector {
    fn available(&self) -> bool {
        false
    }

    async fn detect_whale_activity(&self, _symbol: &str) -> Result<WhaleAnalysis, ScanError> {
        Err(ScanError::Provider("whale detector disabled".to_string()))
    }
}

/// Volume profile analysis disabled
#[derive(Debug, Default)]
pub struct NullVolumeProfileAnalyzer;

#[async_trait]
impl VolumeProfileAnalyzer for NullVolumeProfileAnalyzer {
    fn available(&self) -> bool {
        false
    }

    async fn volume_profile(
        &self,
        _symbol: &str,
        _timeframe: Timeframe,
    ) -> Result<VolumeProfile, ScanError> {
        Err(ScanError::Provider(
            "volume profile analyzer disabled".to_string(),
        ))
    }
}

/// Account provider with no balance and no positions; sizing is deferred
#[derive(Debug, Default)]
pub struct NoAccount;

#[async_trait]
impl AccountProvider for NoAccount {
    async fn account_info(&self) -> Result<AccountInfo, ScanError> {
        Ok(AccountInfo::default())
    }
}
