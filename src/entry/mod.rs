//! Entry planning
//!
//! Derives concrete trade levels from the analysis: ATR-based stop and
//! target (2x ATR risk, 4x ATR reward), the implied R:R, and a
//! risk-percent position size when an account balance is known. Plan
//! generation never fails; degenerate inputs produce a plan that carries a
//! warning instead.

use serde::{Deserialize, Serialize};

use crate::logger::{self, LogTag};
use crate::scoring::infer_side;
use crate::types::{AssetAnalysis, Side, Ticker, Timeframe};
use crate::utils::{round2, round6};

/// Stop distance in ATR units
const STOP_ATR_MULTIPLE: f64 = 2.0;
/// Target distance in ATR units
const TARGET_ATR_MULTIPLE: f64 = 4.0;
/// ATR fallback as a fraction of price when the indicator is missing
const ATR_FALLBACK_PCT: f64 = 0.02;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPlan {
    pub side: Side,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk_reward: f64,
    /// Quantity in base units; zero when sizing is deferred
    pub recommended_size: f64,
    pub position_value: f64,
    pub risk_usd: f64,
    pub balance_available: bool,
    pub warning: Option<String>,
    pub entry_timeframe: Option<Timeframe>,
}

pub struct EntryPlanner;

impl EntryPlanner {
    /// Build an entry plan. `account_balance` is the total balance in quote
    /// currency; `risk_percent` the per-trade account risk (0.02 = 2%).
    pub fn build(
        analysis: &AssetAnalysis,
        ticker: &Ticker,
        account_balance: Option<f64>,
        risk_percent: f64,
    ) -> EntryPlan {
        let side = infer_side(&analysis.composite);
        let price = ticker.price;

        if price <= 0.0 || !price.is_finite() {
            return EntryPlan {
                side,
                entry_price: 0.0,
                stop_loss: 0.0,
                take_profit: 0.0,
                risk_reward: 0.0,
                recommended_size: 0.0,
                position_value: 0.0,
                risk_usd: 0.0,
                balance_available: false,
                warning: Some(format!(
                    "No valid price for {}; plan withheld",
                    ticker.symbol
                )),
                entry_timeframe: analysis.entry_timeframe(),
            };
        }

        let atr = analysis
            .timeframe(Timeframe::H4)
            .and_then(|tf| tf.indicators.atr_14)
            .filter(|atr| *atr > 0.0 && atr.is_finite())
            .unwrap_or(price * ATR_FALLBACK_PCT);

        let (stop_loss, take_profit) = match side {
            Side::Long => (
                price - atr * STOP_ATR_MULTIPLE,
                price + atr * TARGET_ATR_MULTIPLE,
            ),
            Side::Short => (
                price + atr * STOP_ATR_MULTIPLE,
                price - atr * TARGET_ATR_MULTIPLE,
            ),
        };

        let risk = (price - stop_loss).abs();
        let reward = (take_profit - price).abs();
        let risk_reward = if risk > 0.0 { reward / risk } else { 0.0 };

        let (recommended_size, position_value, risk_usd, balance_available, warning) =
            match account_balance {
                Some(balance) if balance > 0.0 => {
                    let risk_usd = balance * risk_percent;
                    let qty = round6(risk_usd / risk);
                    (qty, round2(qty * price), round2(risk_usd), true, None)
                }
                _ => (
                    0.0,
                    0.0,
                    0.0,
                    false,
                    Some(
                        "Account balance unavailable - analysis is valid but position \
                         sizing is deferred"
                            .to_string(),
                    ),
                ),
            };

        logger::debug(
            LogTag::Entry,
            &format!(
                "{} {} entry={:.4} sl={:.4} tp={:.4} rr={:.2} size={}",
                ticker.symbol,
                side,
                price,
                stop_loss,
                take_profit,
                risk_reward,
                recommended_size
            ),
        );

        EntryPlan {
            side,
            entry_price: price,
            stop_loss: round6(stop_loss),
            take_profit: round6(take_profit),
            risk_reward: round2(risk_reward),
            recommended_size,
            position_value,
            risk_usd,
            balance_available,
            warning,
            entry_timeframe: analysis.entry_timeframe(),
        }
    }
}
