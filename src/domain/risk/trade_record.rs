use crate::domain::market::MarketRegime;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeKind {
    Win,
    Loss,
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeKind::Win => write!(f, "WIN"),
            TradeKind::Loss => write!(f, "LOSS"),
        }
    }
}

/// Resolved trade before it is applied to the ledger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettledTrade {
    pub kind: TradeKind,
    /// Notional committed to the trade
    pub size: f64,
    /// Profit or loss as a fraction of the notional
    pub pct: f64,
    /// Absolute profit or loss amount (always non-negative)
    pub amount: f64,
    pub success_probability: f64,
}

/// Completed trade entry in the append-only history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: TradeKind,
    pub size: f64,
    pub amount: f64,
    pub pct: f64,
    pub confidence: f64,
    pub regime: MarketRegime,
    /// Win streak after a win, loss streak after a loss
    pub streak: u32,
    pub hot_streak_multiplier: f64,
}

impl TradeRecord {
    pub fn is_win(&self) -> bool {
        self.kind == TradeKind::Win
    }

    /// Signed P&L: positive for wins, negative for losses
    pub fn pnl(&self) -> f64 {
        match self.kind {
            TradeKind::Win => self.amount,
            TradeKind::Loss => -self.amount,
        }
    }
}

/// End-of-period rollup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub day: u32,
    pub date: NaiveDate,
    #[serde(rename = "return")]
    pub daily_return: f64,
    pub profit: f64,
    pub trades: u32,
    pub target_achieved: bool,
    pub rejections: u32,
}
