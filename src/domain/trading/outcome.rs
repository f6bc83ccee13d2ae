use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a trade attempt did not execute. Blocks are business outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BlockReason {
    DailyLimit { trades: u32, limit: u32 },
    TargetReached { current: f64, target: f64 },
    DrawdownStop { drawdown: f64, limit: f64 },
    SignalRejected { failed_checks: Vec<String> },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::DailyLimit { trades, limit } => {
                write!(f, "daily limit ({}/{})", trades, limit)
            }
            BlockReason::TargetReached { current, target } => {
                write!(f, "target hit ({:.4} >= {:.4})", current, target)
            }
            BlockReason::DrawdownStop { drawdown, limit } => {
                write!(f, "drawdown stop ({:.2}% > {:.2}%)", drawdown * 100.0, limit * 100.0)
            }
            BlockReason::SignalRejected { failed_checks } => {
                write!(f, "signal rejected [{}]", failed_checks.join(", "))
            }
        }
    }
}

/// Result of a single `trade` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Blocked {
        reason: BlockReason,
    },
    Win {
        size: f64,
        profit_amount: f64,
        profit_pct: f64,
    },
    Loss {
        size: f64,
        loss_amount: f64,
        loss_pct: f64,
    },
}

impl Outcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Outcome::Blocked { .. })
    }

    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win { .. })
    }

    pub fn is_loss(&self) -> bool {
        matches!(self, Outcome::Loss { .. })
    }

    pub fn block_reason(&self) -> Option<&BlockReason> {
        match self {
            Outcome::Blocked { reason } => Some(reason),
            _ => None,
        }
    }

    /// Notional committed, or 0 when blocked
    pub fn size(&self) -> f64 {
        match self {
            Outcome::Win { size, .. } | Outcome::Loss { size, .. } => *size,
            Outcome::Blocked { .. } => 0.0,
        }
    }

    /// Signed P&L of the trade, 0 when blocked
    pub fn pnl(&self) -> f64 {
        match self {
            Outcome::Win { profit_amount, .. } => *profit_amount,
            Outcome::Loss { loss_amount, .. } => -*loss_amount,
            Outcome::Blocked { .. } => 0.0,
        }
    }
}
