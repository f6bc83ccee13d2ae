use serde::{Deserialize, Serialize};

/// Point-in-time view of an engine's ledger and performance statistics.
///
/// Windowed statistics (`win_rate`, `average_win`, `average_loss`) use the
/// profile's trailing window, or the whole history when it has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub profile: String,

    pub capital: f64,
    pub initial_capital: f64,
    pub peak_capital: f64,
    pub drawdown: f64,
    pub total_return: f64,
    pub daily_return: f64,
    pub daily_pnl: f64,
    pub daily_trades: u32,
    pub daily_rejections: u32,

    pub consecutive_wins: u32,
    pub consecutive_losses: u32,
    pub max_consecutive_wins: u32,
    pub hot_streak_multiplier: f64,

    pub total_trades: usize,
    pub win_rate: f64,
    pub average_win: f64,
    pub average_loss: f64,

    pub leverage: f64,
    pub risk_multiplier: f64,
    pub daily_target: f64,
    /// Drawdown at which the engine stops trading
    pub max_drawdown_limit: f64,
    /// Win rate the profile aims for, when it declares one
    pub target_win_rate: Option<f64>,
    /// Progress toward the profile's target rule (1.0 = reached)
    pub target_progress: f64,

    pub consecutive_profitable_days: u32,
    pub total_profitable_days: u32,
    pub average_daily_return: f64,
    pub target_achievement_rate: f64,
    /// 1 − rejections / (trades + rejections) over the current period
    pub safety_score: f64,
}
