use crate::domain::errors::SimulationError;
use crate::domain::market::MarketRegime;
use crate::domain::risk::trade_record::{DailySummary, SettledTrade, TradeKind, TradeRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Capital ledger and streak/daily bookkeeping owned by a single engine.
///
/// Invariants:
/// - `initial_capital` is positive and finite (enforced at construction)
/// - `peak_capital` never decreases
/// - at most one of `consecutive_wins` / `consecutive_losses` is non-zero
/// - `trade_history` is append-only
///
/// Deserialization goes through the same capital checks as [`RiskState::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RiskStateRecord")]
pub struct RiskState {
    capital: f64,
    initial_capital: f64,
    peak_capital: f64,

    consecutive_wins: u32,
    consecutive_losses: u32,
    max_consecutive_wins: u32,

    /// Stateful sizing multiplier, updated by the position sizer
    hot_streak_multiplier: f64,

    daily_trades: u32,
    daily_pnl: f64,
    /// Signal-gate rejections in the current period
    daily_rejections: u32,

    consecutive_profitable_days: u32,
    total_profitable_days: u32,

    trade_history: Vec<TradeRecord>,
    daily_history: Vec<DailySummary>,
}

impl RiskState {
    pub fn new(capital: f64) -> Result<Self, SimulationError> {
        if !capital.is_finite() || capital <= 0.0 {
            return Err(SimulationError::InvalidCapital { amount: capital });
        }

        Ok(Self {
            capital,
            initial_capital: capital,
            peak_capital: capital,
            consecutive_wins: 0,
            consecutive_losses: 0,
            max_consecutive_wins: 0,
            hot_streak_multiplier: 1.0,
            daily_trades: 0,
            daily_pnl: 0.0,
            daily_rejections: 0,
            consecutive_profitable_days: 0,
            total_profitable_days: 0,
            trade_history: Vec::new(),
            daily_history: Vec::new(),
        })
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn peak_capital(&self) -> f64 {
        self.peak_capital
    }

    pub fn consecutive_wins(&self) -> u32 {
        self.consecutive_wins
    }

    pub fn consecutive_losses(&self) -> u32 {
        self.consecutive_losses
    }

    pub fn max_consecutive_wins(&self) -> u32 {
        self.max_consecutive_wins
    }

    pub fn hot_streak_multiplier(&self) -> f64 {
        self.hot_streak_multiplier
    }

    pub fn daily_trades(&self) -> u32 {
        self.daily_trades
    }

    pub fn daily_pnl(&self) -> f64 {
        self.daily_pnl
    }

    pub fn daily_rejections(&self) -> u32 {
        self.daily_rejections
    }

    pub fn consecutive_profitable_days(&self) -> u32 {
        self.consecutive_profitable_days
    }

    pub fn total_profitable_days(&self) -> u32 {
        self.total_profitable_days
    }

    pub fn trade_history(&self) -> &[TradeRecord] {
        &self.trade_history
    }

    pub fn daily_history(&self) -> &[DailySummary] {
        &self.daily_history
    }

    /// Fractional decline of capital below the initial capital
    pub fn drawdown(&self) -> f64 {
        (self.initial_capital - self.capital) / self.initial_capital
    }

    pub fn total_return(&self) -> f64 {
        (self.capital - self.initial_capital) / self.initial_capital
    }

    /// Period P&L relative to current capital (0 when capital is exhausted)
    pub fn daily_return(&self) -> f64 {
        if self.capital > 0.0 {
            self.daily_pnl / self.capital
        } else {
            0.0
        }
    }

    /// Fractional distance of capital below the peak
    pub fn peak_distance(&self) -> f64 {
        if self.peak_capital > 0.0 {
            (self.peak_capital - self.capital) / self.peak_capital
        } else {
            0.0
        }
    }

    pub(crate) fn set_hot_streak_multiplier(&mut self, multiplier: f64) {
        self.hot_streak_multiplier = multiplier;
    }

    /// Applies a resolved trade to capital, streaks and daily counters, and
    /// appends it to the history stamped with `at`.
    pub fn apply(
        &mut self,
        trade: &SettledTrade,
        confidence: f64,
        regime: MarketRegime,
        at: DateTime<Utc>,
    ) -> &TradeRecord {
        let streak = match trade.kind {
            TradeKind::Win => {
                self.capital += trade.amount;
                self.daily_pnl += trade.amount;
                self.consecutive_wins += 1;
                self.consecutive_losses = 0;
                self.max_consecutive_wins = self.max_consecutive_wins.max(self.consecutive_wins);
                if self.capital > self.peak_capital {
                    self.peak_capital = self.capital;
                }
                self.consecutive_wins
            }
            TradeKind::Loss => {
                self.capital -= trade.amount;
                self.daily_pnl -= trade.amount;
                self.consecutive_losses += 1;
                self.consecutive_wins = 0;
                self.consecutive_losses
            }
        };
        self.daily_trades += 1;

        self.trade_history.push(TradeRecord {
            sequence: self.trade_history.len() as u64 + 1,
            timestamp: at,
            kind: trade.kind,
            size: trade.size,
            amount: trade.amount,
            pct: trade.pct,
            confidence,
            regime,
            streak,
            hot_streak_multiplier: self.hot_streak_multiplier,
        });

        &self.trade_history[self.trade_history.len() - 1]
    }

    pub fn record_rejection(&mut self) {
        self.daily_rejections += 1;
    }

    /// External capital replenishment
    pub fn deposit(&mut self, amount: f64) -> Result<(), SimulationError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(SimulationError::InvalidCapital { amount });
        }
        self.capital += amount;
        if self.capital > self.peak_capital {
            self.peak_capital = self.capital;
        }
        Ok(())
    }

    /// Clears per-period counters. Capital and history are untouched.
    pub fn reset_daily_counters(&mut self) {
        self.daily_trades = 0;
        self.daily_pnl = 0.0;
        self.daily_rejections = 0;
    }

    /// Appends a rollup of the current period, updates profitable-day
    /// tracking, then resets the daily counters.
    pub fn close_day(&mut self, daily_target: f64, at: DateTime<Utc>) -> DailySummary {
        let daily_return = self.daily_return();

        if self.daily_pnl > 0.0 {
            self.consecutive_profitable_days += 1;
            self.total_profitable_days += 1;
        } else {
            self.consecutive_profitable_days = 0;
        }

        let summary = DailySummary {
            day: self.daily_history.len() as u32 + 1,
            date: at.date_naive(),
            daily_return,
            profit: self.daily_pnl,
            trades: self.daily_trades,
            target_achieved: daily_return >= daily_target,
            rejections: self.daily_rejections,
        };
        self.daily_history.push(summary.clone());
        self.reset_daily_counters();

        summary
    }

    /// Most recent `window` trades, or the whole history when `window` is `None`
    pub fn recent_trades(&self, window: Option<usize>) -> &[TradeRecord] {
        match window {
            Some(n) => {
                let start = self.trade_history.len().saturating_sub(n);
                &self.trade_history[start..]
            }
            None => &self.trade_history,
        }
    }

    pub fn win_rate(&self, window: Option<usize>) -> f64 {
        let trades = self.recent_trades(window);
        if trades.is_empty() {
            return 0.0;
        }
        let wins = trades.iter().filter(|t| t.is_win()).count();
        wins as f64 / trades.len() as f64
    }

    pub fn average_win(&self, window: Option<usize>) -> f64 {
        Self::mean_amount(self.recent_trades(window), TradeKind::Win)
    }

    pub fn average_loss(&self, window: Option<usize>) -> f64 {
        Self::mean_amount(self.recent_trades(window), TradeKind::Loss)
    }

    fn mean_amount(trades: &[TradeRecord], kind: TradeKind) -> f64 {
        let (sum, count) = trades
            .iter()
            .filter(|t| t.kind == kind)
            .fold((0.0, 0usize), |(sum, count), t| (sum + t.amount, count + 1));
        if count == 0 { 0.0 } else { sum / count as f64 }
    }
}

/// Serialized form of [`RiskState`], validated on the way in
#[derive(Deserialize)]
struct RiskStateRecord {
    capital: f64,
    initial_capital: f64,
    peak_capital: f64,
    consecutive_wins: u32,
    consecutive_losses: u32,
    max_consecutive_wins: u32,
    hot_streak_multiplier: f64,
    daily_trades: u32,
    daily_pnl: f64,
    daily_rejections: u32,
    consecutive_profitable_days: u32,
    total_profitable_days: u32,
    trade_history: Vec<TradeRecord>,
    daily_history: Vec<DailySummary>,
}

impl TryFrom<RiskStateRecord> for RiskState {
    type Error = SimulationError;

    fn try_from(record: RiskStateRecord) -> Result<Self, Self::Error> {
        let mut state = RiskState::new(record.initial_capital)?;
        if !record.capital.is_finite() {
            return Err(SimulationError::InvalidCapital {
                amount: record.capital,
            });
        }
        if !(record.peak_capital.is_finite()
            && record.peak_capital >= record.initial_capital
            && record.peak_capital >= record.capital)
        {
            return Err(SimulationError::InvalidCapital {
                amount: record.peak_capital,
            });
        }

        state.capital = record.capital;
        state.peak_capital = record.peak_capital;
        state.consecutive_wins = record.consecutive_wins;
        state.consecutive_losses = record.consecutive_losses;
        state.max_consecutive_wins = record.max_consecutive_wins;
        state.hot_streak_multiplier = record.hot_streak_multiplier;
        state.daily_trades = record.daily_trades;
        state.daily_pnl = record.daily_pnl;
        state.daily_rejections = record.daily_rejections;
        state.consecutive_profitable_days = record.consecutive_profitable_days;
        state.total_profitable_days = record.total_profitable_days;
        state.trade_history = record.trade_history;
        state.daily_history = record.daily_history;
        Ok(state)
    }
}
