use crate::application::engine::profile::{ProfileKind, StrategyProfile, TargetRule};
use crate::application::risk_management::{OutcomeSimulator, PositionSizer, SizingBreakdown};
use crate::application::signals::SignalGate;
use crate::domain::errors::SimulationError;
use crate::domain::market::MetricsSnapshot;
use crate::domain::ports::{Clock, RandomSource};
use crate::domain::risk::{DailySummary, RiskState, TradeKind};
use crate::domain::trading::{BlockReason, EngineStatus, Outcome};
use crate::infrastructure::clock::SystemClock;
use tracing::{debug, info, warn};

/// Generic trading bot: pre-trade limits, then gate, size, resolve and apply.
///
/// All per-bot behaviour comes from the [`StrategyProfile`]. The engine owns
/// its ledger, random source and clock, so one instance must not be shared across
/// concurrent callers without external synchronisation.
pub struct StrategyEngine {
    profile: StrategyProfile,
    gate: Box<dyn SignalGate>,
    sizer: PositionSizer,
    simulator: OutcomeSimulator,
    state: RiskState,
    random: Box<dyn RandomSource>,
    clock: Box<dyn Clock>,
}

impl StrategyEngine {
    pub fn new(
        profile: StrategyProfile,
        capital: f64,
        random: Box<dyn RandomSource>,
    ) -> Result<Self, SimulationError> {
        profile.validate()?;
        let state = RiskState::new(capital)?;

        let gate = profile.gate.build();
        let sizer = PositionSizer::new(
            profile.sizing.clone(),
            profile.daily_target,
            profile.max_daily_trades,
        );
        let simulator = OutcomeSimulator::new(profile.outcome.clone());

        info!(
            "StrategyEngine[{}]: initialized with capital ${:.2} (max DD {:.1}%, {} trades/day)",
            profile.kind,
            capital,
            profile.max_drawdown * 100.0,
            profile.max_daily_trades
        );

        Ok(Self {
            profile,
            gate,
            sizer,
            simulator,
            state,
            random,
            clock: Box::new(SystemClock),
        })
    }

    /// Replaces the wall clock used to stamp trades and daily rollups
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn aggressive(
        capital: f64,
        random: Box<dyn RandomSource>,
    ) -> Result<Self, SimulationError> {
        Self::new(StrategyProfile::aggressive(), capital, random)
    }

    pub fn conservative(
        capital: f64,
        random: Box<dyn RandomSource>,
    ) -> Result<Self, SimulationError> {
        Self::new(StrategyProfile::conservative(), capital, random)
    }

    pub fn flip(capital: f64, random: Box<dyn RandomSource>) -> Result<Self, SimulationError> {
        Self::new(StrategyProfile::flip(), capital, random)
    }

    pub fn profile(&self) -> &StrategyProfile {
        &self.profile
    }

    pub fn kind(&self) -> ProfileKind {
        self.profile.kind
    }

    pub fn state(&self) -> &RiskState {
        &self.state
    }

    /// Evaluates one snapshot. Limits are checked in order and the first
    /// one hit short-circuits: daily limit, target, drawdown, signal gate.
    pub fn trade(&mut self, snapshot: &MetricsSnapshot) -> Outcome {
        if let Some(reason) = self.pre_trade_block() {
            return Outcome::Blocked { reason };
        }

        let failed = self.gate.failed_checks(snapshot);
        if !failed.is_empty() {
            self.state.record_rejection();
            debug!(
                "StrategyEngine[{}]: {} rejected snapshot ({})",
                self.profile.kind,
                self.gate.name(),
                failed.join(", ")
            );
            return Outcome::Blocked {
                reason: BlockReason::SignalRejected {
                    failed_checks: failed.into_iter().map(String::from).collect(),
                },
            };
        }

        let sizing = self.sizer.compute(&mut self.state, snapshot);
        let settled =
            self.simulator
                .resolve(&self.state, snapshot, sizing.notional, self.random.as_mut());

        self.state.apply(
            &settled,
            snapshot.ai_confidence(),
            snapshot.regime(),
            self.clock.now(),
        );
        if settled.kind == TradeKind::Loss {
            self.sizer.settle_loss(&mut self.state);
        }

        info!(
            "StrategyEngine[{}]: {} ${:.2} on ${:.2} ({:.2}%, p={:.2}) | capital ${:.2} | streak {}W/{}L",
            self.profile.kind,
            settled.kind,
            settled.amount,
            settled.size,
            settled.pct * 100.0,
            settled.success_probability,
            self.state.capital(),
            self.state.consecutive_wins(),
            self.state.consecutive_losses()
        );

        match settled.kind {
            TradeKind::Win => Outcome::Win {
                size: settled.size,
                profit_amount: settled.amount,
                profit_pct: settled.pct,
            },
            TradeKind::Loss => Outcome::Loss {
                size: settled.size,
                loss_amount: settled.amount,
                loss_pct: settled.pct,
            },
        }
    }

    fn pre_trade_block(&self) -> Option<BlockReason> {
        let profile = &self.profile;

        if self.state.daily_trades() >= profile.max_daily_trades {
            debug!(
                "StrategyEngine[{}]: daily limit reached ({})",
                profile.kind, profile.max_daily_trades
            );
            return Some(BlockReason::DailyLimit {
                trades: self.state.daily_trades(),
                limit: profile.max_daily_trades,
            });
        }

        let target_metric = match profile.target_rule {
            TargetRule::None => None,
            TargetRule::TotalReturn => Some(self.state.total_return()),
            TargetRule::DailyReturn => Some(self.state.daily_return()),
        };
        if let Some(current) = target_metric {
            if current >= profile.daily_target {
                debug!(
                    "StrategyEngine[{}]: target hit ({:.2}% >= {:.2}%)",
                    profile.kind,
                    current * 100.0,
                    profile.daily_target * 100.0
                );
                return Some(BlockReason::TargetReached {
                    current,
                    target: profile.daily_target,
                });
            }
        }

        let drawdown = self.state.drawdown();
        if drawdown > profile.max_drawdown {
            warn!(
                "StrategyEngine[{}]: drawdown stop {:.2}% exceeds limit {:.2}%",
                profile.kind,
                drawdown * 100.0,
                profile.max_drawdown * 100.0
            );
            return Some(BlockReason::DrawdownStop {
                drawdown,
                limit: profile.max_drawdown,
            });
        }

        None
    }

    /// Sizing the next trade would get, computed on a copy of the ledger
    pub fn preview_sizing(&self, snapshot: &MetricsSnapshot) -> SizingBreakdown {
        let mut scratch = self.state.clone();
        self.sizer.compute(&mut scratch, snapshot)
    }

    pub fn reset_daily_counters(&mut self) {
        self.state.reset_daily_counters();
        debug!("StrategyEngine[{}]: daily counters reset", self.profile.kind);
    }

    /// Appends the day's rollup and resets the daily counters
    pub fn end_of_day_summary(&mut self) -> DailySummary {
        let summary = self
            .state
            .close_day(self.profile.daily_target, self.clock.now());
        info!(
            "StrategyEngine[{}]: day {} closed | return {:.2}% | profit ${:.2} | {} trades | {} rejections | target {}",
            self.profile.kind,
            summary.day,
            summary.daily_return * 100.0,
            summary.profit,
            summary.trades,
            summary.rejections,
            if summary.target_achieved { "met" } else { "missed" }
        );
        summary
    }

    /// External capital replenishment
    pub fn deposit(&mut self, amount: f64) -> Result<(), SimulationError> {
        self.state.deposit(amount)?;
        info!(
            "StrategyEngine[{}]: deposited ${:.2}, capital now ${:.2}",
            self.profile.kind,
            amount,
            self.state.capital()
        );
        Ok(())
    }

    pub fn status(&self) -> EngineStatus {
        let state = &self.state;
        let profile = &self.profile;
        let window = profile.win_rate_window;

        let target_progress = if profile.daily_target > 0.0 {
            match profile.target_rule {
                TargetRule::TotalReturn => state.total_return() / profile.daily_target,
                TargetRule::DailyReturn | TargetRule::None => {
                    state.daily_return() / profile.daily_target
                }
            }
        } else {
            0.0
        };

        let days = state.daily_history();
        let (average_daily_return, target_achievement_rate) = if days.is_empty() {
            (0.0, 0.0)
        } else {
            let n = days.len() as f64;
            let total: f64 = days.iter().map(|d| d.daily_return).sum();
            let achieved = days.iter().filter(|d| d.target_achieved).count();
            (total / n, achieved as f64 / n)
        };

        let attempts = (state.daily_trades() + state.daily_rejections()).max(1);
        let safety_score = 1.0 - state.daily_rejections() as f64 / attempts as f64;

        EngineStatus {
            profile: profile.kind.to_string(),
            capital: state.capital(),
            initial_capital: state.initial_capital(),
            peak_capital: state.peak_capital(),
            drawdown: state.drawdown(),
            total_return: state.total_return(),
            daily_return: state.daily_return(),
            daily_pnl: state.daily_pnl(),
            daily_trades: state.daily_trades(),
            daily_rejections: state.daily_rejections(),
            consecutive_wins: state.consecutive_wins(),
            consecutive_losses: state.consecutive_losses(),
            max_consecutive_wins: state.max_consecutive_wins(),
            hot_streak_multiplier: state.hot_streak_multiplier(),
            total_trades: state.trade_history().len(),
            win_rate: state.win_rate(window),
            average_win: state.average_win(window),
            average_loss: state.average_loss(window),
            leverage: profile.leverage,
            risk_multiplier: profile.risk_multiplier,
            daily_target: profile.daily_target,
            max_drawdown_limit: profile.max_drawdown,
            target_win_rate: profile.target_win_rate,
            target_progress,
            consecutive_profitable_days: state.consecutive_profitable_days(),
            total_profitable_days: state.total_profitable_days(),
            average_daily_return,
            target_achievement_rate,
            safety_score,
        }
    }
}
