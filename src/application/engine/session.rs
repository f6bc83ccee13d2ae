//! Multi-day sessions driving an engine with synthetic snapshots.

use crate::application::engine::profile::StrategyProfile;
use crate::application::engine::strategy_engine::StrategyEngine;
use crate::domain::errors::SimulationError;
use crate::domain::risk::DailySummary;
use crate::domain::trading::{BlockReason, EngineStatus, Outcome};
use crate::infrastructure::random::StdRandom;
use crate::infrastructure::simulation::SnapshotGenerator;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub days: u32,
    /// Snapshots offered to the engine per day
    pub ticks_per_day: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            days: 5,
            ticks_per_day: 50,
        }
    }
}

/// Count of blocked attempts by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockTally {
    pub daily_limit: u32,
    pub target_reached: u32,
    pub drawdown_stop: u32,
    pub signal_rejected: u32,
}

impl BlockTally {
    pub fn record(&mut self, reason: &BlockReason) {
        match reason {
            BlockReason::DailyLimit { .. } => self.daily_limit += 1,
            BlockReason::TargetReached { .. } => self.target_reached += 1,
            BlockReason::DrawdownStop { .. } => self.drawdown_stop += 1,
            BlockReason::SignalRejected { .. } => self.signal_rejected += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.daily_limit + self.target_reached + self.drawdown_stop + self.signal_rejected
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub days: Vec<DailySummary>,
    pub wins: u32,
    pub losses: u32,
    pub blocked: BlockTally,
    pub status: EngineStatus,
}

/// Feeds `ticks_per_day` snapshots per day to the engine, closing each day
/// with an end-of-day summary.
pub fn run_session(
    engine: &mut StrategyEngine,
    generator: &mut SnapshotGenerator,
    config: &SessionConfig,
) -> SessionReport {
    let mut days = Vec::with_capacity(config.days as usize);
    let mut wins = 0;
    let mut losses = 0;
    let mut blocked = BlockTally::default();

    for _ in 0..config.days {
        for _ in 0..config.ticks_per_day {
            let snapshot = generator.next_snapshot();
            match engine.trade(&snapshot) {
                Outcome::Win { .. } => wins += 1,
                Outcome::Loss { .. } => losses += 1,
                Outcome::Blocked { reason } => blocked.record(&reason),
            }
        }
        days.push(engine.end_of_day_summary());
    }

    let status = engine.status();
    info!(
        "Session[{}]: {} days | {}W/{}L | {} blocked | capital ${:.2} ({:+.2}%)",
        status.profile,
        config.days,
        wins,
        losses,
        blocked.total(),
        status.capital,
        status.total_return * 100.0
    );

    SessionReport {
        days,
        wins,
        losses,
        blocked,
        status,
    }
}

/// Aggregate over independently seeded sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub profile: String,
    pub sessions: usize,
    pub mean_final_capital: f64,
    pub median_final_capital: f64,
    /// Share of sessions ending above the initial capital
    pub profitable_share: f64,
    pub worst_drawdown: f64,
    pub mean_win_rate: f64,
}

/// Runs `sessions` sessions in parallel, one engine per worker.
///
/// Session `i` seeds its engine with `base_seed + 2i` and its snapshot
/// generator with `base_seed + 2i + 1`, so results do not depend on the
/// thread count.
pub fn run_batch(
    profile: &StrategyProfile,
    capital: f64,
    base_seed: u64,
    sessions: usize,
    signal_quality: f64,
    config: &SessionConfig,
) -> Result<BatchReport, SimulationError> {
    profile.validate()?;

    let reports: Vec<SessionReport> = (0..sessions as u64)
        .into_par_iter()
        .map(|i| -> Result<SessionReport, SimulationError> {
            let engine_seed = base_seed.wrapping_add(2 * i);
            let mut engine = StrategyEngine::new(
                profile.clone(),
                capital,
                Box::new(StdRandom::seeded(engine_seed)),
            )?;
            let mut generator =
                SnapshotGenerator::seeded(engine_seed.wrapping_add(1), signal_quality);
            Ok(run_session(&mut engine, &mut generator, config))
        })
        .collect::<Result<Vec<_>, SimulationError>>()?;

    Ok(aggregate(profile, capital, &reports))
}

fn aggregate(profile: &StrategyProfile, capital: f64, reports: &[SessionReport]) -> BatchReport {
    let n = reports.len();
    if n == 0 {
        return BatchReport {
            profile: profile.kind.to_string(),
            sessions: 0,
            mean_final_capital: capital,
            median_final_capital: capital,
            profitable_share: 0.0,
            worst_drawdown: 0.0,
            mean_win_rate: 0.0,
        };
    }

    let mut finals: Vec<f64> = reports.iter().map(|r| r.status.capital).collect();
    finals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mean_final_capital = finals.iter().sum::<f64>() / n as f64;
    let median_final_capital = finals[n / 2];
    let profitable = finals.iter().filter(|c| **c > capital).count();
    let worst_drawdown = reports
        .iter()
        .map(|r| r.status.drawdown)
        .fold(0.0_f64, f64::max);
    let mean_win_rate = reports.iter().map(|r| r.status.win_rate).sum::<f64>() / n as f64;

    BatchReport {
        profile: profile.kind.to_string(),
        sessions: n,
        mean_final_capital,
        median_final_capital,
        profitable_share: profitable as f64 / n as f64,
        worst_drawdown,
        mean_win_rate,
    }
}
