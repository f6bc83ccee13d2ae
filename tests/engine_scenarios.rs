use stratsim::application::engine::{ProfileKind, StrategyEngine};
use stratsim::config::ProfileOverrides;
use stratsim::domain::market::{MarketRegime, MetricsSnapshot};
use stratsim::domain::trading::{BlockReason, Outcome};
use stratsim::infrastructure::simulation::SnapshotGenerator;
use stratsim::infrastructure::{FixedClock, ScriptedRandom, StdRandom};

fn conservative_snapshot() -> MetricsSnapshot {
    MetricsSnapshot::new()
        .with_spread(0.001)
        .with_volume(2_000_000.0)
        .with_volatility(0.03)
        .with_ai_confidence(0.9)
        .with_regime(MarketRegime::TrendingBull)
        .with_support_resistance(0.8)
        .with_trend_strength(0.7)
        .with_confluence(0.8)
        .with_rsi(50.0)
        .with_volume_profile(0.9)
}

fn aggressive_snapshot() -> MetricsSnapshot {
    MetricsSnapshot::new()
        .with_momentum(0.8)
        .with_trend_strength(0.7)
        .with_breakout_score(0.85)
        .with_volatility(0.06)
        .with_volume_spike(true)
        .with_ai_confidence(0.8)
        .with_regime(MarketRegime::TrendingBull)
        .with_rsi(80.0)
        .with_confluence(0.75)
}

fn always_win() -> Box<ScriptedRandom> {
    // Branch draw 0.0 always wins; payoff draw 1/6 puts the conservative
    // base profit at exactly 1%.
    Box::new(ScriptedRandom::new(vec![0.0, 1.0 / 6.0]))
}

fn always_lose() -> Box<ScriptedRandom> {
    Box::new(ScriptedRandom::new(vec![0.99]))
}

#[test]
fn test_conservative_forced_win() {
    let mut engine = StrategyEngine::conservative(10_000.0, always_win()).unwrap();

    let outcome = engine.trade(&conservative_snapshot());

    let Outcome::Win {
        size,
        profit_amount,
        profit_pct,
    } = outcome
    else {
        panic!("expected win, got {:?}", outcome);
    };

    // base 1% with threshold confidence factor 1 + 0.5 * (0.9 - 0.8)
    assert!((size - 105.0).abs() < 1e-9);
    // 1% x confidence bonus (1 + 0.15 * 0.2) x bull regime 1.15
    let expected_pct = 0.01 * 1.03 * 1.15;
    assert!((profit_pct - expected_pct).abs() < 1e-12);
    assert!((profit_amount - 1.243725).abs() < 1e-9);

    let state = engine.state();
    assert!((state.capital() - (10_000.0 + size * expected_pct)).abs() < 1e-9);
    assert_eq!(state.daily_trades(), 1);
    assert_eq!(state.consecutive_wins(), 1);
    assert_eq!(state.consecutive_losses(), 0);
}

#[test]
fn test_aggressive_two_losses_shrink_next_position() {
    let mut engine = StrategyEngine::aggressive(10_000.0, always_lose()).unwrap();
    let snapshot = aggressive_snapshot();

    assert!(engine.trade(&snapshot).is_loss());
    assert!(engine.trade(&snapshot).is_loss());
    assert_eq!(engine.state().consecutive_losses(), 2);
    assert_eq!(engine.state().consecutive_wins(), 0);

    let preview = engine.preview_sizing(&snapshot);
    assert!((preview.loss_streak_factor - 0.70).abs() < 1e-12);
}

#[test]
fn test_flip_blocks_after_doubling() {
    let mut engine = StrategyEngine::flip(1_000.0, always_win()).unwrap();
    engine.deposit(1_000.0).unwrap();

    // Would fail every flip check; the target is evaluated first.
    let outcome = engine.trade(&MetricsSnapshot::new().with_volatility(0.0));

    match outcome {
        Outcome::Blocked {
            reason: BlockReason::TargetReached { current, target },
        } => {
            assert!((current - 1.0).abs() < 1e-12);
            assert_eq!(target, 1.0);
        }
        other => panic!("expected target block, got {:?}", other),
    }
    assert_eq!(engine.state().daily_rejections(), 0);
}

#[test]
fn test_daily_limit_and_reset() {
    let mut engine = StrategyEngine::conservative(10_000.0, always_win()).unwrap();
    let snapshot = conservative_snapshot();

    for _ in 0..4 {
        assert!(engine.trade(&snapshot).is_win());
    }

    let outcome = engine.trade(&snapshot);
    assert_eq!(
        outcome.block_reason(),
        Some(&BlockReason::DailyLimit {
            trades: 4,
            limit: 4
        })
    );
    let capital = engine.state().capital();

    engine.reset_daily_counters();
    assert_eq!(engine.state().daily_trades(), 0);
    assert_eq!(engine.state().capital(), capital);
    assert!(engine.trade(&snapshot).is_win());
}

#[test]
fn test_drawdown_stop_holds_until_deposit() {
    let overrides = ProfileOverrides {
        max_drawdown: Some(0.001),
        ..Default::default()
    };
    let profile = overrides.build_profile(ProfileKind::Aggressive);
    let mut engine = StrategyEngine::new(profile, 10_000.0, always_lose()).unwrap();
    let snapshot = aggressive_snapshot();

    assert!(engine.trade(&snapshot).is_loss());
    let capital = engine.state().capital();
    assert!(engine.state().drawdown() > 0.001);

    for _ in 0..3 {
        let outcome = engine.trade(&snapshot);
        assert!(matches!(
            outcome.block_reason(),
            Some(BlockReason::DrawdownStop { .. })
        ));
    }
    engine.reset_daily_counters();
    assert!(matches!(
        engine.trade(&snapshot).block_reason(),
        Some(BlockReason::DrawdownStop { .. })
    ));
    assert_eq!(engine.state().capital(), capital);

    engine.deposit(10_000.0 - capital).unwrap();
    assert!(!engine.trade(&snapshot).is_blocked());
}

#[test]
fn test_gate_failure_changes_nothing_but_rejections() {
    let mut engine = StrategyEngine::aggressive(10_000.0, always_win()).unwrap();
    let snapshot = aggressive_snapshot().with_ai_confidence(0.2);

    let outcome = engine.trade(&snapshot);

    match outcome.block_reason() {
        Some(BlockReason::SignalRejected { failed_checks }) => {
            assert_eq!(failed_checks, &vec!["ai_confidence".to_string()]);
        }
        other => panic!("expected signal rejection, got {:?}", other),
    }
    let state = engine.state();
    assert_eq!(state.capital(), 10_000.0);
    assert_eq!(state.consecutive_wins(), 0);
    assert_eq!(state.consecutive_losses(), 0);
    assert_eq!(state.daily_trades(), 0);
    assert_eq!(state.daily_rejections(), 1);
}

#[test]
fn test_seeded_runs_are_deterministic() {
    let run = || {
        let mut engine = StrategyEngine::flip(1_000.0, Box::new(StdRandom::seeded(42)))
            .unwrap()
            .with_clock(Box::new(FixedClock::default()));
        let mut generator = SnapshotGenerator::seeded(7, 0.8);
        let mut outcomes = Vec::new();
        for day in 0..4 {
            for _ in 0..25 {
                outcomes.push(engine.trade(&generator.next_snapshot()));
            }
            if day < 3 {
                engine.end_of_day_summary();
            }
        }
        let ledger = serde_json::to_string(engine.state()).unwrap();
        (outcomes, ledger, engine.status())
    };

    let (outcomes_a, ledger_a, status_a) = run();
    let (outcomes_b, ledger_b, status_b) = run();

    assert!(outcomes_a.iter().any(|o| !o.is_blocked()));
    assert_eq!(outcomes_a, outcomes_b);
    assert_eq!(ledger_a, ledger_b);
    assert_eq!(status_a, status_b);
}

fn conservative_with_target(target: f64, max_daily_trades: Option<u32>) -> StrategyEngine {
    let overrides = ProfileOverrides {
        daily_target: Some(target),
        max_daily_trades,
        ..Default::default()
    };
    let profile = overrides.build_profile(ProfileKind::Conservative);
    StrategyEngine::new(profile, 10_000.0, always_win()).unwrap()
}

#[test]
fn test_conservative_daily_target_blocks_until_reset() {
    let mut engine = conservative_with_target(1e-5, None);
    let snapshot = conservative_snapshot();

    assert!(engine.trade(&snapshot).is_win());

    match engine.trade(&snapshot) {
        Outcome::Blocked {
            reason: BlockReason::TargetReached { current, target },
        } => {
            assert!(current >= 1e-5);
            assert_eq!(target, 1e-5);
        }
        other => panic!("expected target block, got {:?}", other),
    }
    assert_eq!(engine.state().daily_trades(), 1);
    assert_eq!(engine.state().daily_rejections(), 0);

    engine.reset_daily_counters();
    assert!(engine.trade(&snapshot).is_win());
}

#[test]
fn test_daily_limit_takes_precedence_over_target() {
    let mut engine = conservative_with_target(1e-5, Some(1));
    let snapshot = conservative_snapshot();

    assert!(engine.trade(&snapshot).is_win());
    assert!(engine.state().daily_return() >= 1e-5);

    assert_eq!(
        engine.trade(&snapshot).block_reason(),
        Some(&BlockReason::DailyLimit {
            trades: 1,
            limit: 1
        })
    );
}
