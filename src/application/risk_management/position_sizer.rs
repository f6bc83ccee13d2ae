use crate::application::risk_management::sizing_config::{
    BaseSizing, SizingConfig, SuggestedSizePolicy,
};
use crate::domain::market::MetricsSnapshot;
use crate::domain::risk::RiskState;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Every factor that went into a sizing decision. Factors that do not apply
/// to the profile are reported as 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingBreakdown {
    pub capital: f64,
    pub base_fraction: f64,
    pub confidence_factor: f64,
    pub momentum_factor: f64,
    pub hot_streak_factor: f64,
    pub loss_streak_factor: f64,
    pub drawdown_step_factor: f64,
    pub drawdown_taper_factor: f64,
    pub target_brake_factor: f64,
    pub peak_distance_factor: f64,
    pub recent_form_factor: f64,
    pub leverage_factor: f64,
    /// Notional before clamping
    pub raw_notional: f64,
    pub min_notional: f64,
    pub max_notional: f64,
    /// Final committed notional
    pub notional: f64,
}

impl SizingBreakdown {
    pub fn combined_factor(&self) -> f64 {
        self.confidence_factor
            * self.momentum_factor
            * self.hot_streak_factor
            * self.loss_streak_factor
            * self.drawdown_step_factor
            * self.drawdown_taper_factor
            * self.target_brake_factor
            * self.peak_distance_factor
            * self.recent_form_factor
            * self.leverage_factor
    }
}

/// Multi-factor position sizing:
/// `notional = clamp(capital * base * Π factors, min * capital, max * capital)`
pub struct PositionSizer {
    config: SizingConfig,
    /// Target used by paced sizing and the daily-target brake
    target: f64,
    max_daily_trades: u32,
}

impl PositionSizer {
    pub fn new(config: SizingConfig, target: f64, max_daily_trades: u32) -> Self {
        Self {
            config,
            target,
            max_daily_trades,
        }
    }

    pub fn config(&self) -> &SizingConfig {
        &self.config
    }

    /// Computes the notional for the next trade. Updates the hot-streak
    /// multiplier stored on `state`; nothing else is mutated.
    pub fn compute(&self, state: &mut RiskState, snapshot: &MetricsSnapshot) -> SizingBreakdown {
        let capital = state.capital();
        let cfg = &self.config;

        let base_fraction = self.base_fraction(state, snapshot);
        let confidence_factor = cfg.confidence.apply(snapshot.ai_confidence());
        let momentum_factor = cfg
            .momentum
            .map(|m| m.apply(snapshot.abs_momentum()))
            .unwrap_or(1.0);
        let hot_streak_factor = self.update_hot_streak(state);

        let loss_streak_factor = match cfg.loss_streak {
            Some(ls) if state.consecutive_losses() >= ls.threshold => {
                (1.0 - ls.step * state.consecutive_losses() as f64).max(ls.floor)
            }
            _ => 1.0,
        };

        let drawdown = state.drawdown();
        let drawdown_step_factor = match cfg.drawdown_step {
            Some(step) if drawdown > step.threshold => step.factor,
            _ => 1.0,
        };
        let drawdown_taper_factor = cfg
            .drawdown_taper
            .map(|taper| taper.apply(drawdown))
            .unwrap_or(1.0);

        let target_brake_factor = match &cfg.target_brake {
            Some(brake) => {
                let daily_return = state.daily_return();
                brake
                    .tiers
                    .iter()
                    .find(|(share, _)| daily_return >= self.target * share)
                    .map(|(_, factor)| *factor)
                    .unwrap_or(1.0)
            }
            None => 1.0,
        };

        let peak_distance_factor = cfg
            .peak_distance
            .map(|taper| taper.apply(state.peak_distance()))
            .unwrap_or(1.0);

        let recent_form_factor = match &cfg.recent_form {
            Some(form) if !state.trade_history().is_empty() => {
                let win_rate = state.win_rate(Some(form.window));
                form.tiers
                    .iter()
                    .find(|(min_rate, _)| win_rate >= *min_rate)
                    .map(|(_, factor)| *factor)
                    .unwrap_or(form.otherwise)
            }
            _ => 1.0,
        };

        let leverage_factor = match &cfg.leverage {
            Some(lev) => {
                let vol_leverage =
                    (1.0 + lev.volatility_slope * snapshot.volatility()).min(lev.volatility_cap);
                vol_leverage * lev.regime.factor(snapshot.regime())
            }
            None => 1.0,
        };

        let mut breakdown = SizingBreakdown {
            capital,
            base_fraction,
            confidence_factor,
            momentum_factor,
            hot_streak_factor,
            loss_streak_factor,
            drawdown_step_factor,
            drawdown_taper_factor,
            target_brake_factor,
            peak_distance_factor,
            recent_form_factor,
            leverage_factor,
            raw_notional: 0.0,
            min_notional: capital * cfg.min_fraction,
            max_notional: capital * cfg.max_fraction,
            notional: 0.0,
        };
        breakdown.raw_notional = capital * base_fraction * breakdown.combined_factor();
        breakdown.notional = breakdown
            .raw_notional
            .min(breakdown.max_notional)
            .max(breakdown.min_notional);

        debug!(
            "PositionSizer: base={:.4} factors={:.4} raw=${:.2} -> ${:.2} (bounds ${:.2}..${:.2})",
            base_fraction,
            breakdown.combined_factor(),
            breakdown.raw_notional,
            breakdown.notional,
            breakdown.min_notional,
            breakdown.max_notional
        );

        breakdown
    }

    /// Applies the post-loss hot-streak decay, if the profile has one
    pub fn settle_loss(&self, state: &mut RiskState) {
        if let Some(decay) = self.config.win_streak.and_then(|ws| ws.loss_decay) {
            let decayed = (state.hot_streak_multiplier() * decay).max(1.0);
            state.set_hot_streak_multiplier(decayed);
        }
    }

    fn base_fraction(&self, state: &RiskState, snapshot: &MetricsSnapshot) -> f64 {
        let base = match self.config.base {
            BaseSizing::Fixed { fraction } => fraction,
            BaseSizing::TargetPaced {
                max_fraction,
                after_target_fraction,
            } => {
                let remaining = (self.target - state.total_return()).max(0.0);
                if remaining > 0.0 {
                    let trades_left = self.max_daily_trades.saturating_sub(state.daily_trades()).max(1);
                    (remaining / trades_left as f64).min(max_fraction)
                } else {
                    after_target_fraction
                }
            }
        };

        match (&self.config.suggested_size, snapshot.suggested_position_size()) {
            (SuggestedSizePolicy::RaiseTo, Some(suggested)) => base.max(suggested),
            (SuggestedSizePolicy::CapAt { risk_cap }, Some(suggested)) => {
                base.min(suggested).min(*risk_cap)
            }
            _ => base,
        }
    }

    fn update_hot_streak(&self, state: &mut RiskState) -> f64 {
        let Some(ws) = self.config.win_streak else {
            return 1.0;
        };

        let wins = state.consecutive_wins();
        let multiplier = if wins >= ws.threshold {
            (1.0 + wins as f64 * ws.step).min(ws.cap)
        } else {
            match ws.decay {
                Some(decay) => (state.hot_streak_multiplier() * decay).max(1.0),
                None => 1.0,
            }
        };
        state.set_hot_streak_multiplier(multiplier);
        multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::MarketRegime;
    use crate::domain::risk::{SettledTrade, TradeKind};
    use chrono::{DateTime, Utc};

    fn settle(state: &mut RiskState, kind: TradeKind, amount: f64) {
        let trade = SettledTrade {
            kind,
            size: amount * 10.0,
            pct: 0.1,
            amount,
            success_probability: 0.5,
        };
        state.apply(&trade, 0.7, MarketRegime::Unknown, DateTime::<Utc>::UNIX_EPOCH);
    }

    fn aggressive() -> PositionSizer {
        PositionSizer::new(SizingConfig::aggressive(), 0.06, 15)
    }

    fn conservative() -> PositionSizer {
        PositionSizer::new(SizingConfig::conservative(), 0.01, 4)
    }

    fn flip() -> PositionSizer {
        PositionSizer::new(SizingConfig::flip(), 1.0, 15)
    }

    #[test]
    fn test_aggressive_loss_streak_factor() {
        let mut state = RiskState::new(10_000.0).unwrap();
        settle(&mut state, TradeKind::Loss, 10.0);
        settle(&mut state, TradeKind::Loss, 10.0);

        let breakdown = aggressive().compute(&mut state, &MetricsSnapshot::new());

        assert!((breakdown.loss_streak_factor - 0.70).abs() < 1e-12);
    }

    #[test]
    fn test_loss_streak_floor() {
        let mut state = RiskState::new(10_000.0).unwrap();
        for _ in 0..6 {
            settle(&mut state, TradeKind::Loss, 1.0);
        }

        let aggressive = aggressive().compute(&mut state, &MetricsSnapshot::new());
        let flip = flip().compute(&mut state, &MetricsSnapshot::new());

        assert_eq!(aggressive.loss_streak_factor, 0.3);
        assert_eq!(flip.loss_streak_factor, 0.5);
    }

    #[test]
    fn test_aggressive_factors_for_strong_snapshot() {
        let mut state = RiskState::new(10_000.0).unwrap();
        let snapshot = MetricsSnapshot::new()
            .with_ai_confidence(0.8)
            .with_momentum(-0.5)
            .with_volatility(0.1)
            .with_regime(MarketRegime::TrendingBull);

        let b = aggressive().compute(&mut state, &snapshot);

        assert_eq!(b.base_fraction, 0.15);
        assert!((b.confidence_factor - 1.18).abs() < 1e-12);
        assert!((b.momentum_factor - 1.0).abs() < 1e-12);
        assert!((b.leverage_factor - 1.2 * 1.3).abs() < 1e-12);
        // 1500 * 1.18 * 1.56 exceeds the 20% cap
        assert!((b.notional - 2_000.0).abs() < 1e-9);
        assert!(b.raw_notional > b.notional);
    }

    #[test]
    fn test_suggested_size_raise_to() {
        let mut state = RiskState::new(10_000.0).unwrap();
        let snapshot = MetricsSnapshot::new().with_suggested_position_size(0.18);

        let b = aggressive().compute(&mut state, &snapshot);
        assert_eq!(b.base_fraction, 0.18);

        let smaller = MetricsSnapshot::new().with_suggested_position_size(0.05);
        let b = aggressive().compute(&mut state, &smaller);
        assert_eq!(b.base_fraction, 0.15);
    }

    #[test]
    fn test_suggested_size_cap_at() {
        let mut state = RiskState::new(10_000.0).unwrap();

        let smaller = MetricsSnapshot::new().with_suggested_position_size(0.005);
        assert_eq!(conservative().compute(&mut state, &smaller).base_fraction, 0.005);

        let larger = MetricsSnapshot::new().with_suggested_position_size(0.05);
        assert_eq!(conservative().compute(&mut state, &larger).base_fraction, 0.01);
    }

    #[test]
    fn test_flip_ignores_suggested_size() {
        let mut state = RiskState::new(10_000.0).unwrap();
        let snapshot = MetricsSnapshot::new().with_suggested_position_size(0.3);

        let b = flip().compute(&mut state, &snapshot);

        // 100% remaining over 15 trades
        assert!((b.base_fraction - 1.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_flip_after_target_fraction() {
        let mut state = RiskState::new(1_000.0).unwrap();
        state.deposit(1_000.0).unwrap();

        let b = flip().compute(&mut state, &MetricsSnapshot::new());
        assert_eq!(b.base_fraction, 0.05);
    }

    #[test]
    fn test_hot_streak_builds_and_decays() {
        let sizer = aggressive();
        let mut state = RiskState::new(10_000.0).unwrap();
        for _ in 0..4 {
            settle(&mut state, TradeKind::Win, 1.0);
        }

        let b = sizer.compute(&mut state, &MetricsSnapshot::new());
        assert!((b.hot_streak_factor - 1.4).abs() < 1e-12);
        assert!((state.hot_streak_multiplier() - 1.4).abs() < 1e-12);

        settle(&mut state, TradeKind::Loss, 1.0);
        sizer.settle_loss(&mut state);
        assert!((state.hot_streak_multiplier() - 1.26).abs() < 1e-12);

        let b = sizer.compute(&mut state, &MetricsSnapshot::new());
        assert!((b.hot_streak_factor - 1.26 * 0.95).abs() < 1e-12);

        for _ in 0..20 {
            sizer.compute(&mut state, &MetricsSnapshot::new());
        }
        assert_eq!(state.hot_streak_multiplier(), 1.0);
    }

    #[test]
    fn test_flip_hot_streak_resets_without_decay() {
        let sizer = flip();
        let mut state = RiskState::new(10_000.0).unwrap();
        for _ in 0..7 {
            settle(&mut state, TradeKind::Win, 1.0);
        }
        assert_eq!(sizer.compute(&mut state, &MetricsSnapshot::new()).hot_streak_factor, 1.5);

        settle(&mut state, TradeKind::Loss, 1.0);
        assert_eq!(sizer.compute(&mut state, &MetricsSnapshot::new()).hot_streak_factor, 1.0);
    }

    #[test]
    fn test_conservative_drawdown_protection() {
        let mut state = RiskState::new(10_000.0).unwrap();
        settle(&mut state, TradeKind::Loss, 300.0);

        let b = conservative().compute(&mut state, &MetricsSnapshot::new());

        assert_eq!(b.drawdown_step_factor, 0.4);
        assert!((b.drawdown_taper_factor - 0.85).abs() < 1e-12);
        assert!((b.peak_distance_factor - 0.94).abs() < 1e-12);
        // Single loss in history
        assert_eq!(b.recent_form_factor, 0.9);
        assert_eq!(b.notional, 9_700.0 * 0.003);
    }

    #[test]
    fn test_conservative_daily_target_brake() {
        let mut state = RiskState::new(10_000.0).unwrap();
        settle(&mut state, TradeKind::Win, 70.0);

        let b = conservative().compute(&mut state, &MetricsSnapshot::new());
        assert_eq!(b.target_brake_factor, 0.7);
        assert_eq!(b.recent_form_factor, 1.1);

        settle(&mut state, TradeKind::Win, 20.0);
        let b = conservative().compute(&mut state, &MetricsSnapshot::new());
        assert_eq!(b.target_brake_factor, 0.5);
    }

    #[test]
    fn test_notional_always_within_bounds() {
        let mut state = RiskState::new(5_000.0).unwrap();
        let weak = MetricsSnapshot::new()
            .with_ai_confidence(0.0)
            .with_momentum(0.0);

        for sizer in [aggressive(), conservative(), flip()] {
            let b = sizer.compute(&mut state, &weak);
            assert!(b.notional >= b.min_notional - 1e-9);
            assert!(b.notional <= b.max_notional + 1e-9);
        }
    }
}
