use crate::domain::market::{MarketRegime, MetricsSnapshot, RegimeTable};
use crate::domain::ports::RandomSource;
use crate::domain::risk::{RiskState, SettledTrade, TradeKind};

/// Raw success probability before the regime table and clamping
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuccessModel {
    /// `mean(confidence, |momentum|, trend, breakout) + min(streak_cap, streak_step * wins)`
    FactorAverage { streak_step: f64, streak_cap: f64 },
    /// `base + wc * confidence + wt * (trend - 0.5) + ws * (support_resistance - 0.5)`
    Baseline {
        base: f64,
        confidence_weight: f64,
        trend_weight: f64,
        support_weight: f64,
    },
    /// `intercept + slope * confidence`
    LinearConfidence { intercept: f64, slope: f64 },
}

impl SuccessModel {
    fn raw(&self, snapshot: &MetricsSnapshot, consecutive_wins: u32) -> f64 {
        let confidence = snapshot.ai_confidence();
        match *self {
            SuccessModel::FactorAverage {
                streak_step,
                streak_cap,
            } => {
                let mean = (confidence
                    + snapshot.abs_momentum()
                    + snapshot.trend_strength()
                    + snapshot.breakout_score())
                    / 4.0;
                mean + (streak_step * consecutive_wins as f64).min(streak_cap)
            }
            SuccessModel::Baseline {
                base,
                confidence_weight,
                trend_weight,
                support_weight,
            } => {
                base + confidence_weight * confidence
                    + trend_weight * (snapshot.trend_strength() - 0.5)
                    + support_weight * (snapshot.support_resistance() - 0.5)
            }
            SuccessModel::LinearConfidence { intercept, slope } => intercept + slope * confidence,
        }
    }
}

/// Profit percentage model for the WIN branch
#[derive(Debug, Clone, PartialEq)]
pub struct WinPayoff {
    pub min_pct: f64,
    pub max_pct: f64,
    pub confidence_pivot: f64,
    pub confidence_weight: f64,
    pub momentum_weight: f64,
    pub streak_weight: f64,
    pub regime: Option<RegimeTable>,
    pub cap: f64,
}

/// Loss percentage model for the LOSS branch
#[derive(Debug, Clone, PartialEq)]
pub struct LossPayoff {
    pub stop_loss: f64,
    /// Uniform jitter range applied to the stop loss
    pub jitter: Option<(f64, f64)>,
    pub regime: Option<RegimeTable>,
    pub cap: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeConfig {
    pub success: SuccessModel,
    pub success_regime: Option<RegimeTable>,
    pub min_success: f64,
    pub max_success: f64,
    pub win: WinPayoff,
    pub loss: LossPayoff,
}

fn regime_factor(table: &Option<RegimeTable>, regime: MarketRegime) -> f64 {
    table.as_ref().map(|t| t.factor(regime)).unwrap_or(1.0)
}

impl OutcomeConfig {
    pub fn aggressive() -> Self {
        Self {
            success: SuccessModel::FactorAverage {
                streak_step: 0.03,
                streak_cap: 0.15,
            },
            success_regime: Some(
                RegimeTable::neutral()
                    .with(MarketRegime::TrendingBull, 1.2)
                    .with(MarketRegime::TrendingBear, 1.15)
                    .with(MarketRegime::HighVolatility, 1.1)
                    .with(MarketRegime::Sideways, 0.9)
                    .with(MarketRegime::LowVolatility, 0.85),
            ),
            min_success: 0.25,
            max_success: 0.80,
            win: WinPayoff {
                min_pct: 0.05,
                max_pct: 0.15,
                confidence_pivot: 0.5,
                confidence_weight: 0.6,
                momentum_weight: 0.4,
                streak_weight: 0.05,
                regime: Some(
                    RegimeTable::neutral()
                        .with(MarketRegime::TrendingBull, 1.5)
                        .with(MarketRegime::TrendingBear, 1.3)
                        .with(MarketRegime::HighVolatility, 1.6)
                        .with(MarketRegime::Sideways, 1.0)
                        .with(MarketRegime::LowVolatility, 0.9),
                ),
                cap: 0.18,
            },
            loss: LossPayoff {
                stop_loss: 0.02,
                jitter: None,
                regime: Some(
                    RegimeTable::neutral()
                        .with(MarketRegime::TrendingBull, 0.8)
                        .with(MarketRegime::TrendingBear, 0.9)
                        .with(MarketRegime::HighVolatility, 1.4)
                        .with(MarketRegime::Sideways, 1.2)
                        .with(MarketRegime::LowVolatility, 0.7),
                ),
                cap: 0.06,
            },
        }
    }

    pub fn conservative() -> Self {
        Self {
            success: SuccessModel::Baseline {
                base: 0.65,
                confidence_weight: 0.2,
                trend_weight: 0.1,
                support_weight: 0.1,
            },
            success_regime: Some(
                RegimeTable::new(0.9)
                    .with(MarketRegime::TrendingBull, 1.1)
                    .with(MarketRegime::LowVolatility, 1.15)
                    .with(MarketRegime::Sideways, 1.0)
                    .with(MarketRegime::TrendingBear, 0.95)
                    .with(MarketRegime::HighVolatility, 0.0),
            ),
            min_success: 0.60,
            max_success: 0.88,
            win: WinPayoff {
                min_pct: 0.008,
                max_pct: 0.020,
                confidence_pivot: 0.75,
                confidence_weight: 0.2,
                momentum_weight: 0.0,
                streak_weight: 0.0,
                regime: Some(
                    RegimeTable::neutral()
                        .with(MarketRegime::TrendingBull, 1.15)
                        .with(MarketRegime::LowVolatility, 1.1)
                        .with(MarketRegime::Sideways, 1.0)
                        .with(MarketRegime::TrendingBear, 1.05),
                ),
                cap: 0.02,
            },
            loss: LossPayoff {
                stop_loss: 0.005,
                jitter: None,
                regime: Some(
                    RegimeTable::neutral()
                        .with(MarketRegime::TrendingBull, 0.8)
                        .with(MarketRegime::LowVolatility, 0.7)
                        .with(MarketRegime::Sideways, 1.0)
                        .with(MarketRegime::TrendingBear, 0.9),
                ),
                cap: 0.008,
            },
        }
    }

    pub fn flip() -> Self {
        Self {
            success: SuccessModel::LinearConfidence {
                intercept: 0.55,
                slope: 0.25,
            },
            success_regime: None,
            min_success: 0.55,
            max_success: 0.80,
            win: WinPayoff {
                min_pct: 0.08,
                max_pct: 0.25,
                confidence_pivot: 0.0,
                confidence_weight: 0.5,
                momentum_weight: 0.0,
                streak_weight: 0.0,
                regime: None,
                cap: 0.35,
            },
            loss: LossPayoff {
                stop_loss: 0.02,
                jitter: Some((0.8, 1.2)),
                regime: None,
                cap: 0.04,
            },
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.min_success) || !in_unit(self.max_success) {
            return Err(format!(
                "Success bounds must lie in [0, 1]: {} / {}",
                self.min_success, self.max_success
            ));
        }
        if self.min_success > self.max_success {
            return Err(format!(
                "min_success {} exceeds max_success {}",
                self.min_success, self.max_success
            ));
        }
        if self.win.min_pct < 0.0 || self.win.min_pct > self.win.max_pct {
            return Err(format!(
                "Invalid win range: {} - {}",
                self.win.min_pct, self.win.max_pct
            ));
        }
        if !(self.loss.stop_loss > 0.0 && self.loss.stop_loss < 1.0) {
            return Err(format!("Invalid stop_loss: {}", self.loss.stop_loss));
        }
        Ok(())
    }
}

/// Stochastic win/loss resolution and payoff magnitude.
///
/// Consumes one draw for the branch and at most one more for the payoff.
pub struct OutcomeSimulator {
    config: OutcomeConfig,
}

impl OutcomeSimulator {
    pub fn new(config: OutcomeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutcomeConfig {
        &self.config
    }

    /// Success probability for the next trade, clamped to the profile bounds
    pub fn success_probability(&self, state: &RiskState, snapshot: &MetricsSnapshot) -> f64 {
        let cfg = &self.config;
        let raw = cfg.success.raw(snapshot, state.consecutive_wins())
            * regime_factor(&cfg.success_regime, snapshot.regime());
        raw.clamp(cfg.min_success, cfg.max_success)
    }

    pub fn resolve(
        &self,
        state: &RiskState,
        snapshot: &MetricsSnapshot,
        notional: f64,
        random: &mut dyn RandomSource,
    ) -> SettledTrade {
        let success_probability = self.success_probability(state, snapshot);

        if random.next_unit() < success_probability {
            let pct = self.win_pct(state, snapshot, random);
            SettledTrade {
                kind: TradeKind::Win,
                size: notional,
                pct,
                amount: notional * pct,
                success_probability,
            }
        } else {
            let pct = self.loss_pct(snapshot, random);
            SettledTrade {
                kind: TradeKind::Loss,
                size: notional,
                pct,
                amount: notional * pct,
                success_probability,
            }
        }
    }

    fn win_pct(
        &self,
        state: &RiskState,
        snapshot: &MetricsSnapshot,
        random: &mut dyn RandomSource,
    ) -> f64 {
        let win = &self.config.win;
        let base = random.uniform(win.min_pct, win.max_pct);

        let confidence_bonus =
            1.0 + (snapshot.ai_confidence() - win.confidence_pivot) * win.confidence_weight;
        let momentum_bonus = 1.0 + win.momentum_weight * snapshot.abs_momentum();
        let streak_bonus = 1.0 + win.streak_weight * state.consecutive_wins() as f64;
        let regime = regime_factor(&win.regime, snapshot.regime());

        (base * confidence_bonus * momentum_bonus * streak_bonus * regime).min(win.cap)
    }

    fn loss_pct(&self, snapshot: &MetricsSnapshot, random: &mut dyn RandomSource) -> f64 {
        let loss = &self.config.loss;
        let jitter = match loss.jitter {
            Some((low, high)) => random.uniform(low, high),
            None => 1.0,
        };
        let regime = regime_factor(&loss.regime, snapshot.regime());

        (loss.stop_loss * jitter * regime).min(loss.cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::random::ScriptedRandom;

    fn state() -> RiskState {
        RiskState::new(10_000.0).unwrap()
    }

    #[test]
    fn test_aggressive_success_probability() {
        let sim = OutcomeSimulator::new(OutcomeConfig::aggressive());
        let snapshot = MetricsSnapshot::new()
            .with_ai_confidence(0.8)
            .with_momentum(0.6)
            .with_trend_strength(0.6)
            .with_breakout_score(0.6)
            .with_regime(MarketRegime::Sideways);

        // mean 0.65, no streak, sideways 0.9
        let p = sim.success_probability(&state(), &snapshot);
        assert!((p - 0.585).abs() < 1e-12);

        let bull = snapshot.with_regime(MarketRegime::TrendingBull);
        assert!((sim.success_probability(&state(), &bull) - 0.78).abs() < 1e-12);

        let euphoric = bull.with_ai_confidence(1.0).with_breakout_score(1.0);
        assert_eq!(sim.success_probability(&state(), &euphoric), 0.80);
    }

    #[test]
    fn test_conservative_success_probability_bounds() {
        let sim = OutcomeSimulator::new(OutcomeConfig::conservative());

        let strong = MetricsSnapshot::new()
            .with_ai_confidence(1.0)
            .with_regime(MarketRegime::LowVolatility);
        assert_eq!(sim.success_probability(&state(), &strong), 0.88);

        let hostile = MetricsSnapshot::new().with_regime(MarketRegime::HighVolatility);
        assert_eq!(sim.success_probability(&state(), &hostile), 0.60);
    }

    #[test]
    fn test_flip_success_probability_ignores_regime() {
        let sim = OutcomeSimulator::new(OutcomeConfig::flip());
        let snapshot = MetricsSnapshot::new()
            .with_ai_confidence(0.8)
            .with_regime(MarketRegime::HighVolatility);

        assert!((sim.success_probability(&state(), &snapshot) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_win_branch_consumes_two_draws() {
        let sim = OutcomeSimulator::new(OutcomeConfig::conservative());
        let snapshot = MetricsSnapshot::new()
            .with_ai_confidence(0.9)
            .with_regime(MarketRegime::TrendingBull);
        let mut random = ScriptedRandom::new(vec![0.0, 1.0 / 6.0]);

        let trade = sim.resolve(&state(), &snapshot, 100.0, &mut random);

        assert_eq!(trade.kind, TradeKind::Win);
        assert!((trade.pct - 0.01 * 1.03 * 1.15).abs() < 1e-12);
        assert!((trade.amount - 100.0 * trade.pct).abs() < 1e-12);
        assert_eq!(random.draws(), 2);
    }

    #[test]
    fn test_deterministic_loss_consumes_one_draw() {
        let sim = OutcomeSimulator::new(OutcomeConfig::aggressive());
        let snapshot = MetricsSnapshot::new().with_regime(MarketRegime::HighVolatility);
        let mut random = ScriptedRandom::new(vec![0.99]);

        let trade = sim.resolve(&state(), &snapshot, 1_000.0, &mut random);

        assert_eq!(trade.kind, TradeKind::Loss);
        assert!((trade.pct - 0.028).abs() < 1e-12);
        assert!((trade.amount - 28.0).abs() < 1e-9);
        assert_eq!(random.draws(), 1);
    }

    #[test]
    fn test_flip_loss_jitter_and_cap() {
        let sim = OutcomeSimulator::new(OutcomeConfig::flip());
        let mut random = ScriptedRandom::new(vec![0.99, 0.5]);

        let trade = sim.resolve(&state(), &MetricsSnapshot::new(), 1_000.0, &mut random);

        assert_eq!(trade.kind, TradeKind::Loss);
        assert!((trade.pct - 0.02).abs() < 1e-12);
        assert_eq!(random.draws(), 2);
    }

    #[test]
    fn test_win_pct_capped() {
        let sim = OutcomeSimulator::new(OutcomeConfig::aggressive());
        let snapshot = MetricsSnapshot::new()
            .with_ai_confidence(1.0)
            .with_momentum(1.0)
            .with_regime(MarketRegime::HighVolatility);
        let mut random = ScriptedRandom::new(vec![0.0, 0.99]);

        let trade = sim.resolve(&state(), &snapshot, 1_000.0, &mut random);

        assert_eq!(trade.kind, TradeKind::Win);
        assert_eq!(trade.pct, 0.18);
    }

    #[test]
    fn test_preset_configs_validate() {
        assert!(OutcomeConfig::aggressive().validate().is_ok());
        assert!(OutcomeConfig::conservative().validate().is_ok());
        assert!(OutcomeConfig::flip().validate().is_ok());

        let mut broken = OutcomeConfig::flip();
        broken.min_success = 0.9;
        assert!(broken.validate().is_err());
    }
}
