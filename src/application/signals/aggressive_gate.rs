use crate::application::signals::gate_trait::SignalGate;
use crate::domain::market::{MarketRegime, MetricsSnapshot};

/// Thresholds for the high-conviction momentum gate
#[derive(Debug, Clone, PartialEq)]
pub struct AggressiveGateConfig {
    pub min_abs_momentum: f64,
    pub min_trend_strength: f64,
    pub min_breakout_score: f64,
    pub min_volatility: f64,
    pub min_ai_confidence: f64,
    /// Volume ratio accepted in place of a volume spike
    pub min_volume_ratio: f64,
    /// RSI must be below the lower or above the upper bound
    pub rsi_lower: f64,
    pub rsi_upper: f64,
    pub min_confluence: f64,
    /// Tightened thresholds in a sideways market
    pub sideways_min_abs_momentum: f64,
    pub sideways_min_breakout_score: f64,
    /// Below this volatility a low-volatility regime is rejected outright
    pub low_volatility_floor: f64,
}

impl Default for AggressiveGateConfig {
    fn default() -> Self {
        Self {
            min_abs_momentum: 0.6,
            min_trend_strength: 0.55,
            min_breakout_score: 0.7,
            min_volatility: 0.04,
            min_ai_confidence: 0.6,
            min_volume_ratio: 1.3,
            rsi_lower: 25.0,
            rsi_upper: 75.0,
            min_confluence: 0.65,
            sideways_min_abs_momentum: 0.75,
            sideways_min_breakout_score: 0.8,
            low_volatility_floor: 0.03,
        }
    }
}

/// Requires strong momentum, breakout and volume evidence plus an extreme RSI
pub struct AggressiveGate {
    config: AggressiveGateConfig,
}

impl AggressiveGate {
    pub fn new(config: AggressiveGateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggressiveGateConfig {
        &self.config
    }
}

impl SignalGate for AggressiveGate {
    fn name(&self) -> &str {
        "AggressiveGate"
    }

    fn failed_checks(&self, snapshot: &MetricsSnapshot) -> Vec<&'static str> {
        let cfg = &self.config;
        let regime = snapshot.regime();

        if regime == MarketRegime::LowVolatility && snapshot.volatility() < cfg.low_volatility_floor
        {
            return vec!["low_volatility_regime"];
        }

        let (momentum_threshold, breakout_threshold) = if regime == MarketRegime::Sideways {
            (cfg.sideways_min_abs_momentum, cfg.sideways_min_breakout_score)
        } else {
            (cfg.min_abs_momentum, cfg.min_breakout_score)
        };

        let rsi = snapshot.rsi();
        let checks = [
            (snapshot.abs_momentum() > momentum_threshold, "momentum"),
            (
                snapshot.trend_strength() > cfg.min_trend_strength,
                "trend_strength",
            ),
            (snapshot.breakout_score() > breakout_threshold, "breakout_score"),
            (snapshot.volatility() > cfg.min_volatility, "volatility"),
            (
                snapshot.ai_confidence() > cfg.min_ai_confidence,
                "ai_confidence",
            ),
            (
                snapshot.volume_spike() || snapshot.volume_ratio() > cfg.min_volume_ratio,
                "volume",
            ),
            (rsi < cfg.rsi_lower || rsi > cfg.rsi_upper, "rsi"),
            (snapshot.confluence() > cfg.min_confluence, "confluence"),
        ];

        checks
            .into_iter()
            .filter(|(passed, _)| !passed)
            .map(|(_, name)| name)
            .collect()
    }
}
