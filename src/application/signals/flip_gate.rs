use crate::application::signals::gate_trait::SignalGate;
use crate::domain::market::MetricsSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub struct FlipGateConfig {
    pub min_volatility: f64,
    pub max_volatility: f64,
    pub min_breakout_score: f64,
    pub min_ai_confidence: f64,
    pub min_abs_momentum: f64,
}

impl Default for FlipGateConfig {
    fn default() -> Self {
        Self {
            min_volatility: 0.03,
            max_volatility: 0.25,
            min_breakout_score: 0.75,
            min_ai_confidence: 0.6,
            min_abs_momentum: 0.4,
        }
    }
}

/// Breakout gate for the account-doubling mode
pub struct FlipGate {
    config: FlipGateConfig,
}

impl FlipGate {
    pub fn new(config: FlipGateConfig) -> Self {
        Self { config }
    }
}

impl SignalGate for FlipGate {
    fn name(&self) -> &str {
        "FlipGate"
    }

    fn failed_checks(&self, snapshot: &MetricsSnapshot) -> Vec<&'static str> {
        let cfg = &self.config;
        let volatility = snapshot.volatility();
        let checks = [
            (
                volatility > cfg.min_volatility && volatility < cfg.max_volatility,
                "volatility",
            ),
            (
                snapshot.breakout_score() > cfg.min_breakout_score,
                "breakout_score",
            ),
            (
                snapshot.ai_confidence() > cfg.min_ai_confidence,
                "ai_confidence",
            ),
            (snapshot.abs_momentum() > cfg.min_abs_momentum, "momentum"),
        ];

        checks
            .into_iter()
            .filter(|(passed, _)| !passed)
            .map(|(_, name)| name)
            .collect()
    }
}
