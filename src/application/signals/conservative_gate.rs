use crate::application::signals::gate_trait::SignalGate;
use crate::domain::market::{MarketRegime, MetricsSnapshot};

/// Thresholds for the capital-preservation gate. Every check is required.
#[derive(Debug, Clone, PartialEq)]
pub struct ConservativeGateConfig {
    pub max_spread: f64,
    pub min_volume: f64,
    pub min_volatility: f64,
    pub max_volatility: f64,
    pub min_confidence: f64,
    pub allowed_regimes: Vec<MarketRegime>,
    pub min_support_resistance: f64,
    pub min_trend_strength: f64,
    pub min_confluence: f64,
    pub rsi_lower: f64,
    pub rsi_upper: f64,
    pub min_volume_profile: f64,
}

impl Default for ConservativeGateConfig {
    fn default() -> Self {
        Self {
            max_spread: 0.002,
            min_volume: 1_000_000.0,
            min_volatility: 0.01,
            max_volatility: 0.08,
            min_confidence: 0.8,
            allowed_regimes: vec![
                MarketRegime::TrendingBull,
                MarketRegime::LowVolatility,
                MarketRegime::Sideways,
            ],
            min_support_resistance: 0.7,
            min_trend_strength: 0.6,
            min_confluence: 0.75,
            rsi_lower: 35.0,
            rsi_upper: 65.0,
            min_volume_profile: 0.8,
        }
    }
}

pub struct ConservativeGate {
    config: ConservativeGateConfig,
}

impl ConservativeGate {
    pub fn new(config: ConservativeGateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConservativeGateConfig {
        &self.config
    }
}

impl SignalGate for ConservativeGate {
    fn name(&self) -> &str {
        "ConservativeGate"
    }

    fn failed_checks(&self, snapshot: &MetricsSnapshot) -> Vec<&'static str> {
        let cfg = &self.config;
        let regime = snapshot.regime();

        if regime == MarketRegime::HighVolatility {
            return vec!["high_volatility_regime"];
        }

        let volatility = snapshot.volatility();
        let rsi = snapshot.rsi();
        let checks = [
            (snapshot.spread() < cfg.max_spread, "spread"),
            (snapshot.volume() > cfg.min_volume, "volume"),
            (
                volatility > cfg.min_volatility && volatility < cfg.max_volatility,
                "volatility",
            ),
            (
                snapshot.ai_confidence() >= cfg.min_confidence,
                "ai_confidence",
            ),
            (cfg.allowed_regimes.contains(&regime), "regime"),
            (
                snapshot.support_resistance() > cfg.min_support_resistance,
                "support_resistance",
            ),
            (
                snapshot.trend_strength() > cfg.min_trend_strength,
                "trend_strength",
            ),
            (snapshot.confluence() > cfg.min_confluence, "confluence"),
            (rsi > cfg.rsi_lower && rsi < cfg.rsi_upper, "rsi"),
            (
                snapshot.volume_profile() > cfg.min_volume_profile,
                "volume_profile",
            ),
        ];

        checks
            .into_iter()
            .filter(|(passed, _)| !passed)
            .map(|(_, name)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn safe_snapshot() -> MetricsSnapshot {
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

    fn gate() -> ConservativeGate {
        ConservativeGate::new(ConservativeGateConfig::default())
    }

    #[test]
    fn test_safe_snapshot_passes() {
        assert!(gate().evaluate(&safe_snapshot()));
    }

    #[test]
    fn test_confidence_threshold_is_inclusive() {
        assert!(gate().evaluate(&safe_snapshot().with_ai_confidence(0.8)));
        assert_eq!(
            gate().failed_checks(&safe_snapshot().with_ai_confidence(0.79)),
            vec!["ai_confidence"]
        );
    }

    #[test]
    fn test_high_volatility_regime_rejected_immediately() {
        let snapshot = safe_snapshot().with_regime(MarketRegime::HighVolatility);
        assert_eq!(gate().failed_checks(&snapshot), vec!["high_volatility_regime"]);
    }

    #[test]
    fn test_bear_regime_not_allowed() {
        let snapshot = safe_snapshot().with_regime(MarketRegime::TrendingBear);
        assert_eq!(gate().failed_checks(&snapshot), vec!["regime"]);
    }

    #[test]
    fn test_volatility_band_is_exclusive() {
        assert!(!gate().evaluate(&safe_snapshot().with_volatility(0.01)));
        assert!(!gate().evaluate(&safe_snapshot().with_volatility(0.08)));
        assert!(gate().evaluate(&safe_snapshot().with_volatility(0.079)));
    }

    #[test]
    fn test_reports_every_failed_check() {
        let snapshot = safe_snapshot().with_spread(0.01).with_rsi(70.0);
        assert_eq!(gate().failed_checks(&snapshot), vec!["spread", "rsi"]);
    }

    #[test]
    fn test_custom_min_confidence() {
        let gate = ConservativeGate::new(ConservativeGateConfig {
            min_confidence: 0.95,
            ..Default::default()
        });
        assert!(!gate.evaluate(&safe_snapshot()));
    }
}
