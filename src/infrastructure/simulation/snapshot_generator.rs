use crate::domain::market::{MarketRegime, MetricsSnapshot};
use crate::domain::ports::RandomSource;
use crate::infrastructure::random::StdRandom;

/// Produces synthetic metric snapshots for sessions and benchmarks.
///
/// `signal_quality` in `[0, 1]` skews score-like fields toward 1.0: at 0 they
/// are uniform, at 1 most draws land near the top of the range.
pub struct SnapshotGenerator {
    random: Box<dyn RandomSource>,
    signal_quality: f64,
}

impl SnapshotGenerator {
    pub fn new(random: Box<dyn RandomSource>, signal_quality: f64) -> Self {
        let signal_quality = if signal_quality.is_finite() {
            signal_quality.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            random,
            signal_quality,
        }
    }

    pub fn seeded(seed: u64, signal_quality: f64) -> Self {
        Self::new(Box::new(StdRandom::seeded(seed)), signal_quality)
    }

    pub fn signal_quality(&self) -> f64 {
        self.signal_quality
    }

    fn uniform(&mut self) -> f64 {
        self.random.next_unit()
    }

    fn biased(&mut self) -> f64 {
        let exponent = 1.0 - 0.8 * self.signal_quality;
        self.uniform().powf(exponent)
    }

    pub fn next_snapshot(&mut self) -> MetricsSnapshot {
        let sign = if self.uniform() < 0.5 { -1.0 } else { 1.0 };
        let momentum = sign * self.biased();
        let trend_strength = self.biased();
        let breakout_score = self.biased();
        let volatility = 0.01 + 0.2 * self.uniform();
        let volume_spike = self.uniform() < 0.2 + 0.3 * self.signal_quality;
        let volume_ratio = 0.5 + 1.5 * self.biased();
        let ai_confidence = self.biased();

        let index = (self.uniform() * MarketRegime::ALL.len() as f64) as usize;
        let regime = MarketRegime::ALL[index.min(MarketRegime::ALL.len() - 1)];

        let rsi = 100.0 * self.uniform();
        let confluence = self.biased();
        let support_resistance = self.biased();
        let spread = 0.0005 + 0.003 * self.uniform();
        let volume = 200_000.0 + 3_000_000.0 * self.uniform();
        let volume_profile = 0.5 + 0.8 * self.biased();

        MetricsSnapshot::new()
            .with_momentum(momentum)
            .with_trend_strength(trend_strength)
            .with_breakout_score(breakout_score)
            .with_volatility(volatility)
            .with_volume_spike(volume_spike)
            .with_volume_ratio(volume_ratio)
            .with_ai_confidence(ai_confidence)
            .with_regime(regime)
            .with_rsi(rsi)
            .with_confluence(confluence)
            .with_support_resistance(support_resistance)
            .with_spread(spread)
            .with_volume(volume)
            .with_volume_profile(volume_profile)
    }
}

impl Iterator for SnapshotGenerator {
    type Item = MetricsSnapshot;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_snapshot())
    }
}
