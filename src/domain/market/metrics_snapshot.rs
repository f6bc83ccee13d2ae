//! External signal bundle consumed by every trade decision.
//!
//! Every field is optional. Accessors return a normalised value: missing or
//! non-finite inputs fall back to the documented default, out-of-range inputs
//! are clamped. This keeps signal gates total over all inputs.

use crate::domain::market::market_regime::MarketRegime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MOMENTUM: f64 = 0.5;
pub const DEFAULT_TREND_STRENGTH: f64 = 0.5;
pub const DEFAULT_BREAKOUT_SCORE: f64 = 0.5;
pub const DEFAULT_VOLATILITY: f64 = 0.1;
pub const DEFAULT_VOLUME_RATIO: f64 = 1.0;
pub const DEFAULT_AI_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_RSI: f64 = 50.0;
pub const DEFAULT_CONFLUENCE: f64 = 0.5;
pub const DEFAULT_SUPPORT_RESISTANCE: f64 = 0.5;
pub const DEFAULT_SPREAD: f64 = 0.001;
pub const DEFAULT_VOLUME: f64 = 1_000_000.0;
pub const DEFAULT_VOLUME_PROFILE: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSnapshot {
    pub momentum: Option<f64>,
    pub trend_strength: Option<f64>,
    pub breakout_score: Option<f64>,
    pub volatility: Option<f64>,
    pub volume_spike: Option<bool>,
    pub volume_ratio: Option<f64>,
    pub ai_confidence: Option<f64>,
    pub regime: Option<MarketRegime>,
    pub rsi: Option<f64>,
    pub confluence: Option<f64>,
    pub support_resistance: Option<f64>,
    pub spread: Option<f64>,
    pub volume: Option<f64>,
    pub volume_profile: Option<f64>,
    /// Caller-suggested position size as a fraction of capital
    #[serde(alias = "position_size")]
    pub suggested_position_size: Option<f64>,
}

fn normalized(value: Option<f64>, default: f64, min: f64, max: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(min, max),
        _ => default,
    }
}

impl MetricsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signed momentum in [-1, 1]
    pub fn momentum(&self) -> f64 {
        normalized(self.momentum, DEFAULT_MOMENTUM, -1.0, 1.0)
    }

    pub fn abs_momentum(&self) -> f64 {
        self.momentum().abs()
    }

    pub fn trend_strength(&self) -> f64 {
        normalized(self.trend_strength, DEFAULT_TREND_STRENGTH, 0.0, 1.0)
    }

    pub fn breakout_score(&self) -> f64 {
        normalized(self.breakout_score, DEFAULT_BREAKOUT_SCORE, 0.0, 1.0)
    }

    pub fn volatility(&self) -> f64 {
        normalized(self.volatility, DEFAULT_VOLATILITY, 0.0, f64::MAX)
    }

    pub fn volume_spike(&self) -> bool {
        self.volume_spike.unwrap_or(false)
    }

    pub fn volume_ratio(&self) -> f64 {
        normalized(self.volume_ratio, DEFAULT_VOLUME_RATIO, 0.0, f64::MAX)
    }

    pub fn ai_confidence(&self) -> f64 {
        normalized(self.ai_confidence, DEFAULT_AI_CONFIDENCE, 0.0, 1.0)
    }

    pub fn regime(&self) -> MarketRegime {
        self.regime.unwrap_or_default()
    }

    pub fn rsi(&self) -> f64 {
        normalized(self.rsi, DEFAULT_RSI, 0.0, 100.0)
    }

    pub fn confluence(&self) -> f64 {
        normalized(self.confluence, DEFAULT_CONFLUENCE, 0.0, 1.0)
    }

    pub fn support_resistance(&self) -> f64 {
        normalized(
            self.support_resistance,
            DEFAULT_SUPPORT_RESISTANCE,
            0.0,
            1.0,
        )
    }

    pub fn spread(&self) -> f64 {
        normalized(self.spread, DEFAULT_SPREAD, 0.0, f64::MAX)
    }

    pub fn volume(&self) -> f64 {
        normalized(self.volume, DEFAULT_VOLUME, 0.0, f64::MAX)
    }

    pub fn volume_profile(&self) -> f64 {
        normalized(self.volume_profile, DEFAULT_VOLUME_PROFILE, 0.0, f64::MAX)
    }

    /// Suggested size fraction, if the caller supplied a usable one
    pub fn suggested_position_size(&self) -> Option<f64> {
        self.suggested_position_size
            .filter(|v| v.is_finite())
            .map(|v| v.max(0.0))
    }

    pub fn with_momentum(mut self, value: f64) -> Self {
        self.momentum = Some(value);
        self
    }

    pub fn with_trend_strength(mut self, value: f64) -> Self {
        self.trend_strength = Some(value);
        self
    }

    pub fn with_breakout_score(mut self, value: f64) -> Self {
        self.breakout_score = Some(value);
        self
    }

    pub fn with_volatility(mut self, value: f64) -> Self {
        self.volatility = Some(value);
        self
    }

    pub fn with_volume_spike(mut self, value: bool) -> Self {
        self.volume_spike = Some(value);
        self
    }

    pub fn with_volume_ratio(mut self, value: f64) -> Self {
        self.volume_ratio = Some(value);
        self
    }

    pub fn with_ai_confidence(mut self, value: f64) -> Self {
        self.ai_confidence = Some(value);
        self
    }

    pub fn with_regime(mut self, value: MarketRegime) -> Self {
        self.regime = Some(value);
        self
    }

    pub fn with_rsi(mut self, value: f64) -> Self {
        self.rsi = Some(value);
        self
    }

    pub fn with_confluence(mut self, value: f64) -> Self {
        self.confluence = Some(value);
        self
    }

    pub fn with_support_resistance(mut self, value: f64) -> Self {
        self.support_resistance = Some(value);
        self
    }

    pub fn with_spread(mut self, value: f64) -> Self {
        self.spread = Some(value);
        self
    }

    pub fn with_volume(mut self, value: f64) -> Self {
        self.volume = Some(value);
        self
    }

    pub fn with_volume_profile(mut self, value: f64) -> Self {
        self.volume_profile = Some(value);
        self
    }

    pub fn with_suggested_position_size(mut self, value: f64) -> Self {
        self.suggested_position_size = Some(value);
        self
    }
}
