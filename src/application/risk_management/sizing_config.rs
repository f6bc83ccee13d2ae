use crate::domain::market::{MarketRegime, RegimeTable};

/// Starting fraction of capital before any adjustment
#[derive(Debug, Clone, PartialEq)]
pub enum BaseSizing {
    /// Constant fraction of current capital
    Fixed { fraction: f64 },
    /// Spread the remaining target return over the trades left today,
    /// capped at `max_fraction`. Once the target is met, `after_target_fraction`.
    TargetPaced {
        max_fraction: f64,
        after_target_fraction: f64,
    },
}

/// How a caller-suggested size interacts with the base fraction
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestedSizePolicy {
    /// Take the larger of base and suggestion
    RaiseTo,
    /// Take the smallest of base, suggestion and `risk_cap`
    CapAt { risk_cap: f64 },
    Ignore,
}

/// `intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScaling {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearScaling {
    pub fn apply(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfidenceScaling {
    Linear(LinearScaling),
    /// Above `pivot`: `1 + slope * (c - pivot)`. At or below: `below`.
    Threshold { pivot: f64, slope: f64, below: f64 },
}

impl ConfidenceScaling {
    pub fn apply(&self, confidence: f64) -> f64 {
        match self {
            ConfidenceScaling::Linear(linear) => linear.apply(confidence),
            ConfidenceScaling::Threshold { pivot, slope, below } => {
                if confidence > *pivot {
                    1.0 + slope * (confidence - pivot)
                } else {
                    *below
                }
            }
        }
    }
}

/// Stateful hot-streak multiplier parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WinStreakScaling {
    pub threshold: u32,
    pub step: f64,
    pub cap: f64,
    /// Decay applied per sizing call while below the threshold. `None` resets to 1.0.
    pub decay: Option<f64>,
    /// Extra decay applied when a trade loses
    pub loss_decay: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossStreakScaling {
    pub threshold: u32,
    pub step: f64,
    pub floor: f64,
}

/// Flat reduction once drawdown exceeds `threshold`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawdownStep {
    pub threshold: f64,
    pub factor: f64,
}

/// `max(floor, 1 - slope * x)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorTaper {
    pub slope: f64,
    pub floor: f64,
}

impl FloorTaper {
    pub fn apply(&self, x: f64) -> f64 {
        (1.0 - self.slope * x).max(self.floor)
    }
}

/// Size brake as the daily return approaches the daily target.
/// Tiers are `(share_of_target, factor)`, checked in order.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetBrake {
    pub tiers: Vec<(f64, f64)>,
}

/// Scaling by win rate over the last `window` trades.
/// Tiers are `(min_win_rate, factor)`, checked in order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentForm {
    pub window: usize,
    pub tiers: Vec<(f64, f64)>,
    pub otherwise: f64,
}

/// `min(volatility_cap, 1 + volatility_slope * volatility) * regime`
#[derive(Debug, Clone, PartialEq)]
pub struct LeverageScaling {
    pub volatility_slope: f64,
    pub volatility_cap: f64,
    pub regime: RegimeTable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizingConfig {
    pub base: BaseSizing,
    pub suggested_size: SuggestedSizePolicy,
    pub confidence: ConfidenceScaling,
    pub momentum: Option<LinearScaling>,
    pub win_streak: Option<WinStreakScaling>,
    pub loss_streak: Option<LossStreakScaling>,
    pub drawdown_step: Option<DrawdownStep>,
    pub drawdown_taper: Option<FloorTaper>,
    pub target_brake: Option<TargetBrake>,
    pub peak_distance: Option<FloorTaper>,
    pub recent_form: Option<RecentForm>,
    pub leverage: Option<LeverageScaling>,
    /// Final notional bounds as fractions of current capital
    pub min_fraction: f64,
    pub max_fraction: f64,
}

impl SizingConfig {
    pub fn aggressive() -> Self {
        Self {
            base: BaseSizing::Fixed { fraction: 0.15 },
            suggested_size: SuggestedSizePolicy::RaiseTo,
            confidence: ConfidenceScaling::Linear(LinearScaling {
                intercept: 0.7,
                slope: 0.6,
            }),
            momentum: Some(LinearScaling {
                intercept: 0.8,
                slope: 0.4,
            }),
            win_streak: Some(WinStreakScaling {
                threshold: 3,
                step: 0.1,
                cap: 2.0,
                decay: Some(0.95),
                loss_decay: Some(0.9),
            }),
            loss_streak: Some(LossStreakScaling {
                threshold: 2,
                step: 0.15,
                floor: 0.3,
            }),
            drawdown_step: Some(DrawdownStep {
                threshold: 0.12,
                factor: 0.5,
            }),
            drawdown_taper: None,
            target_brake: None,
            peak_distance: None,
            recent_form: None,
            leverage: Some(LeverageScaling {
                volatility_slope: 2.0,
                volatility_cap: 1.5,
                regime: RegimeTable::neutral()
                    .with(MarketRegime::TrendingBull, 1.3)
                    .with(MarketRegime::TrendingBear, 1.2)
                    .with(MarketRegime::HighVolatility, 1.4)
                    .with(MarketRegime::Sideways, 0.8)
                    .with(MarketRegime::LowVolatility, 0.9),
            }),
            min_fraction: 0.02,
            max_fraction: 0.20,
        }
    }

    pub fn conservative() -> Self {
        Self {
            base: BaseSizing::Fixed { fraction: 0.01 },
            suggested_size: SuggestedSizePolicy::CapAt { risk_cap: 0.015 },
            confidence: ConfidenceScaling::Threshold {
                pivot: 0.8,
                slope: 0.5,
                below: 0.8,
            },
            momentum: None,
            win_streak: None,
            loss_streak: None,
            drawdown_step: Some(DrawdownStep {
                threshold: 0.02,
                factor: 0.4,
            }),
            drawdown_taper: Some(FloorTaper {
                slope: 5.0,
                floor: 0.3,
            }),
            target_brake: Some(TargetBrake {
                tiers: vec![(0.8, 0.5), (0.6, 0.7)],
            }),
            peak_distance: Some(FloorTaper {
                slope: 2.0,
                floor: 0.4,
            }),
            recent_form: Some(RecentForm {
                window: 10,
                tiers: vec![(0.8, 1.1), (0.7, 1.05)],
                otherwise: 0.9,
            }),
            leverage: None,
            min_fraction: 0.003,
            max_fraction: 0.02,
        }
    }

    pub fn flip() -> Self {
        Self {
            base: BaseSizing::TargetPaced {
                max_fraction: 0.35,
                after_target_fraction: 0.05,
            },
            suggested_size: SuggestedSizePolicy::Ignore,
            confidence: ConfidenceScaling::Linear(LinearScaling {
                intercept: 0.7,
                slope: 0.6,
            }),
            momentum: Some(LinearScaling {
                intercept: 0.8,
                slope: 0.4,
            }),
            win_streak: Some(WinStreakScaling {
                threshold: 1,
                step: 0.1,
                cap: 1.5,
                decay: None,
                loss_decay: None,
            }),
            loss_streak: Some(LossStreakScaling {
                threshold: 2,
                step: 0.15,
                floor: 0.5,
            }),
            drawdown_step: Some(DrawdownStep {
                threshold: 0.15,
                factor: 0.5,
            }),
            drawdown_taper: None,
            target_brake: None,
            peak_distance: None,
            recent_form: None,
            leverage: None,
            min_fraction: 0.02,
            max_fraction: 0.35,
        }
    }

    /// Overrides the maximum position fraction. A fixed base takes the new
    /// fraction and leaves the notional bounds alone; a target-paced base
    /// moves both its cap and the upper notional bound.
    pub fn set_max_position(&mut self, fraction: f64) {
        match &mut self.base {
            BaseSizing::Fixed { fraction: base } => *base = fraction,
            BaseSizing::TargetPaced { max_fraction, .. } => {
                *max_fraction = fraction;
                self.max_fraction = fraction;
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_fraction > 0.0 && self.min_fraction <= 1.0) {
            return Err(format!("Invalid min_fraction: {}", self.min_fraction));
        }
        if !(self.max_fraction > 0.0 && self.max_fraction <= 1.0) {
            return Err(format!("Invalid max_fraction: {}", self.max_fraction));
        }
        if self.min_fraction > self.max_fraction {
            return Err(format!(
                "min_fraction {} exceeds max_fraction {}",
                self.min_fraction, self.max_fraction
            ));
        }
        match self.base {
            BaseSizing::Fixed { fraction } if !(fraction > 0.0 && fraction <= 1.0) => {
                return Err(format!("Invalid base fraction: {}", fraction));
            }
            BaseSizing::TargetPaced {
                max_fraction,
                after_target_fraction,
            } if !(max_fraction > 0.0 && max_fraction <= 1.0)
                || !(after_target_fraction > 0.0 && after_target_fraction <= 1.0) =>
            {
                return Err(format!(
                    "Invalid paced fractions: max {} / after target {}",
                    max_fraction, after_target_fraction
                ));
            }
            _ => {}
        }
        if let SuggestedSizePolicy::CapAt { risk_cap } = self.suggested_size {
            if !(risk_cap > 0.0 && risk_cap <= 1.0) {
                return Err(format!("Invalid risk_cap: {}", risk_cap));
            }
        }
        if let Some(ws) = &self.win_streak {
            if ws.cap < 1.0 {
                return Err(format!("Win streak cap must be >= 1.0, got {}", ws.cap));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(SizingConfig::aggressive().validate().is_ok());
        assert!(SizingConfig::conservative().validate().is_ok());
        assert!(SizingConfig::flip().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let mut config = SizingConfig::aggressive();
        config.min_fraction = 0.3;

        let err = config.validate().unwrap_err();
        assert!(err.contains("exceeds"));
    }

    #[test]
    fn test_confidence_threshold_scaling() {
        let scaling = SizingConfig::conservative().confidence;

        assert!((scaling.apply(0.9) - 1.05).abs() < 1e-12);
        assert!((scaling.apply(1.0) - 1.1).abs() < 1e-12);
        assert_eq!(scaling.apply(0.8), 0.8);
        assert_eq!(scaling.apply(0.5), 0.8);
    }

    #[test]
    fn test_floor_taper() {
        let taper = FloorTaper {
            slope: 5.0,
            floor: 0.3,
        };
        assert_eq!(taper.apply(0.0), 1.0);
        assert!((taper.apply(0.1) - 0.5).abs() < 1e-12);
        assert_eq!(taper.apply(0.5), 0.3);
    }

    #[test]
    fn test_set_max_position_moves_paced_bound() {
        let mut flip = SizingConfig::flip();
        flip.set_max_position(0.25);
        assert_eq!(flip.max_fraction, 0.25);
        assert!(matches!(
            flip.base,
            BaseSizing::TargetPaced { max_fraction, .. } if max_fraction == 0.25
        ));

        let mut aggressive = SizingConfig::aggressive();
        aggressive.set_max_position(0.1);
        assert_eq!(aggressive.base, BaseSizing::Fixed { fraction: 0.1 });
        assert_eq!(aggressive.max_fraction, 0.20);
    }
}
