use crate::application::risk_management::{OutcomeConfig, SizingConfig};
use crate::application::signals::{
    AggressiveGateConfig, ConservativeGateConfig, FlipGateConfig, GateConfig,
};
use crate::domain::errors::SimulationError;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Aggressive,
    Conservative,
    Flip,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Aggressive => "aggressive",
            ProfileKind::Conservative => "conservative",
            ProfileKind::Flip => "flip",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aggressive" => Ok(ProfileKind::Aggressive),
            "conservative" => Ok(ProfileKind::Conservative),
            "flip" => Ok(ProfileKind::Flip),
            other => bail!(
                "Unknown profile '{}'. Expected aggressive, conservative or flip",
                other
            ),
        }
    }
}

/// Pre-trade rule that blocks trading once a return target is met
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRule {
    None,
    /// Total return since construction reaches the target
    TotalReturn,
    /// Period P&L relative to current capital reaches the target
    DailyReturn,
}

/// Every threshold, table and bound that distinguishes one bot from another.
///
/// The engine is generic; all behavioural differences live here.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyProfile {
    pub kind: ProfileKind,
    pub max_daily_trades: u32,
    /// Hard stop: trading blocks once drawdown exceeds this
    pub max_drawdown: f64,
    pub daily_target: f64,
    pub target_rule: TargetRule,
    /// Reported only; sizing leverage comes from `sizing.leverage`
    pub leverage: f64,
    pub risk_multiplier: f64,
    /// Trailing window for status statistics, `None` = all history
    pub win_rate_window: Option<usize>,
    /// Win rate the bot aims for, reported in the status
    pub target_win_rate: Option<f64>,
    pub gate: GateConfig,
    pub sizing: SizingConfig,
    pub outcome: OutcomeConfig,
}

impl StrategyProfile {
    pub fn aggressive() -> Self {
        Self {
            kind: ProfileKind::Aggressive,
            max_daily_trades: 15,
            max_drawdown: 0.18,
            daily_target: 0.06,
            target_rule: TargetRule::None,
            leverage: 3.0,
            risk_multiplier: 1.5,
            win_rate_window: Some(25),
            target_win_rate: None,
            gate: GateConfig::Aggressive(AggressiveGateConfig::default()),
            sizing: SizingConfig::aggressive(),
            outcome: OutcomeConfig::aggressive(),
        }
    }

    pub fn conservative() -> Self {
        Self {
            kind: ProfileKind::Conservative,
            max_daily_trades: 4,
            max_drawdown: 0.03,
            daily_target: 0.01,
            target_rule: TargetRule::DailyReturn,
            leverage: 1.0,
            risk_multiplier: 1.0,
            win_rate_window: None,
            target_win_rate: Some(0.75),
            gate: GateConfig::Conservative(ConservativeGateConfig::default()),
            sizing: SizingConfig::conservative(),
            outcome: OutcomeConfig::conservative(),
        }
    }

    pub fn flip() -> Self {
        Self {
            kind: ProfileKind::Flip,
            max_daily_trades: 15,
            max_drawdown: 0.20,
            daily_target: 1.0,
            target_rule: TargetRule::TotalReturn,
            leverage: 1.0,
            risk_multiplier: 1.0,
            win_rate_window: None,
            target_win_rate: None,
            gate: GateConfig::Flip(FlipGateConfig::default()),
            sizing: SizingConfig::flip(),
            outcome: OutcomeConfig::flip(),
        }
    }

    pub fn preset(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Aggressive => Self::aggressive(),
            ProfileKind::Conservative => Self::conservative(),
            ProfileKind::Flip => Self::flip(),
        }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let invalid = |reason: String| SimulationError::invalid_profile(self.kind.as_str(), reason);

        if self.max_daily_trades == 0 {
            return Err(invalid("max_daily_trades must be > 0".to_string()));
        }
        if !(self.max_drawdown > 0.0 && self.max_drawdown <= 1.0) {
            return Err(invalid(format!(
                "Invalid max_drawdown: {}",
                self.max_drawdown
            )));
        }
        if !(self.daily_target.is_finite() && self.daily_target > 0.0) {
            return Err(invalid(format!(
                "Invalid daily_target: {}",
                self.daily_target
            )));
        }
        if !(self.leverage.is_finite() && self.leverage > 0.0) {
            return Err(invalid(format!("Invalid leverage: {}", self.leverage)));
        }
        if !(self.risk_multiplier.is_finite() && self.risk_multiplier > 0.0) {
            return Err(invalid(format!(
                "Invalid risk_multiplier: {}",
                self.risk_multiplier
            )));
        }
        if self.win_rate_window == Some(0) {
            return Err(invalid("win_rate_window must be > 0".to_string()));
        }
        if let Some(rate) = self.target_win_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid(format!("Invalid target_win_rate: {}", rate)));
            }
        }
        self.sizing.validate().map_err(invalid)?;
        self.outcome.validate().map_err(invalid)?;
        Ok(())
    }
}
