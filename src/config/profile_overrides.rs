//! Construction-parameter overrides applied on top of a preset profile.
//!
//! ```toml
//! max_drawdown = 0.10
//! max_position = 0.12
//! stop_loss = 0.015
//! leverage_scaling = false
//! ```

use crate::application::engine::{ProfileKind, StrategyProfile};
use crate::application::risk_management::sizing_config::SuggestedSizePolicy;
use crate::application::signals::GateConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileOverrides {
    pub max_drawdown: Option<f64>,
    /// Base position fraction (paced cap for flip)
    pub max_position: Option<f64>,
    pub stop_loss: Option<f64>,
    pub max_daily_trades: Option<u32>,
    pub leverage: Option<f64>,
    pub risk_multiplier: Option<f64>,
    /// Return target (daily target, or total target for flip)
    #[serde(alias = "target_return")]
    pub daily_target: Option<f64>,
    /// Conservative gate confidence floor
    pub min_confidence: Option<f64>,
    /// Conservative cap on caller-suggested size
    pub risk_cap: Option<f64>,
    /// Aggressive volatility/regime leverage scaling
    pub leverage_scaling: Option<bool>,
}

impl ProfileOverrides {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse profile overrides TOML")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read overrides file: {}", path.display()))?;
        let overrides: ProfileOverrides = toml::from_str(&content)
            .context(format!("Failed to parse overrides TOML: {}", path.display()))?;
        info!("ProfileOverrides: loaded from {}", path.display());
        Ok(overrides)
    }

    /// Writes every set field into `profile`. The result is not validated;
    /// engine construction does that.
    pub fn apply(&self, profile: &mut StrategyProfile) {
        if let Some(v) = self.max_drawdown {
            profile.max_drawdown = v;
        }
        if let Some(v) = self.max_position {
            profile.sizing.set_max_position(v);
        }
        if let Some(v) = self.stop_loss {
            profile.outcome.loss.stop_loss = v;
        }
        if let Some(v) = self.max_daily_trades {
            profile.max_daily_trades = v;
        }
        if let Some(v) = self.leverage {
            profile.leverage = v;
        }
        if let Some(v) = self.risk_multiplier {
            profile.risk_multiplier = v;
        }
        if let Some(v) = self.daily_target {
            profile.daily_target = v;
        }

        if let Some(v) = self.min_confidence {
            match &mut profile.gate {
                GateConfig::Conservative(gate) => gate.min_confidence = v,
                _ => warn!(
                    "ProfileOverrides: min_confidence ignored for {} profile",
                    profile.kind
                ),
            }
        }

        if let Some(v) = self.risk_cap {
            match &mut profile.sizing.suggested_size {
                SuggestedSizePolicy::CapAt { risk_cap } => *risk_cap = v,
                _ => warn!(
                    "ProfileOverrides: risk_cap ignored for {} profile",
                    profile.kind
                ),
            }
        }

        if let Some(enabled) = self.leverage_scaling {
            if enabled {
                if profile.sizing.leverage.is_none() {
                    let preset = StrategyProfile::aggressive().sizing.leverage;
                    profile.sizing.leverage = preset;
                }
            } else {
                profile.sizing.leverage = None;
            }
        }
    }

    /// Preset for `kind` with these overrides applied
    pub fn build_profile(&self, kind: ProfileKind) -> StrategyProfile {
        let mut profile = StrategyProfile::preset(kind);
        self.apply(&mut profile);
        profile
    }
}
