//! Simulation run parameters parsed from environment variables.

use crate::application::engine::{ProfileKind, SessionConfig};
use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationEnvConfig {
    pub profile: ProfileKind,
    pub initial_capital: f64,
    /// `None` seeds from OS entropy
    pub seed: Option<u64>,
    pub days: u32,
    pub ticks_per_day: u32,
    pub signal_quality: f64,
    /// Optional TOML file with profile overrides
    pub overrides_path: Option<PathBuf>,
}

impl Default for SimulationEnvConfig {
    fn default() -> Self {
        Self {
            profile: ProfileKind::Aggressive,
            initial_capital: 10_000.0,
            seed: None,
            days: 5,
            ticks_per_day: 50,
            signal_quality: 0.6,
            overrides_path: None,
        }
    }
}

impl SimulationEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parses from an arbitrary key lookup. Missing keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let profile = match lookup("SIM_PROFILE") {
            Some(value) => ProfileKind::from_str(&value).context("Failed to parse SIM_PROFILE")?,
            None => defaults.profile,
        };
        let initial_capital = Self::parse(&lookup, "SIM_INITIAL_CAPITAL", defaults.initial_capital)?;
        if !(initial_capital.is_finite() && initial_capital > 0.0) {
            bail!("SIM_INITIAL_CAPITAL must be positive, got {}", initial_capital);
        }
        let seed = match lookup("SIM_SEED") {
            Some(value) => Some(
                value
                    .trim()
                    .parse::<u64>()
                    .context("Failed to parse SIM_SEED")?,
            ),
            None => None,
        };
        let days = Self::parse(&lookup, "SIM_DAYS", defaults.days)?;
        let ticks_per_day = Self::parse(&lookup, "SIM_TICKS_PER_DAY", defaults.ticks_per_day)?;
        let signal_quality = Self::parse(&lookup, "SIM_SIGNAL_QUALITY", defaults.signal_quality)?;
        if !(0.0..=1.0).contains(&signal_quality) {
            bail!("SIM_SIGNAL_QUALITY must be in [0, 1], got {}", signal_quality);
        }
        let overrides_path = lookup("SIM_PROFILE_OVERRIDES")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            profile,
            initial_capital,
            seed,
            days,
            ticks_per_day,
            signal_quality,
            overrides_path,
        })
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            days: self.days,
            ticks_per_day: self.ticks_per_day,
        }
    }

    fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
    where
        F: Fn(&str) -> Option<String>,
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match lookup(key) {
            Some(value) => value
                .trim()
                .parse::<T>()
                .context(format!("Failed to parse {}", key)),
            None => Ok(default),
        }
    }
}
