use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categorical label of the current market condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    TrendingBull,
    TrendingBear,
    HighVolatility,
    LowVolatility,
    Sideways,
    #[default]
    #[serde(other)]
    Unknown,
}

impl MarketRegime {
    pub const ALL: [MarketRegime; 6] = [
        MarketRegime::TrendingBull,
        MarketRegime::TrendingBear,
        MarketRegime::HighVolatility,
        MarketRegime::LowVolatility,
        MarketRegime::Sideways,
        MarketRegime::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketRegime::TrendingBull => "trending_bull",
            MarketRegime::TrendingBear => "trending_bear",
            MarketRegime::HighVolatility => "high_volatility",
            MarketRegime::LowVolatility => "low_volatility",
            MarketRegime::Sideways => "sideways",
            MarketRegime::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MarketRegime {
    type Err = std::convert::Infallible;

    /// Unrecognised labels map to `Unknown` so regime parsing never fails.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let regime = match s.trim().to_lowercase().as_str() {
            "trending_bull" => MarketRegime::TrendingBull,
            "trending_bear" => MarketRegime::TrendingBear,
            "high_volatility" => MarketRegime::HighVolatility,
            "low_volatility" => MarketRegime::LowVolatility,
            "sideways" => MarketRegime::Sideways,
            _ => MarketRegime::Unknown,
        };
        Ok(regime)
    }
}

/// Data-driven mapping from regime to a multiplier, with a fallback for
/// regimes that have no explicit entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeTable {
    entries: Vec<(MarketRegime, f64)>,
    default: f64,
}

impl RegimeTable {
    pub fn new(default: f64) -> Self {
        Self {
            entries: Vec::new(),
            default,
        }
    }

    /// Table that returns 1.0 for every regime.
    pub fn neutral() -> Self {
        Self::new(1.0)
    }

    pub fn with(mut self, regime: MarketRegime, factor: f64) -> Self {
        match self.entries.iter_mut().find(|(r, _)| *r == regime) {
            Some(entry) => entry.1 = factor,
            None => self.entries.push((regime, factor)),
        }
        self
    }

    pub fn factor(&self, regime: MarketRegime) -> f64 {
        self.entries
            .iter()
            .find(|(r, _)| *r == regime)
            .map(|(_, factor)| *factor)
            .unwrap_or(self.default)
    }

    pub fn default_factor(&self) -> f64 {
        self.default
    }
}
