use thiserror::Error;

/// Errors raised when an engine or its ledger would be put into an invalid state.
///
/// Trading limits, drawdown stops and signal rejections are NOT errors; they are
/// reported as [`crate::domain::trading::outcome::Outcome::Blocked`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid capital: {amount} (must be positive and finite)")]
    InvalidCapital { amount: f64 },

    #[error("Invalid profile '{profile}': {reason}")]
    InvalidProfile { profile: String, reason: String },
}

impl SimulationError {
    pub fn invalid_profile(profile: impl Into<String>, reason: impl Into<String>) -> Self {
        SimulationError::InvalidProfile {
            profile: profile.into(),
            reason: reason.into(),
        }
    }
}
