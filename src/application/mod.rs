// Signal gates deciding whether a snapshot is tradeable
pub mod signals;

// Position sizing and outcome resolution
pub mod risk_management;

// Strategy profiles, the generic engine and multi-day sessions
pub mod engine;
