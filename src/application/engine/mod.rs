pub mod profile;
pub mod session;
pub mod strategy_engine;

pub use profile::{ProfileKind, StrategyProfile, TargetRule};
pub use session::{BatchReport, SessionConfig, SessionReport, run_batch, run_session};
pub use strategy_engine::StrategyEngine;
