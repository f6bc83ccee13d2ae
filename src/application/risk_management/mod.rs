// Position sizing and outcome resolution
pub mod outcome_simulator;
pub mod position_sizer;
pub mod sizing_config;

pub use outcome_simulator::{OutcomeConfig, OutcomeSimulator};
pub use position_sizer::{PositionSizer, SizingBreakdown};
pub use sizing_config::SizingConfig;
