pub mod aggressive_gate;
pub mod conservative_gate;
pub mod flip_gate;
pub mod gate_trait;

pub use aggressive_gate::{AggressiveGate, AggressiveGateConfig};
pub use conservative_gate::{ConservativeGate, ConservativeGateConfig};
pub use flip_gate::{FlipGate, FlipGateConfig};
pub use gate_trait::SignalGate;

/// Gate selection carried by a strategy profile
#[derive(Debug, Clone, PartialEq)]
pub enum GateConfig {
    Aggressive(AggressiveGateConfig),
    Conservative(ConservativeGateConfig),
    Flip(FlipGateConfig),
}

impl GateConfig {
    pub fn build(&self) -> Box<dyn SignalGate> {
        match self {
            GateConfig::Aggressive(config) => Box::new(AggressiveGate::new(config.clone())),
            GateConfig::Conservative(config) => Box::new(ConservativeGate::new(config.clone())),
            GateConfig::Flip(config) => Box::new(FlipGate::new(config.clone())),
        }
    }
}
