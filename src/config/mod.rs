//! Configuration for simulation runs.
//!
//! Run parameters come from environment variables; per-profile construction
//! parameters can be overridden from a TOML file.

mod profile_overrides;
mod simulation_config;

pub use profile_overrides::ProfileOverrides;
pub use simulation_config::SimulationEnvConfig;
