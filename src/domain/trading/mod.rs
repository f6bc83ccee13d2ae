pub mod outcome;
pub mod status;

pub use outcome::{BlockReason, Outcome};
pub use status::EngineStatus;
