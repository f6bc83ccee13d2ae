// Clock adapters backing the Clock port
pub mod clock;

// Random sources backing the RandomSource port
pub mod random;

// Synthetic market data
pub mod simulation;

pub use clock::{FixedClock, SystemClock};
pub use random::{ScriptedRandom, StdRandom};
