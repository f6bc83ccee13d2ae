// Market signal domain
pub mod market;

// Port interfaces
pub mod ports;

// Risk ledger domain
pub mod risk;

// Trade outcomes and engine status
pub mod trading;

// Domain-specific error types
pub mod errors;
