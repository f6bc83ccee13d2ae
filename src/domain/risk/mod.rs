// Capital ledger and trade bookkeeping
pub mod state;
pub mod trade_record;

pub use state::RiskState;
pub use trade_record::{DailySummary, SettledTrade, TradeKind, TradeRecord};
