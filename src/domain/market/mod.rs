pub mod market_regime;
pub mod metrics_snapshot;

pub use market_regime::{MarketRegime, RegimeTable};
pub use metrics_snapshot::MetricsSnapshot;
