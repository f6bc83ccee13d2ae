use crate::domain::market::MetricsSnapshot;

/// Pass/fail filter deciding whether a snapshot is worth trading.
///
/// Implementations are pure: the same snapshot always yields the same
/// answer and nothing is mutated.
pub trait SignalGate: Send + Sync {
    /// Name of the gate for logging
    fn name(&self) -> &str;

    /// Names of the checks the snapshot fails. Empty means the gate passes.
    fn failed_checks(&self, snapshot: &MetricsSnapshot) -> Vec<&'static str>;

    fn evaluate(&self, snapshot: &MetricsSnapshot) -> bool {
        self.failed_checks(snapshot).is_empty()
    }
}
