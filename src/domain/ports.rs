use chrono::{DateTime, Utc};

/// Source of uniform draws in `[0, 1)` used by the outcome model and the
/// synthetic snapshot generator.
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;

    /// Uniform draw in `[low, high)`
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_unit()
    }
}

/// Time source for trade timestamps and daily rollup dates
pub trait Clock: Send {
    fn now(&self) -> DateTime<Utc>;
}
