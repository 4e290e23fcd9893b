//! Shared primitive types used across the engine.

use std::time::Duration;

/// Stable identifier of a glass. Assigned monotonically, never reused.
pub type GlassId = u64;

/// Signed jump amount in whole seconds.
pub type DeltaSecs = i64;

/// Convert a duration to fractional seconds for snapshots and display.
pub fn secs(d: Duration) -> f64 {
    d.as_secs_f64()
}
