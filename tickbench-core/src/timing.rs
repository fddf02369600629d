//! Tick Conversion Helpers
//!
//! Raw durations are tick counts from the target timer. These helpers turn
//! them into comparable numbers and refuse to fabricate a rate when the
//! inputs cannot support one.

/// Duration reported when no timer backed the measurement window.
pub const UNDEFINED_DURATION: u64 = u64::MAX;

/// Convert a tick count into seconds.
///
/// Returns `None` when the duration is undefined or the tick rate is zero.
pub fn seconds(duration: u64, ticks_per_sec: u64) -> Option<f64> {
    if duration == UNDEFINED_DURATION || ticks_per_sec == 0 {
        return None;
    }
    Some(duration as f64 / ticks_per_sec as f64)
}

/// Iteration throughput over a measured window.
///
/// Returns `None` when the window has no positive, defined length, so
/// callers can never divide by zero or print a fabricated rate.
pub fn iterations_per_sec(iterations: u64, duration: u64, ticks_per_sec: u64) -> Option<f64> {
    let secs = seconds(duration, ticks_per_sec)?;
    if secs <= 0.0 {
        return None;
    }
    Some(iterations as f64 / secs)
}
