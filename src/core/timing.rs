//! Wall-clock timing for operations that may run long, such as world
//! generation or a large sector change.

use log::{trace, warn};
use web_time::{Duration, Instant};

/// Operations at or above this duration are logged as warnings.
pub const SLOW_OPERATION: Duration = Duration::from_millis(100);

/// Runs `f`, logging how long it took under `label`.
///
/// Fast operations are logged at trace level, slow ones at warn.
pub fn timed<R>(label: &str, f: impl FnOnce() -> R) -> R {
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();

    if elapsed >= SLOW_OPERATION {
        warn!("{} took {:.3}s", label, elapsed.as_secs_f64());
    } else {
        trace!("{} took {:.3}ms", label, elapsed.as_secs_f64() * 1000.0);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_returns_result() {
        assert_eq!(timed("sum", || (1..=10).sum::<i32>()), 55);
    }
}
