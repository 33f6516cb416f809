use std::time::{Duration, Instant};

/// Clock resolution: one tick is one nanosecond.
pub const TICKS_PER_SECOND: u64 = 1_000_000_000;

const MICROS_PER_SECOND: f64 = 1.0e6;

/// Monotonic tick source anchored at construction.
///
/// Copies share the same origin, so ticks read on different threads are
/// directly comparable.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    #[must_use]
    pub fn now(&self) -> u64 {
        duration_to_ticks(self.origin.elapsed())
    }

    #[must_use]
    pub const fn ticks_per_second(&self) -> u64 {
        TICKS_PER_SECOND
    }
}

#[must_use]
pub fn duration_to_ticks(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

#[must_use]
pub const fn ticks_to_duration(ticks: u64) -> Duration {
    Duration::from_nanos(ticks)
}

/// Converts a tick count measured at `ticks_per_second` to microseconds.
#[must_use]
pub fn ticks_to_micros(ticks: f64, ticks_per_second: u64) -> f64 {
    ticks * MICROS_PER_SECOND / ticks_per_second.max(1) as f64
}

#[must_use]
pub fn ticks_to_seconds(ticks: u64, ticks_per_second: u64) -> f64 {
    ticks as f64 / ticks_per_second.max(1) as f64
}
