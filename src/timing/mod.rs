//! Monotonic clock and per-round pacing.
mod clock;
mod pacer;


pub use clock::{Clock, TICKS_PER_SECOND, ticks_to_micros, ticks_to_seconds};
pub use pacer::{DelayPlan, RatePacer, sleep_at_least};
