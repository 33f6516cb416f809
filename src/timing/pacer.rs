use std::time::Duration;

use rand::Rng;

use super::clock::{Clock, duration_to_ticks, ticks_to_duration};
use crate::protocol::DelayMode;

/// Pre-round delay for one peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPlan {
    mode: DelayMode,
    magnitude_ticks: u64,
    peer_index: u64,
    peer_count: u64,
}

impl DelayPlan {
    #[must_use]
    pub fn new(mode: DelayMode, magnitude: Duration, peer_index: usize, peer_count: usize) -> Self {
        Self {
            mode,
            magnitude_ticks: duration_to_ticks(magnitude),
            peer_index: u64::try_from(peer_index).unwrap_or(u64::MAX),
            peer_count: u64::try_from(peer_count).unwrap_or(u64::MAX).max(1),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.magnitude_ticks > 0 && !matches!(self.mode, DelayMode::None)
    }

    /// Requested delay for the next round, in ticks.
    ///
    /// Random jitter draws uniformly from `[0, magnitude)`. Uniform scheduling
    /// gives peer `k` of `n` the fixed offset `magnitude * k / n`, spreading
    /// the peers evenly across the window.
    pub fn target_ticks<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        if !self.is_enabled() {
            return 0;
        }
        match self.mode {
            DelayMode::None => 0,
            DelayMode::RandomJitter => rng.gen_range(0..self.magnitude_ticks),
            DelayMode::UniformScheduled => {
                let scaled = u128::from(self.magnitude_ticks)
                    .saturating_mul(u128::from(self.peer_index))
                    .checked_div(u128::from(self.peer_count))
                    .unwrap_or(0);
                u64::try_from(scaled).unwrap_or(u64::MAX)
            }
        }
    }
}

/// Sleeps until at least `target_ticks` have elapsed and returns the ticks
/// that actually passed.
///
/// Coarse sleeps can overshoot; short ones are re-issued for the remaining
/// delta, so the result is never below the target.
pub fn sleep_at_least(clock: &Clock, target_ticks: u64) -> u64 {
    let start = clock.now();
    loop {
        let elapsed = clock.now().saturating_sub(start);
        if elapsed >= target_ticks {
            return elapsed;
        }
        std::thread::sleep(ticks_to_duration(target_ticks.saturating_sub(elapsed)));
    }
}

/// Holds back round `i + 1` until `i / rate` seconds have passed since the
/// measured phase began.
///
/// The wait spins on the clock, yielding the thread between reads; sleeping
/// would miss sub-millisecond targets.
#[derive(Debug, Clone, Copy)]
pub struct RatePacer {
    start_tick: u64,
    rate_per_sec: u64,
    ticks_per_second: u64,
}

impl RatePacer {
    #[must_use]
    pub fn new(clock: &Clock, start_tick: u64, rate_per_sec: u64) -> Self {
        Self {
            start_tick,
            rate_per_sec: rate_per_sec.max(1),
            ticks_per_second: clock.ticks_per_second(),
        }
    }

    /// Absolute tick at which the round after `iteration` may begin.
    #[must_use]
    pub fn expected_tick(&self, iteration: u64) -> u64 {
        let offset = u128::from(iteration)
            .saturating_mul(u128::from(self.ticks_per_second))
            .checked_div(u128::from(self.rate_per_sec))
            .unwrap_or(0);
        self.start_tick
            .saturating_add(u64::try_from(offset).unwrap_or(u64::MAX))
    }

    pub fn wait_after(&self, clock: &Clock, iteration: u64) {
        let expected = self.expected_tick(iteration);
        while clock.now() < expected {
            std::thread::yield_now();
        }
    }
}
