use std::num::NonZeroUsize;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Reusable N-party rendezvous.
///
/// Every participant calls [`RendezvousBarrier::wait`] once per round. The
/// last arrival releases the whole round and the barrier immediately accepts
/// arrivals for the next one. A participant that never arrives blocks the
/// rest forever; only an explicit [`RendezvousBarrier::abort`] releases them.
#[derive(Debug)]
pub struct RendezvousBarrier {
    parties: NonZeroUsize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    aborted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    leader: bool,
    generation: u64,
}

impl BarrierWaitResult {
    /// True for exactly one participant per round: the one whose arrival
    /// completed it.
    #[must_use]
    pub const fn is_leader(self) -> bool {
        self.leader
    }

    /// Zero-based index of the round this wait belonged to.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierAborted;

impl RendezvousBarrier {
    #[must_use]
    pub const fn new(parties: NonZeroUsize) -> Self {
        Self {
            parties,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                aborted: false,
            }),
            released: Condvar::new(),
        }
    }

    #[must_use]
    pub const fn parties(&self) -> usize {
        self.parties.get()
    }

    /// Blocks until all parties have arrived for the current round.
    ///
    /// # Errors
    ///
    /// Returns [`BarrierAborted`] when the barrier was aborted before or while
    /// waiting.
    pub fn wait(&self) -> Result<BarrierWaitResult, BarrierAborted> {
        let mut state = self.lock();
        if state.aborted {
            return Err(BarrierAborted);
        }

        let generation = state.generation;
        state.arrived = state.arrived.saturating_add(1);
        if state.arrived >= self.parties.get() {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.released.notify_all();
            return Ok(BarrierWaitResult {
                leader: true,
                generation,
            });
        }

        while state.generation == generation && !state.aborted {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if state.generation == generation {
            return Err(BarrierAborted);
        }
        Ok(BarrierWaitResult {
            leader: false,
            generation,
        })
    }

    /// Releases every current and future waiter with [`BarrierAborted`].
    pub fn abort(&self) {
        let mut state = self.lock();
        state.aborted = true;
        self.released.notify_all();
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.lock().aborted
    }

    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        // The state is plain counters; a panicking holder cannot leave it torn.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
