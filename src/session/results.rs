use std::net::IpAddr;

use crate::protocol::TestParameters;

/// Timestamps of one measured round for one peer, in clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub start: u64,
    pub stop: u64,
    /// Ticks actually slept before the fan-out; zero without delay injection.
    pub applied_delay: u64,
}

impl Measurement {
    /// Stop time with the injected delay taken out, as if the round had
    /// started without waiting.
    #[must_use]
    pub const fn exclusive_stop(&self) -> u64 {
        self.stop.saturating_sub(self.applied_delay)
    }
}

/// Everything one worker produced. Index `i` of `measurements` is round `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerResult {
    pub identity: usize,
    pub measurements: Vec<Measurement>,
    /// `None` when the peer had no retransmit counter.
    pub retransmits: Option<u32>,
}

/// Finished run handed to the report.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub parameters: TestParameters,
    pub ticks_per_second: u64,
    /// Ordered by peer identity.
    pub peers: Vec<PeerResult>,
    /// Remote address of each peer, by identity.
    pub peer_addrs: Vec<IpAddr>,
    pub coordinator_retransmits: Option<u64>,
}
