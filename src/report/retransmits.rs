use std::collections::BTreeMap;
use std::net::IpAddr;

use crate::session::RunOutcome;

/// Retransmitted segments during the measured phase.
///
/// Counters are system-wide, so peers on the same host all report the same
/// figure. Peers are grouped by address and only the largest report per
/// address counts. Peers without a counter are left out; hosts where no
/// peer had one do not appear in `per_host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetransmitSummary {
    pub coordinator: Option<u64>,
    /// `None` when no peer had a counter.
    pub peers: Option<u64>,
    pub per_host: BTreeMap<IpAddr, u32>,
}

impl RetransmitSummary {
    /// Coordinator plus whatever peers reported; `None` when the
    /// coordinator had no counter.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.coordinator
            .map(|count| count.saturating_add(self.peers.unwrap_or(0)))
    }
}

#[must_use]
pub fn summarize_retransmits(outcome: &RunOutcome) -> RetransmitSummary {
    let mut per_host: BTreeMap<IpAddr, u32> = BTreeMap::new();
    for (peer, addr) in outcome.peers.iter().zip(&outcome.peer_addrs) {
        let Some(count) = peer.retransmits else {
            continue;
        };
        let slot = per_host.entry(*addr).or_insert(0);
        *slot = (*slot).max(count);
    }
    let peers = (!per_host.is_empty()).then(|| {
        per_host
            .values()
            .fold(0_u64, |sum, count| sum.saturating_add(u64::from(*count)))
    });
    RetransmitSummary {
        coordinator: outcome.coordinator_retransmits,
        peers,
        per_host,
    }
}
