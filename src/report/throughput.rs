use super::latency::LatencyHistograms;
use crate::session::RunOutcome;
use crate::timing::ticks_to_seconds;

/// Share of the target rate a rate-limited run must reach before a warning
/// is printed.
pub const RATE_FUDGE_FACTOR: f64 = 0.95;

const BYTES_PER_MEGABYTE: f64 = 1.0e6;
const BITS_PER_BYTE: f64 = 8.0;

/// Traffic rates over the measured phase, from the first round's start to
/// the last round's stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    pub seconds: f64,
    pub send_mbps: f64,
    pub recv_mbps: f64,
    pub total_mbps: f64,
    pub iterations_per_sec: f64,
    pub target_rate: Option<u32>,
}

impl Throughput {
    #[must_use]
    pub fn from_run(outcome: &RunOutcome, latency: &LatencyHistograms) -> Self {
        let params = &outcome.parameters;
        let seconds = ticks_to_seconds(
            latency.last_stop.saturating_sub(latency.first_start),
            outcome.ticks_per_second,
        );
        let rounds = f64::from(params.iterations) * outcome.peers.len() as f64;
        let send_megabytes = f64::from(params.fan_out_size) / BYTES_PER_MEGABYTE * rounds;
        let recv_megabytes = f64::from(params.fan_in_size) / BYTES_PER_MEGABYTE * rounds;
        let rate = |megabytes: f64| megabytes * BITS_PER_BYTE / seconds;
        Self {
            seconds,
            send_mbps: rate(send_megabytes),
            recv_mbps: rate(recv_megabytes),
            total_mbps: rate(send_megabytes + recv_megabytes),
            iterations_per_sec: f64::from(params.iterations) / seconds,
            target_rate: params.rate_limit,
        }
    }

    /// True when a rate-limited run fell short of its target by more than
    /// [`RATE_FUDGE_FACTOR`] allows.
    #[must_use]
    pub fn missed_target(&self) -> bool {
        self.target_rate
            .is_some_and(|target| self.iterations_per_sec < f64::from(target) * RATE_FUDGE_FACTOR)
    }
}
