use crate::protocol::{DelayMode, TestParameters, WARMUP_ROUNDS};
use crate::transport::TransportTuning;

/// Coordinator-side run configuration. The peer count is unknown until the
/// accept phase closes, so it is supplied when the wire parameters are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub iterations: u32,
    pub rate_limit: Option<u32>,
    pub fan_out_size: u32,
    pub fan_in_size: u32,
    pub client_limit: Option<u32>,
    pub delay_us: u32,
    pub delay_mode: DelayMode,
    pub nagle: bool,
    pub send_buffer: Option<u32>,
    pub recv_buffer: Option<u32>,
    pub histogram: bool,
    pub report_delay: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            rate_limit: None,
            fan_out_size: 256,
            fan_in_size: 4096,
            client_limit: None,
            delay_us: 0,
            delay_mode: DelayMode::None,
            nagle: true,
            send_buffer: None,
            recv_buffer: None,
            histogram: false,
            report_delay: false,
        }
    }
}

impl RunSettings {
    #[must_use]
    pub const fn parameters(&self, peer_count: u32) -> TestParameters {
        TestParameters {
            peer_count,
            iterations: self.iterations,
            rate_limit: self.rate_limit,
            fan_out_size: self.fan_out_size,
            fan_in_size: self.fan_in_size,
            client_limit: self.client_limit,
            delay_us: self.delay_us,
            delay_mode: self.delay_mode,
            nagle: self.nagle,
            send_buffer: self.send_buffer,
            recv_buffer: self.recv_buffer,
            histogram: self.histogram,
            report_delay: self.report_delay,
            warmup_rounds: WARMUP_ROUNDS,
        }
    }

    #[must_use]
    pub const fn tuning(&self) -> TransportTuning {
        TransportTuning {
            nodelay: !self.nagle,
            send_buffer: self.send_buffer,
            recv_buffer: self.recv_buffer,
        }
    }
}
