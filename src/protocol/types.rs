use std::time::Duration;

/// Discarded rounds run before measurement starts.
pub const WARMUP_ROUNDS: u32 = 10;

/// Coordinator port used when an address omits one.
pub const DEFAULT_PORT: u16 = 27779;

/// How each peer's pre-round delay is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelayMode {
    #[default]
    None,
    /// Uniformly random in `[0, magnitude)`, fresh every round.
    RandomJitter,
    /// Fixed per-peer offset `magnitude * index / peer_count`.
    UniformScheduled,
}

impl DelayMode {
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            DelayMode::None => 0,
            DelayMode::RandomJitter => 1,
            DelayMode::UniformScheduled => 2,
        }
    }

    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(DelayMode::None),
            1 => Some(DelayMode::RandomJitter),
            2 => Some(DelayMode::UniformScheduled),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            DelayMode::None => "none",
            DelayMode::RandomJitter => "random jitter",
            DelayMode::UniformScheduled => "uniform schedule",
        }
    }
}

/// Run configuration sent to every peer once the accept phase closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestParameters {
    pub peer_count: u32,
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
    pub warmup_rounds: u32,
}

impl TestParameters {
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_micros(self.delay_us as u64)
    }

    /// True when peers sleep before each measured round.
    #[must_use]
    pub const fn delay_enabled(&self) -> bool {
        self.delay_us > 0 && !matches!(self.delay_mode, DelayMode::None)
    }

    #[must_use]
    pub fn peer_count_usize(&self) -> usize {
        usize::try_from(self.peer_count).unwrap_or(usize::MAX)
    }

    #[must_use]
    pub fn iterations_usize(&self) -> usize {
        usize::try_from(self.iterations).unwrap_or(usize::MAX)
    }

    #[must_use]
    pub fn fan_out_len(&self) -> usize {
        usize::try_from(self.fan_out_size).unwrap_or(usize::MAX)
    }

    #[must_use]
    pub fn fan_in_len(&self) -> usize {
        usize::try_from(self.fan_in_size).unwrap_or(usize::MAX)
    }
}

/// Identity handed to a peer right after the parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerAssignment {
    pub index: u32,
}

/// What a peer reports back after the last measured round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeerReport {
    pub retransmits: u32,
}

impl PeerReport {
    /// Wire value sent by a peer without a retransmit counter.
    pub const UNAVAILABLE: u32 = u32::MAX;

    /// Report for a measured-phase delta. Deltas that do not fit stop one
    /// below [`PeerReport::UNAVAILABLE`].
    #[must_use]
    pub fn from_delta(delta: Option<u64>) -> Self {
        let ceiling = Self::UNAVAILABLE - 1;
        let retransmits = delta.map_or(Self::UNAVAILABLE, |count| {
            u32::try_from(count).map_or(ceiling, |count| count.min(ceiling))
        });
        PeerReport { retransmits }
    }

    /// The reported delta, or `None` when the peer had no counter.
    #[must_use]
    pub const fn count(self) -> Option<u32> {
        if self.retransmits == Self::UNAVAILABLE {
            None
        } else {
            Some(self.retransmits)
        }
    }
}
