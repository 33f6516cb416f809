use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Bind error on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to accept peer connection: {source}")]
    Accept {
        #[source]
        source: std::io::Error,
    },
    #[error("No peers connected.")]
    NoPeers,
    #[error("Too many peers connected ({count}); peer indices are 32-bit.")]
    TooManyPeers { count: usize },
    #[error("Peer {peer}: round {round} stopped at tick {stop}, not after its start {start}.")]
    RoundOrdering {
        peer: usize,
        round: usize,
        start: u64,
        stop: u64,
    },
    #[error("Round {round}: last stop {last_stop} is not after first start {first_start}.")]
    RoundSpan {
        round: usize,
        first_start: u64,
        last_stop: u64,
    },
    #[error("Peer {peer} recorded {actual} rounds, expected {expected}.")]
    MissingRounds {
        peer: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Peer {peer}: worker thread panicked.")]
    WorkerPanicked { peer: usize },
    #[error("Peer {peer}: round barrier aborted after another peer failed.")]
    BarrierAborted { peer: usize },
    #[error("Peer {peer}: worker finished without publishing a result.")]
    ResultMissing { peer: usize },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}

impl SessionError {
    #[must_use]
    pub const fn peer(&self) -> Option<usize> {
        match self {
            SessionError::RoundOrdering { peer, .. }
            | SessionError::MissingRounds { peer, .. }
            | SessionError::WorkerPanicked { peer }
            | SessionError::BarrierAborted { peer }
            | SessionError::ResultMissing { peer } => Some(*peer),
            SessionError::Bind { .. }
            | SessionError::Accept { .. }
            | SessionError::NoPeers
            | SessionError::TooManyPeers { .. }
            | SessionError::RoundSpan { .. } => None,
            #[cfg(test)]
            SessionError::TestExpectation { .. } | SessionError::TestExpectationValue { .. } => {
                None
            }
        }
    }
}
