use thiserror::Error;

/// Field of a wire record that failed to decode.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    #[error("rate_limited")]
    RateLimited,
    #[error("clients_limited")]
    ClientsLimited,
    #[error("delay_mode")]
    DelayMode,
    #[error("nagle")]
    Nagle,
    #[error("histogram")]
    Histogram,
    #[error("report_delay")]
    ReportDelay,
    #[error("iterations")]
    Iterations,
    #[error("fan_out_size")]
    FanOutSize,
    #[error("fan_in_size")]
    FanInSize,
    #[error("peer_count")]
    PeerCount,
    #[error("target_rate")]
    TargetRate,
    #[error("send_buffer")]
    SendBuffer,
    #[error("recv_buffer")]
    RecvBuffer,
}

/// Remote side of a connection, as seen from the local process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Peer(usize),
    Coordinator,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Peer(index) => write!(f, "peer {}", index),
            Endpoint::Coordinator => f.write_str("coordinator"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Connection to {endpoint} closed during {context}.")]
    Disconnected {
        endpoint: Endpoint,
        context: &'static str,
    },
    #[error("I/O error talking to {endpoint} during {context}: {source}")]
    Io {
        endpoint: Endpoint,
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Connection error to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Record too short for {record}: expected {expected} bytes, got {actual}.")]
    RecordLength {
        record: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid {field} value {value} in {record}.")]
    InvalidField {
        record: &'static str,
        field: RecordField,
        value: u64,
    },
    #[error("Peer index {index} is outside a run of {peer_count} peer(s).")]
    PeerIndexOutOfRange { index: u32, peer_count: u32 },
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

impl ProtocolError {
    /// Classifies an I/O failure on a peer connection. End-of-stream and
    /// zero-length writes mean the other side went away.
    #[must_use]
    pub fn from_io(endpoint: Endpoint, context: &'static str, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::WriteZero
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe => ProtocolError::Disconnected { endpoint, context },
            _ => ProtocolError::Io {
                endpoint,
                context,
                source,
            },
        }
    }

    #[must_use]
    pub const fn peer(&self) -> Option<usize> {
        match self {
            ProtocolError::Disconnected { endpoint, .. } | ProtocolError::Io { endpoint, .. } => {
                match endpoint {
                    Endpoint::Peer(index) => Some(*index),
                    Endpoint::Coordinator => None,
                }
            }
            ProtocolError::Connect { .. }
            | ProtocolError::RecordLength { .. }
            | ProtocolError::InvalidField { .. }
            | ProtocolError::PeerIndexOutOfRange { .. } => None,
            #[cfg(test)]
            ProtocolError::TestExpectation { .. } | ProtocolError::TestExpectationValue { .. } => {
                None
            }
        }
    }
}
