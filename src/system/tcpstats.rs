//! System-wide TCP retransmit counter.
//!
//! The counter covers every TCP connection on the host, so peers sharing a
//! machine all observe the same value.
use std::path::{Path, PathBuf};

use tracing::debug;

const SNMP_PATH: &str = "/proc/net/snmp";
const TCP_PREFIX: &str = "Tcp:";
const RETRANS_FIELD: &str = "RetransSegs";

/// Source of retransmitted-segment snapshots.
///
/// Shared by every worker thread of a run.
pub trait RetransmitCounter: Sync {
    /// Current counter value, or `None` when the platform does not expose it.
    fn snapshot(&self) -> Option<u64>;
}

/// Reads `RetransSegs` from the kernel's SNMP table.
#[derive(Debug, Clone)]
pub struct SystemTcpStats {
    path: PathBuf,
}

impl Default for SystemTcpStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemTcpStats {
    #[must_use]
    pub fn new() -> Self {
        Self::with_path(SNMP_PATH)
    }

    #[must_use]
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RetransmitCounter for SystemTcpStats {
    fn snapshot(&self) -> Option<u64> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => parse_retrans_segs(&contents),
            Err(err) => {
                debug!("TCP statistics unavailable at {}: {}", self.path.display(), err);
                None
            }
        }
    }
}

/// Extracts `RetransSegs` from `/proc/net/snmp` text: a `Tcp:` header line
/// naming the columns followed by a `Tcp:` line with their values.
#[must_use]
pub fn parse_retrans_segs(contents: &str) -> Option<u64> {
    let mut tcp_lines = contents
        .lines()
        .filter_map(|line| line.strip_prefix(TCP_PREFIX));
    let header = tcp_lines.next()?;
    let values = tcp_lines.next()?;
    header
        .split_whitespace()
        .zip(values.split_whitespace())
        .find(|(name, _)| *name == RETRANS_FIELD)
        .and_then(|(_, value)| value.parse().ok())
}

/// Counter growth between two snapshots; `None` when either is missing.
#[must_use]
pub fn retransmit_delta(before: Option<u64>, after: Option<u64>) -> Option<u64> {
    Some(after?.saturating_sub(before?))
}
