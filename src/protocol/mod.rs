//! Fixed-width little-endian records exchanged between coordinator and peers.
mod codec;
mod io;
mod types;

#[cfg(test)]
mod tests;

pub use codec::WireRecord;
pub use io::{recv_record, send_record};
pub use types::{DEFAULT_PORT, DelayMode, PeerAssignment, PeerReport, TestParameters, WARMUP_ROUNDS};
