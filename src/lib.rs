//! Core library for the `incast` CLI.
//!
//! One coordinator drives N peers through lock-step fan-out/fan-in rounds
//! over TCP: a rendezvous barrier releases every peer's round together, so
//! all fan-in replies converge on the coordinator at once. The crate holds
//! the round protocol, the barrier and pacing primitives, the histogram
//! engine behind the latency report, and the peer client. The primary
//! user-facing interface is the `incast` command-line application.
pub mod args;
pub mod config;
mod entry;
pub mod error;
pub mod peer;
pub mod protocol;
pub mod report;
pub mod session;
pub mod stats;
pub mod sync;
pub mod system;
pub mod timing;
pub mod transport;

pub use entry::run;
