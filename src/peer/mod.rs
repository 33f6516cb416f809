//! Remote side of a run: connect to the coordinator and answer its rounds.
mod client;
mod rounds;


pub use client::{PeerOptions, connect_with_retry, run_peer};
pub use rounds::{PeerHandshake, PeerSummary, answer_rounds, receive_handshake};
