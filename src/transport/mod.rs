//! Byte-stream transport used by the round protocol.
mod stream;
mod tuning;


pub use stream::Transport;
pub use tuning::TransportTuning;
