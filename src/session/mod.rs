//! Coordinator side of a run: accept peers, drive one worker per peer in
//! lock-step rounds, and collect their measurements.
mod orchestrator;
mod results;
mod settings;
mod worker;


pub use orchestrator::{AcceptedPeer, accept_peers, bind_listener, run_session};
pub use results::{Measurement, PeerResult, RunOutcome};
pub use settings::RunSettings;
pub use worker::{PeerWorker, RetransmitWindow, WorkerState, jitter_seed};
