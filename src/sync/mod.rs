//! Synchronization primitives shared by the peer workers.
mod barrier;


pub use barrier::{BarrierAborted, BarrierWaitResult, RendezvousBarrier};
