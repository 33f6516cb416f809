use std::sync::OnceLock;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use super::results::{Measurement, PeerResult};
use crate::error::{AppError, AppResult, Endpoint, ProtocolError, SessionError};
use crate::protocol::{PeerAssignment, PeerReport, TestParameters, recv_record, send_record};
use crate::sync::{BarrierWaitResult, RendezvousBarrier};
use crate::system::{RetransmitCounter, retransmit_delta};
use crate::timing::{Clock, DelayPlan, RatePacer, sleep_at_least};
use crate::transport::Transport;

const JITTER_SEED: u64 = 0xBFB_FBFB;

/// Seed for a peer's jitter generator; distinct per peer, stable across runs.
#[must_use]
pub const fn jitter_seed(identity: usize) -> u64 {
    (identity as u64).saturating_add(1).saturating_mul(JITTER_SEED)
}

/// Coordinator retransmit window spanning the measured rounds only.
///
/// Opened by the worker whose arrival completes the first measured
/// rendezvous, when every peer has finished its warm-up.
pub struct RetransmitWindow<'run> {
    counter: &'run dyn RetransmitCounter,
    before: OnceLock<Option<u64>>,
}

impl<'run> RetransmitWindow<'run> {
    #[must_use]
    pub fn new(counter: &'run dyn RetransmitCounter) -> Self {
        Self {
            counter,
            before: OnceLock::new(),
        }
    }

    fn open(&self) {
        self.before.get_or_init(|| self.counter.snapshot());
    }

    /// Retransmits since the window opened; `None` when it never opened or
    /// the counter is unavailable.
    #[must_use]
    pub fn close(&self) -> Option<u64> {
        let before = self.before.get().copied().flatten();
        retransmit_delta(before, self.counter.snapshot())
    }
}

/// Phases of one peer connection. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Handshake,
    Warmup,
    Measured,
    ResultExchange,
    Done,
}

/// Drives the round protocol for one peer connection.
///
/// Every worker of a run shares the same barrier and clock; nothing else is
/// shared between them.
pub struct PeerWorker<'run, T: Transport> {
    identity: usize,
    transport: T,
    params: &'run TestParameters,
    barrier: &'run RendezvousBarrier,
    clock: Clock,
    window: Option<&'run RetransmitWindow<'run>>,
    fan_out: Vec<u8>,
    fan_in: Vec<u8>,
}

impl<'run, T: Transport> PeerWorker<'run, T> {
    #[must_use]
    pub fn new(
        identity: usize,
        transport: T,
        params: &'run TestParameters,
        barrier: &'run RendezvousBarrier,
        clock: Clock,
    ) -> Self {
        Self {
            identity,
            transport,
            params,
            barrier,
            clock,
            window: None,
            fan_out: vec![0_u8; params.fan_out_len()],
            fan_in: vec![0_u8; params.fan_in_len()],
        }
    }

    /// Opens `window` when this worker completes the first measured
    /// rendezvous.
    #[must_use]
    pub fn with_retransmit_window(mut self, window: &'run RetransmitWindow<'run>) -> Self {
        self.window = Some(window);
        self
    }

    /// Runs the connection from handshake to the peer's report.
    ///
    /// # Errors
    ///
    /// Returns an error on any short read or write, when the barrier is
    /// aborted by a failing sibling, or when a round stops before it starts.
    pub fn run(mut self) -> AppResult<PeerResult> {
        let mut state = WorkerState::Handshake;
        let mut measurements = Vec::new();
        let mut retransmits = None;
        loop {
            state = match state {
                WorkerState::Handshake => {
                    self.handshake()?;
                    WorkerState::Warmup
                }
                WorkerState::Warmup => {
                    self.warmup()?;
                    WorkerState::Measured
                }
                WorkerState::Measured => {
                    measurements = self.measured_rounds()?;
                    WorkerState::ResultExchange
                }
                WorkerState::ResultExchange => {
                    retransmits = self.collect_report()?;
                    WorkerState::Done
                }
                WorkerState::Done => break,
            };
            debug!("Peer {} entered {:?}.", self.identity, state);
        }

        if let Err(err) = self.transport.close() {
            debug!("Peer {}: close failed: {}", self.identity, err);
        }
        Ok(PeerResult {
            identity: self.identity,
            measurements,
            retransmits,
        })
    }

    const fn endpoint(&self) -> Endpoint {
        Endpoint::Peer(self.identity)
    }

    fn handshake(&mut self) -> AppResult<()> {
        let endpoint = self.endpoint();
        send_record(&mut self.transport, self.params, endpoint, "send test parameters")?;
        let index = u32::try_from(self.identity).map_err(|_err| {
            AppError::session(SessionError::TooManyPeers {
                count: self.identity,
            })
        })?;
        send_record(
            &mut self.transport,
            &PeerAssignment { index },
            endpoint,
            "send peer identity",
        )?;
        Ok(())
    }

    fn warmup(&mut self) -> AppResult<()> {
        if self.identity == 0 {
            info!("Warming up...");
        }
        for _ in 0..self.params.warmup_rounds {
            self.rendezvous()?;
            self.exchange("warm-up round")?;
        }
        Ok(())
    }

    fn measured_rounds(&mut self) -> AppResult<Vec<Measurement>> {
        if self.identity == 0 {
            info!("Testing...");
        }
        let iterations = self.params.iterations_usize();
        let mut measurements = Vec::with_capacity(iterations);
        let plan = DelayPlan::new(
            self.params.delay_mode,
            self.params.delay(),
            self.identity,
            self.params.peer_count_usize(),
        );
        let mut rng = StdRng::seed_from_u64(jitter_seed(self.identity));
        let pacer = self
            .params
            .rate_limit
            .map(|rate| RatePacer::new(&self.clock, self.clock.now(), u64::from(rate)));

        for round in 0..iterations {
            let arrival = self.rendezvous()?;
            if round == 0
                && arrival.is_leader()
                && let Some(window) = self.window
            {
                debug!("Measured rounds start at rendezvous {}.", arrival.generation());
                window.open();
            }

            let start = self.clock.now();
            let applied_delay = if plan.is_enabled() {
                sleep_at_least(&self.clock, plan.target_ticks(&mut rng))
            } else {
                0
            };
            self.exchange("measured round")?;
            let stop = self.clock.now();

            if stop <= start {
                return Err(AppError::session(SessionError::RoundOrdering {
                    peer: self.identity,
                    round,
                    start,
                    stop,
                }));
            }
            measurements.push(Measurement {
                start,
                stop,
                applied_delay,
            });

            if let Some(pacer) = &pacer {
                pacer.wait_after(&self.clock, u64::try_from(round).unwrap_or(u64::MAX));
            }
        }
        Ok(measurements)
    }

    fn collect_report(&mut self) -> AppResult<Option<u32>> {
        let endpoint = self.endpoint();
        let report: PeerReport =
            recv_record(&mut self.transport, endpoint, "receive peer report")?;
        match report.count() {
            Some(count) => debug!("Peer {} reported {} retransmits.", self.identity, count),
            None => debug!("Peer {} has no retransmit counter.", self.identity),
        }
        Ok(report.count())
    }

    fn rendezvous(&self) -> AppResult<BarrierWaitResult> {
        self.barrier.wait().map_err(|_aborted| {
            AppError::session(SessionError::BarrierAborted {
                peer: self.identity,
            })
        })
    }

    fn exchange(&mut self, context: &'static str) -> AppResult<()> {
        let endpoint = self.endpoint();
        self.transport
            .send_exact(&self.fan_out)
            .and_then(|()| self.transport.recv_exact(&mut self.fan_in))
            .map_err(|err| AppError::protocol(ProtocolError::from_io(endpoint, context, err)))
    }
}
