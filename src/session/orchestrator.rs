use std::future::Future;
use std::net::{IpAddr, SocketAddr, TcpStream};
use std::num::NonZeroUsize;

use tokio::net::TcpListener;
use tracing::{debug, error, info};

use super::results::{PeerResult, RunOutcome};
use super::settings::RunSettings;
use super::worker::{PeerWorker, RetransmitWindow};
use crate::error::{AppError, AppResult, SessionError};
use crate::sync::RendezvousBarrier;
use crate::system::RetransmitCounter;
use crate::timing::Clock;
use crate::transport::TransportTuning;

/// A connection accepted before the run started.
#[derive(Debug)]
pub struct AcceptedPeer {
    pub identity: usize,
    pub addr: SocketAddr,
    pub stream: TcpStream,
}

/// # Errors
///
/// Returns an error when the address cannot be bound.
pub async fn bind_listener(addr: SocketAddr) -> AppResult<TcpListener> {
    let listener = TcpListener::bind(addr).await.map_err(|source| {
        AppError::session(SessionError::Bind {
            addr: addr.to_string(),
            source,
        })
    })?;
    info!("Listening on {}.", listener.local_addr()?);
    Ok(listener)
}

/// Accepts peers until `limit` is reached or `begin` resolves, assigning
/// identities in arrival order.
///
/// Accepted streams are switched to blocking mode for the worker threads.
///
/// # Errors
///
/// Returns an error when accepting fails or no peer connected at all.
pub async fn accept_peers<F>(
    listener: &TcpListener,
    limit: Option<u32>,
    tuning: &TransportTuning,
    begin: F,
) -> AppResult<Vec<AcceptedPeer>>
where
    F: Future<Output = ()>,
{
    tokio::pin!(begin);
    let limit = limit.map(|value| usize::try_from(value).unwrap_or(usize::MAX));
    let mut peers: Vec<AcceptedPeer> = Vec::new();

    loop {
        if let Some(limit) = limit
            && peers.len() >= limit
        {
            info!("Reached limit of {} peers.", limit);
            break;
        }
        tokio::select! {
            biased;
            () = &mut begin => {
                info!("Begin signal received with {} peer(s) connected.", peers.len());
                break;
            }
            accepted = listener.accept() => {
                let (stream, addr) = accepted
                    .map_err(|source| AppError::session(SessionError::Accept { source }))?;
                let stream = stream.into_std()?;
                stream.set_nonblocking(false)?;
                let identity = peers.len();
                tuning.apply(&stream, &format!("peer {}", identity));
                info!("Peer {} connected from {}.", identity, addr);
                peers.push(AcceptedPeer { identity, addr, stream });
            }
        }
    }

    if peers.is_empty() {
        return Err(AppError::session(SessionError::NoPeers));
    }
    Ok(peers)
}

/// Runs one test across every accepted peer and returns the collected
/// measurements.
///
/// Each peer gets its own OS thread; the calling thread blocks until all of
/// them finish. A worker that fails aborts the shared barrier so the others
/// stop at their next rendezvous instead of waiting forever.
///
/// # Errors
///
/// Returns the first root-cause worker error, or an error when there are no
/// peers.
///
/// The coordinator's retransmit delta covers the measured rounds only, like
/// the deltas the peers report.
pub fn run_session(
    peers: Vec<AcceptedPeer>,
    settings: &RunSettings,
    counter: &dyn RetransmitCounter,
) -> AppResult<RunOutcome> {
    let parties = NonZeroUsize::new(peers.len())
        .ok_or_else(|| AppError::session(SessionError::NoPeers))?;
    let peer_count = u32::try_from(peers.len()).map_err(|_err| {
        AppError::session(SessionError::TooManyPeers { count: peers.len() })
    })?;
    let params = settings.parameters(peer_count);
    let barrier = RendezvousBarrier::new(parties);
    let clock = Clock::new();
    let peer_addrs: Vec<IpAddr> = peers.iter().map(|peer| peer.addr.ip()).collect();
    let mut slots: Vec<Option<PeerResult>> = peers.iter().map(|_| None).collect();

    info!("Starting test with {} peer(s).", barrier.parties());
    let window = RetransmitWindow::new(counter);

    let failures: Vec<AppError> = std::thread::scope(|scope| {
        let handles: Vec<_> = peers
            .into_iter()
            .zip(slots.iter_mut())
            .map(|(peer, slot)| {
                let identity = peer.identity;
                let worker = PeerWorker::new(identity, peer.stream, &params, &barrier, clock)
                    .with_retransmit_window(&window);
                let barrier = &barrier;
                let handle = scope.spawn(move || {
                    let _guard = AbortOnPanic(barrier);
                    match worker.run() {
                        Ok(result) => {
                            *slot = Some(result);
                            Ok(())
                        }
                        Err(err) => {
                            barrier.abort();
                            Err(err)
                        }
                    }
                });
                (identity, handle)
            })
            .collect();

        handles
            .into_iter()
            .filter_map(|(identity, handle)| match handle.join() {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err),
                Err(_panic) => Some(AppError::session(SessionError::WorkerPanicked {
                    peer: identity,
                })),
            })
            .collect()
    });

    let coordinator_retransmits = window.close();

    if let Some(err) = root_cause(failures) {
        if barrier.is_aborted() {
            debug!("Remaining peers were released from the barrier.");
        }
        error!("Test aborted: {}", err);
        return Err(err);
    }

    let peers = slots
        .into_iter()
        .enumerate()
        .map(|(identity, slot)| {
            slot.ok_or_else(|| AppError::session(SessionError::ResultMissing { peer: identity }))
        })
        .collect::<AppResult<Vec<PeerResult>>>()?;
    info!("Test complete.");

    Ok(RunOutcome {
        parameters: params,
        ticks_per_second: clock.ticks_per_second(),
        peers,
        peer_addrs,
        coordinator_retransmits,
    })
}

// Barrier aborts are a consequence of another worker failing, so the first
// other error is the one worth reporting.
fn root_cause(failures: Vec<AppError>) -> Option<AppError> {
    let (aborted, causes): (Vec<AppError>, Vec<AppError>) = failures
        .into_iter()
        .partition(|err| matches!(err, AppError::Session(SessionError::BarrierAborted { .. })));
    causes.into_iter().next().or_else(|| aborted.into_iter().next())
}

struct AbortOnPanic<'run>(&'run RendezvousBarrier);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.abort();
        }
    }
}
