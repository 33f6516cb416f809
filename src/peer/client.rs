use std::io::ErrorKind;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::{debug, info};

use super::rounds::{PeerSummary, answer_rounds, receive_handshake};
use crate::error::{AppError, AppResult, ProtocolError};
use crate::system::SystemTcpStats;
use crate::transport::TransportTuning;

/// How a peer finds and keeps talking to its coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerOptions {
    /// `host:port` of the coordinator.
    pub server: String,
    /// Stop after one test instead of waiting for the next.
    pub once: bool,
    pub reconnect: Duration,
}

/// Connects, retrying while the coordinator is not listening yet.
///
/// # Errors
///
/// Returns an error for failures other than a refused or timed-out connect.
pub async fn connect_with_retry(server: &str, reconnect: Duration) -> AppResult<TcpStream> {
    let mut attempts: u64 = 0;
    loop {
        match TcpStream::connect(server).await {
            Ok(stream) => return Ok(stream),
            Err(err)
                if matches!(err.kind(), ErrorKind::ConnectionRefused | ErrorKind::TimedOut) =>
            {
                attempts = attempts.saturating_add(1);
                debug!("Coordinator {} not reachable yet (attempt {}): {}", server, attempts, err);
                tokio::time::sleep(reconnect).await;
            }
            Err(source) => {
                return Err(AppError::protocol(ProtocolError::Connect {
                    addr: server.to_owned(),
                    source,
                }));
            }
        }
    }
}

/// Takes part in tests until one fails, or after the first with `once`.
///
/// # Errors
///
/// Returns an error when connecting fails or a test aborts.
pub async fn run_peer(options: &PeerOptions) -> AppResult<()> {
    loop {
        info!("Connecting to {}...", options.server);
        let stream = connect_with_retry(&options.server, options.reconnect).await?;
        info!("Connected; waiting for the test to start.");
        let stream = stream.into_std()?;
        stream.set_nonblocking(false)?;

        let summary = tokio::task::spawn_blocking(move || run_blocking_test(stream)).await??;
        match summary.retransmits {
            Some(count) => info!(
                "Peer {}: {} rounds, {} retransmits.",
                summary.index, summary.measured_rounds, count
            ),
            None => info!(
                "Peer {}: {} rounds, retransmits unavailable.",
                summary.index, summary.measured_rounds
            ),
        }

        if options.once {
            return Ok(());
        }
    }
}

fn run_blocking_test(mut stream: std::net::TcpStream) -> AppResult<PeerSummary> {
    let handshake = receive_handshake(&mut stream)?;
    TransportTuning::from_parameters(&handshake.params).apply(&stream, "coordinator");
    answer_rounds(&mut stream, &handshake, &SystemTcpStats::new())
}
