use tracing::{debug, info};

use crate::error::{AppError, AppResult, Endpoint, ProtocolError};
use crate::protocol::{PeerAssignment, PeerReport, TestParameters, recv_record, send_record};
use crate::system::{RetransmitCounter, retransmit_delta};
use crate::transport::Transport;

const COORDINATOR: Endpoint = Endpoint::Coordinator;

/// Parameters and identity received when a test starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerHandshake {
    pub params: TestParameters,
    pub index: u32,
}

/// What a peer saw during one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerSummary {
    pub index: u32,
    pub measured_rounds: u32,
    /// `None` when the platform exposes no retransmit counter.
    pub retransmits: Option<u64>,
}

/// Reads the test parameters and this peer's identity.
///
/// # Errors
///
/// Returns an error on a short read, a malformed record, or an identity
/// outside the announced peer count.
pub fn receive_handshake<T: Transport + ?Sized>(transport: &mut T) -> AppResult<PeerHandshake> {
    let params: TestParameters = recv_record(transport, COORDINATOR, "receive test parameters")?;
    let assignment: PeerAssignment = recv_record(transport, COORDINATOR, "receive peer identity")?;
    if assignment.index >= params.peer_count {
        return Err(AppError::protocol(ProtocolError::PeerIndexOutOfRange {
            index: assignment.index,
            peer_count: params.peer_count,
        }));
    }
    debug!(
        "Assigned peer index {} of {}; {} iterations, fan-out {} B, fan-in {} B.",
        assignment.index,
        params.peer_count,
        params.iterations,
        params.fan_out_size,
        params.fan_in_size
    );
    Ok(PeerHandshake {
        params,
        index: assignment.index,
    })
}

/// Answers every warm-up and measured round, then reports the retransmits
/// observed while the measured rounds ran.
///
/// The transport round trip is the only synchronization: each round waits
/// for the coordinator's fan-out before sending the fan-in.
///
/// # Errors
///
/// Returns an error on any short read or write.
pub fn answer_rounds<T: Transport + ?Sized>(
    transport: &mut T,
    handshake: &PeerHandshake,
    counter: &dyn RetransmitCounter,
) -> AppResult<PeerSummary> {
    let params = &handshake.params;
    let mut fan_out = vec![0_u8; params.fan_out_len()];
    let fan_in = vec![0_u8; params.fan_in_len()];

    for _ in 0..params.warmup_rounds {
        answer_round(transport, &mut fan_out, &fan_in, "warm-up round")?;
    }

    let before = counter.snapshot();
    for _ in 0..params.iterations {
        answer_round(transport, &mut fan_out, &fan_in, "measured round")?;
    }
    let after = counter.snapshot();

    let retransmits = retransmit_delta(before, after);
    let report = PeerReport::from_delta(retransmits);
    send_record(transport, &report, COORDINATOR, "send peer report")?;
    if let Err(err) = transport.close() {
        debug!("Close after test failed: {}", err);
    }
    info!("Test complete as peer {}.", handshake.index);

    Ok(PeerSummary {
        index: handshake.index,
        measured_rounds: params.iterations,
        retransmits,
    })
}

fn answer_round<T: Transport + ?Sized>(
    transport: &mut T,
    fan_out: &mut [u8],
    fan_in: &[u8],
    context: &'static str,
) -> Result<(), ProtocolError> {
    transport
        .recv_exact(fan_out)
        .and_then(|()| transport.send_exact(fan_in))
        .map_err(|err| ProtocolError::from_io(COORDINATOR, context, err))
}
