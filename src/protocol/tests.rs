use std::collections::VecDeque;
use std::io;

use bytes::BytesMut;

use super::{
    DelayMode, PeerAssignment, PeerReport, TestParameters, WARMUP_ROUNDS, WireRecord,
    recv_record, send_record,
};
use crate::error::{AppError, AppResult, Endpoint, ProtocolError, RecordField};
use crate::transport::Transport;

#[derive(Default)]
struct MemoryTransport {
    inbox: VecDeque<u8>,
}

impl Transport for MemoryTransport {
    fn send_exact(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inbox.extend(bytes);
        Ok(())
    }

    fn recv_exact(&mut self, bytes: &mut [u8]) -> io::Result<()> {
        if self.inbox.len() < bytes.len() {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
        }
        for slot in bytes.iter_mut() {
            *slot = self.inbox.pop_front().unwrap_or_default();
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn sample_parameters() -> TestParameters {
    TestParameters {
        peer_count: 12,
        iterations: 10_000,
        rate_limit: Some(500),
        fan_out_size: 256,
        fan_in_size: 4096,
        client_limit: None,
        delay_us: 2_000,
        delay_mode: DelayMode::UniformScheduled,
        nagle: false,
        send_buffer: None,
        recv_buffer: Some(65_536),
        histogram: true,
        report_delay: false,
        warmup_rounds: WARMUP_ROUNDS,
    }
}

fn expect_invalid(
    result: Result<TestParameters, ProtocolError>,
    expected: RecordField,
) -> AppResult<()> {
    match result {
        Err(ProtocolError::InvalidField { field, .. }) if field == expected => Ok(()),
        Err(err) => Err(AppError::protocol(ProtocolError::TestExpectationValue {
            message: "unexpected decode error",
            value: err.to_string(),
        })),
        Ok(_) => Err(AppError::protocol(ProtocolError::TestExpectationValue {
            message: "decode accepted an invalid field",
            value: expected.to_string(),
        })),
    }
}

#[test]
fn parameters_have_fixed_little_endian_layout() -> AppResult<()> {
    let bytes = sample_parameters().to_bytes();
    if bytes.len() != TestParameters::ENCODED_LEN {
        return Err(AppError::protocol(ProtocolError::TestExpectationValue {
            message: "unexpected encoded length",
            value: bytes.len().to_string(),
        }));
    }
    let prefix = bytes.get(..9).unwrap_or_default();
    if prefix != [12, 0, 0, 0, 0x10, 0x27, 0, 0, 1] {
        return Err(AppError::protocol(ProtocolError::TestExpectationValue {
            message: "unexpected header bytes",
            value: format!("{prefix:?}"),
        }));
    }
    // send_buffer sits after delay_mode and nagle; OS default is -1.
    let send_buffer = bytes.get(32..36).unwrap_or_default();
    if send_buffer != [0xFF, 0xFF, 0xFF, 0xFF] {
        return Err(AppError::protocol("default send buffer not encoded as -1"));
    }
    if TestParameters::decode(&bytes)? != sample_parameters() {
        return Err(AppError::protocol("decoded parameters differ"));
    }
    Ok(())
}

#[test]
fn decode_rejects_non_boolean_flags() -> AppResult<()> {
    let mut bytes = sample_parameters().to_bytes();
    if let Some(nagle) = bytes.get_mut(31) {
        *nagle = 2;
    }
    expect_invalid(TestParameters::decode(&bytes), RecordField::Nagle)
}

#[test]
fn decode_rejects_unknown_delay_mode() -> AppResult<()> {
    let mut bytes = sample_parameters().to_bytes();
    if let Some(mode) = bytes.get_mut(30) {
        *mode = 7;
    }
    expect_invalid(TestParameters::decode(&bytes), RecordField::DelayMode)
}

#[test]
fn decode_rejects_zero_iterations() -> AppResult<()> {
    let mut params = sample_parameters();
    params.iterations = 0;
    expect_invalid(
        TestParameters::decode(&params.to_bytes()),
        RecordField::Iterations,
    )
}

#[test]
fn decode_rejects_wrong_length() -> AppResult<()> {
    let mut bytes = BytesMut::new();
    PeerAssignment { index: 3 }.encode(&mut bytes);
    match TestParameters::decode(&bytes) {
        Err(ProtocolError::RecordLength {
            expected: 46,
            actual: 4,
            ..
        }) => Ok(()),
        Err(err) => Err(AppError::protocol(ProtocolError::TestExpectationValue {
            message: "unexpected decode error",
            value: err.to_string(),
        })),
        Ok(_) => Err(AppError::protocol("short record decoded")),
    }
}

#[test]
fn handshake_records_travel_in_order() -> AppResult<()> {
    let mut transport = MemoryTransport::default();
    let peer = Endpoint::Peer(0);
    send_record(&mut transport, &sample_parameters(), peer, "send parameters")?;
    send_record(&mut transport, &PeerAssignment { index: 5 }, peer, "send identity")?;
    send_record(&mut transport, &PeerReport { retransmits: 17 }, peer, "send report")?;

    let params: TestParameters = recv_record(&mut transport, peer, "recv parameters")?;
    let assignment: PeerAssignment = recv_record(&mut transport, peer, "recv identity")?;
    let report: PeerReport = recv_record(&mut transport, peer, "recv report")?;
    if params != sample_parameters() || assignment.index != 5 || report.retransmits != 17 {
        return Err(AppError::protocol("records arrived out of order"));
    }
    Ok(())
}

#[test]
fn peer_report_reserves_max_for_missing_counter() -> AppResult<()> {
    let cases = [
        (None, u32::MAX, None),
        (Some(0), 0, Some(0)),
        (Some(u64::from(u32::MAX)), u32::MAX - 1, Some(u32::MAX - 1)),
        (Some(u64::MAX), u32::MAX - 1, Some(u32::MAX - 1)),
    ];
    for (delta, wire, count) in cases {
        let report = PeerReport::from_delta(delta);
        if report.retransmits != wire || report.count() != count {
            return Err(AppError::protocol(ProtocolError::TestExpectationValue {
                message: "unexpected peer report",
                value: format!("{delta:?} -> {report:?}"),
            }));
        }
    }
    Ok(())
}

#[test]
fn truncated_stream_is_a_disconnect_for_the_peer() -> AppResult<()> {
    let mut transport = MemoryTransport::default();
    transport.send_exact(&[1, 2])?;
    match recv_record::<PeerReport, _>(&mut transport, Endpoint::Peer(4), "recv report") {
        Err(err @ ProtocolError::Disconnected { .. }) if err.peer() == Some(4) => Ok(()),
        Err(err) => Err(AppError::protocol(ProtocolError::TestExpectationValue {
            message: "unexpected error",
            value: err.to_string(),
        })),
        Ok(_) => Err(AppError::protocol("truncated report decoded")),
    }
}
