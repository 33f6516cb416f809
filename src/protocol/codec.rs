use bytes::{Buf, BufMut, BytesMut};

use super::types::{DelayMode, PeerAssignment, PeerReport, TestParameters};
use crate::error::{ProtocolError, RecordField};

const BUFFER_DEFAULT: i32 = -1;

/// A record with a fixed encoded width.
pub trait WireRecord: Sized {
    const NAME: &'static str;
    const ENCODED_LEN: usize;

    fn encode(&self, buf: &mut BytesMut);

    /// # Errors
    ///
    /// Returns an error when `bytes` is not exactly `ENCODED_LEN` long or a
    /// field holds a value outside its domain.
    fn decode(bytes: &[u8]) -> Result<Self, ProtocolError>;

    #[must_use]
    fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(Self::ENCODED_LEN);
        self.encode(&mut buf);
        buf
    }
}

fn check_len(record: &'static str, expected: usize, bytes: &[u8]) -> Result<(), ProtocolError> {
    if bytes.len() == expected {
        Ok(())
    } else {
        Err(ProtocolError::RecordLength {
            record,
            expected,
            actual: bytes.len(),
        })
    }
}

fn read_flag(record: &'static str, field: RecordField, value: u8) -> Result<bool, ProtocolError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ProtocolError::InvalidField {
            record,
            field,
            value: u64::from(other),
        }),
    }
}

fn read_positive(
    record: &'static str,
    field: RecordField,
    value: u32,
) -> Result<u32, ProtocolError> {
    if value == 0 {
        return Err(ProtocolError::InvalidField {
            record,
            field,
            value: 0,
        });
    }
    Ok(value)
}

fn encode_buffer(size: Option<u32>) -> i32 {
    size.map_or(BUFFER_DEFAULT, |size| i32::try_from(size).unwrap_or(i32::MAX))
}

fn read_buffer(
    record: &'static str,
    field: RecordField,
    value: i32,
) -> Result<Option<u32>, ProtocolError> {
    if value == BUFFER_DEFAULT {
        return Ok(None);
    }
    u32::try_from(value)
        .map(Some)
        .map_err(|_err| ProtocolError::InvalidField {
            record,
            field,
            value: u64::from(value.unsigned_abs()),
        })
}

impl WireRecord for TestParameters {
    const NAME: &'static str = "test parameters";
    const ENCODED_LEN: usize = 46;

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.peer_count);
        buf.put_u32_le(self.iterations);
        buf.put_u8(u8::from(self.rate_limit.is_some()));
        buf.put_u32_le(self.rate_limit.unwrap_or(0));
        buf.put_u32_le(self.fan_out_size);
        buf.put_u32_le(self.fan_in_size);
        buf.put_u8(u8::from(self.client_limit.is_some()));
        buf.put_u32_le(self.client_limit.unwrap_or(0));
        buf.put_u32_le(self.delay_us);
        buf.put_u8(self.delay_mode.tag());
        buf.put_u8(u8::from(self.nagle));
        buf.put_i32_le(encode_buffer(self.send_buffer));
        buf.put_i32_le(encode_buffer(self.recv_buffer));
        buf.put_u8(u8::from(self.histogram));
        buf.put_u8(u8::from(self.report_delay));
        buf.put_u32_le(self.warmup_rounds);
    }

    fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        const RECORD: &str = TestParameters::NAME;
        check_len(RECORD, Self::ENCODED_LEN, bytes)?;
        let mut buf = bytes;

        let peer_count = read_positive(RECORD, RecordField::PeerCount, buf.get_u32_le())?;
        let iterations = read_positive(RECORD, RecordField::Iterations, buf.get_u32_le())?;
        let rate_limited = read_flag(RECORD, RecordField::RateLimited, buf.get_u8())?;
        let target_rate = buf.get_u32_le();
        let rate_limit = if rate_limited {
            Some(read_positive(RECORD, RecordField::TargetRate, target_rate)?)
        } else {
            None
        };
        let fan_out_size = read_positive(RECORD, RecordField::FanOutSize, buf.get_u32_le())?;
        let fan_in_size = read_positive(RECORD, RecordField::FanInSize, buf.get_u32_le())?;
        let clients_limited = read_flag(RECORD, RecordField::ClientsLimited, buf.get_u8())?;
        let client_limit_value = buf.get_u32_le();
        let client_limit = clients_limited.then_some(client_limit_value);
        let delay_us = buf.get_u32_le();
        let delay_tag = buf.get_u8();
        let delay_mode =
            DelayMode::from_tag(delay_tag).ok_or(ProtocolError::InvalidField {
                record: RECORD,
                field: RecordField::DelayMode,
                value: u64::from(delay_tag),
            })?;
        let nagle = read_flag(RECORD, RecordField::Nagle, buf.get_u8())?;
        let send_buffer = read_buffer(RECORD, RecordField::SendBuffer, buf.get_i32_le())?;
        let recv_buffer = read_buffer(RECORD, RecordField::RecvBuffer, buf.get_i32_le())?;
        let histogram = read_flag(RECORD, RecordField::Histogram, buf.get_u8())?;
        let report_delay = read_flag(RECORD, RecordField::ReportDelay, buf.get_u8())?;
        let warmup_rounds = buf.get_u32_le();

        Ok(TestParameters {
            peer_count,
            iterations,
            rate_limit,
            fan_out_size,
            fan_in_size,
            client_limit,
            delay_us,
            delay_mode,
            nagle,
            send_buffer,
            recv_buffer,
            histogram,
            report_delay,
            warmup_rounds,
        })
    }
}

impl WireRecord for PeerAssignment {
    const NAME: &'static str = "peer assignment";
    const ENCODED_LEN: usize = 4;

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.index);
    }

    fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        check_len(Self::NAME, Self::ENCODED_LEN, bytes)?;
        let mut buf = bytes;
        Ok(PeerAssignment {
            index: buf.get_u32_le(),
        })
    }
}

impl WireRecord for PeerReport {
    const NAME: &'static str = "peer report";
    const ENCODED_LEN: usize = 4;

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.retransmits);
    }

    fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        check_len(Self::NAME, Self::ENCODED_LEN, bytes)?;
        let mut buf = bytes;
        Ok(PeerReport {
            retransmits: buf.get_u32_le(),
        })
    }
}
