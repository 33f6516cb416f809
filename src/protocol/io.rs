use super::codec::WireRecord;
use crate::error::{Endpoint, ProtocolError};
use crate::transport::Transport;

/// Writes one record to `transport`.
///
/// # Errors
///
/// Returns an error when the record cannot be written in full.
pub fn send_record<R, T>(
    transport: &mut T,
    record: &R,
    endpoint: Endpoint,
    context: &'static str,
) -> Result<(), ProtocolError>
where
    R: WireRecord,
    T: Transport + ?Sized,
{
    let bytes = record.to_bytes();
    transport
        .send_exact(&bytes)
        .map_err(|err| ProtocolError::from_io(endpoint, context, err))
}

/// Reads exactly one record from `transport`.
///
/// # Errors
///
/// Returns an error on a short read, a closed connection, or a malformed
/// record.
pub fn recv_record<R, T>(
    transport: &mut T,
    endpoint: Endpoint,
    context: &'static str,
) -> Result<R, ProtocolError>
where
    R: WireRecord,
    T: Transport + ?Sized,
{
    let mut bytes = vec![0_u8; R::ENCODED_LEN];
    transport
        .recv_exact(&mut bytes)
        .map_err(|err| ProtocolError::from_io(endpoint, context, err))?;
    R::decode(&bytes)
}
