use std::net::TcpStream;

use socket2::SockRef;
use tracing::warn;

use crate::protocol::TestParameters;

/// Socket options applied to both ends of every peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportTuning {
    pub nodelay: bool,
    pub send_buffer: Option<u32>,
    pub recv_buffer: Option<u32>,
}

impl TransportTuning {
    #[must_use]
    pub const fn from_parameters(params: &TestParameters) -> Self {
        Self {
            nodelay: !params.nagle,
            send_buffer: params.send_buffer,
            recv_buffer: params.recv_buffer,
        }
    }

    /// Applies the options to `stream`. Failures are logged and the
    /// connection is used as is.
    pub fn apply(&self, stream: &TcpStream, label: &str) {
        let socket = SockRef::from(stream);
        if self.nodelay
            && let Err(err) = socket.set_nodelay(true)
        {
            warn!("{}: failed to disable Nagle: {}", label, err);
        }
        if let Some(size) = self.send_buffer {
            let requested = usize::try_from(size).unwrap_or(usize::MAX);
            let applied = socket
                .set_send_buffer_size(requested)
                .and_then(|()| socket.send_buffer_size());
            check_buffer(label, "send", requested, applied);
        }
        if let Some(size) = self.recv_buffer {
            let requested = usize::try_from(size).unwrap_or(usize::MAX);
            let applied = socket
                .set_recv_buffer_size(requested)
                .and_then(|()| socket.recv_buffer_size());
            check_buffer(label, "receive", requested, applied);
        }
    }
}

// Some kernels report a larger value than requested (Linux doubles it for
// bookkeeping); only a smaller one means the request was not honoured.
fn check_buffer(label: &str, kind: &str, requested: usize, applied: std::io::Result<usize>) {
    match applied {
        Ok(actual) if actual >= requested => {}
        Ok(actual) => warn!(
            "{}: {} buffer size {} did not take effect (got {}).",
            label, kind, requested, actual
        ),
        Err(err) => warn!("{}: failed to set {} buffer size: {}", label, kind, err),
    }
}
