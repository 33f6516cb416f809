use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

const DRAIN_CHUNK: usize = 4096;

/// Reliable ordered byte channel with exact-size reads and writes.
pub trait Transport {
    /// # Errors
    ///
    /// Returns an error when fewer than `bytes.len()` bytes could be written.
    fn send_exact(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// # Errors
    ///
    /// Returns an error when the stream ends or fails before `bytes` is full.
    fn recv_exact(&mut self, bytes: &mut [u8]) -> io::Result<()>;

    /// Half-closes the write side and waits for the other end to close.
    ///
    /// # Errors
    ///
    /// Returns an error when the shutdown itself fails.
    fn close(&mut self) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn send_exact(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)?;
        self.flush()
    }

    fn recv_exact(&mut self, bytes: &mut [u8]) -> io::Result<()> {
        self.read_exact(bytes)
    }

    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Write)?;
        let mut scratch = [0_u8; DRAIN_CHUNK];
        loop {
            match self.read(&mut scratch) {
                Ok(0) => return Ok(()),
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err)
                    if matches!(
                        err.kind(),
                        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
                    ) =>
                {
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }
    }
}
