//! Blocking TCP socket abstraction.
//!
//! [`Socket`] is a thin wrapper around `std::net::TcpStream` that speaks in
//! whole frames outbound and bounded read attempts inbound.  All protocol
//! logic lives in [`crate::sender`]; this module owns only byte I/O.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Size of one receive buffer; an ACK is two bytes plus whitespace.
pub const RECV_BUF: usize = 1024;

/// Result of one bounded read attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were placed at the start of the buffer.
    Data(usize),
    /// The attempt timed out (or was interrupted) with nothing received.
    Idle,
    /// Orderly shutdown by the peer: the read returned zero bytes.
    Closed,
}

/// A connected, blocking stream socket.
#[derive(Debug)]
pub struct Socket {
    /// Address of the peer we are connected to.
    pub peer_addr: SocketAddr,
    inner: TcpStream,
}

impl Socket {
    /// Resolve `host:port` and connect to the first address that answers
    /// within `timeout`.
    ///
    /// Returns the error of the last address tried when none succeeds.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> io::Result<Self> {
        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(inner) => {
                    inner.set_nodelay(true)?;
                    return Ok(Self {
                        peer_addr: addr,
                        inner,
                    });
                }
                Err(e) => {
                    log::debug!("[tcp] connect {addr} failed: {e}");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{host}:{port} did not resolve to any address"),
            )
        }))
    }

    /// Write one frame in full.
    pub fn send_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.inner.write_all(frame)?;
        self.inner.flush()
    }

    /// Make one read attempt bounded by `timeout` (must be non-zero).
    ///
    /// A timeout is reported as [`ReadOutcome::Idle`], not as an error.
    pub fn recv_within(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<ReadOutcome> {
        self.inner.set_read_timeout(Some(timeout))?;
        match self.inner.read(buf) {
            Ok(0) => Ok(ReadOutcome::Closed),
            Ok(n) => Ok(ReadOutcome::Data(n)),
            Err(e) if is_slice_timeout(&e) => Ok(ReadOutcome::Idle),
            Err(e) => Err(e),
        }
    }

    /// Shut both directions down.  Errors (already closed, reset) are ignored.
    pub fn close(&self) {
        if let Err(e) = self.inner.shutdown(Shutdown::Both) {
            log::debug!("[tcp] shutdown: {e}");
        }
    }
}

/// `true` for the errors a read timeout surfaces as.
///
/// Unix reports an expired `SO_RCVTIMEO` as `WouldBlock`, Windows as
/// `TimedOut`.  `Interrupted` is retried the same way.
fn is_slice_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
