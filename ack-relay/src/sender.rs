//! Acknowledged, ordered, non-retransmitting record delivery.
//!
//! [`AckSender`] owns one session: a single TCP connection carried across a
//! whole record sequence.  For each record it
//! 1. encodes the frame and writes it **once**,
//! 2. waits for the peer's `"OK"` inside an [`AckBudget`],
//! 3. moves on only after the acknowledgment arrives.
//!
//! # Contract
//! - At most **one** record is in flight at any moment.
//! - Acknowledgments carry no identifier; they are matched to records purely
//!   by program order, so the peer must answer strictly in turn.
//! - The first non-`ACKED` outcome aborts the session.  The connection is
//!   shut down, the remaining records are never attempted, and nothing is
//!   retried or remembered for a later run.

use std::net::SocketAddr;

use crate::ack::{self, Reply};
use crate::config::SenderConfig;
use crate::error::DeliveryError;
use crate::frame;
use crate::socket::{ReadOutcome, Socket, RECV_BUF};
use crate::state::RecordState;
use crate::timer::AckBudget;

/// Summary of a session in which every record was acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub peer: SocketAddr,
    /// Number of records delivered and acknowledged.
    pub records: usize,
}

// ---------------------------------------------------------------------------
// AckSender
// ---------------------------------------------------------------------------

/// One delivery session.
#[derive(Debug)]
pub struct AckSender {
    config: SenderConfig,
    socket: Socket,
    /// State of the current (or last) record.
    state: RecordState,
    /// Records acknowledged so far; also the index of the next record.
    acked: usize,
    closed: bool,
}

impl AckSender {
    /// Open the session's connection.
    ///
    /// On failure the sequence never begins.
    pub fn connect(config: SenderConfig) -> Result<Self, DeliveryError> {
        let addr = config.addr();
        config
            .validate()
            .map_err(|e| DeliveryError::Connect {
                addr: addr.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            })?;

        let socket = Socket::connect(&config.host, config.port, config.connect_timeout)
            .map_err(|source| {
                log::error!("[tcp] connect error: {addr}: {source}");
                DeliveryError::Connect {
                    addr: addr.clone(),
                    source,
                }
            })?;
        log::info!("[tcp] connected to {addr} ({})", socket.peer_addr);

        Ok(Self {
            config,
            socket,
            state: RecordState::Idle,
            acked: 0,
            closed: false,
        })
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.socket.peer_addr
    }

    /// State of the record currently (or most recently) in flight.
    pub fn state(&self) -> RecordState {
        self.state
    }

    /// Number of records acknowledged in this session.
    pub fn acked(&self) -> usize {
        self.acked
    }

    /// Send `record` once and block until it is acknowledged.
    ///
    /// The record takes the next index in the session.  Any error leaves the
    /// session aborted and its connection shut down; later calls fail fast.
    pub fn send_and_await_ack(&mut self, record: &str) -> Result<(), DeliveryError> {
        let index = self.acked;

        if self.closed || self.state.is_abort() {
            return Err(DeliveryError::Send {
                index,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotConnected,
                    "session already aborted",
                ),
            });
        }

        match self.transmit(index, record) {
            Ok(()) => {
                self.state = RecordState::Acked;
                self.acked += 1;
                Ok(())
            }
            Err(e) => {
                // `record_state` is always `Some` for per-record errors.
                self.state = e.record_state().unwrap_or(RecordState::SendError);
                log::error!("[tcp] {e}; stopping");
                self.shutdown();
                Err(e)
            }
        }
    }

    /// Deliver every record in order, stopping at the first failure.
    ///
    /// The connection is closed before this returns, whatever the outcome.
    pub fn run_sequence<I, S>(mut self, records: I) -> Result<DeliveryReport, DeliveryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let result = records
            .into_iter()
            .try_for_each(|record| self.send_and_await_ack(record.as_ref()));
        self.shutdown();

        result?;
        log::info!(
            "[tcp] all {} line(s) sent successfully; connection closed",
            self.acked
        );
        Ok(DeliveryReport {
            peer: self.socket.peer_addr,
            records: self.acked,
        })
    }

    /// End the session without sending anything more.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if !self.closed {
            self.socket.close();
            self.closed = true;
        }
    }

    /// Write the frame, then wait for its acknowledgment.
    fn transmit(&mut self, index: usize, record: &str) -> Result<(), DeliveryError> {
        let line = index + 1;
        if frame::contains_control_bytes(record) {
            log::warn!("[tcp] line {line} contains STX/ETX bytes; the peer may misframe it");
        }
        let packet = self.config.format.encode(record);

        log::info!("[tcp] sending line {line}: {record}");
        log::debug!("[tcp] packet: {}", packet.escape_ascii());

        self.socket
            .send_frame(&packet)
            .map_err(|source| DeliveryError::Send { index, source })?;
        self.state = RecordState::Sent;
        log::debug!("[tcp] packet sent; waiting for ACK='{}'", ack::ACK_TOKEN);

        self.await_ack(index)
    }

    /// Read until an ACK, a close, a read error, or the budget runs out.
    fn await_ack(&mut self, index: usize) -> Result<(), DeliveryError> {
        let mut budget = AckBudget::start(self.config.ack_timeout);
        let mut buf = [0u8; RECV_BUF];

        while let Some(slice) = budget.next_slice(self.config.read_timeout) {
            let outcome = self
                .socket
                .recv_within(&mut buf, slice)
                .map_err(|source| DeliveryError::Recv { index, source })?;

            match outcome {
                ReadOutcome::Idle => {
                    budget.on_idle_slice();
                    log::debug!(
                        "[tcp] waiting for ACK... ({:.1}s of {:?})",
                        budget.elapsed().as_secs_f64(),
                        budget.total()
                    );
                }
                ReadOutcome::Closed => {
                    return Err(DeliveryError::ConnectionClosed { index });
                }
                ReadOutcome::Data(n) => match ack::classify(&buf[..n]) {
                    Reply::Ack => {
                        log::info!("[tcp] ACK received for line {}", index + 1);
                        return Ok(());
                    }
                    Reply::Ignored(text) => {
                        budget.on_ignored();
                        log::warn!("[tcp] ignored non-ACK message: {text:?}");
                    }
                },
            }
        }

        log::debug!(
            "[tcp] gave up after {} idle slice(s), {} ignored message(s)",
            budget.idle_slices,
            budget.ignored
        );
        Err(DeliveryError::AckTimeout {
            index,
            waited: budget.elapsed(),
        })
    }
}

impl Drop for AckSender {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Connect and deliver `records` in one call.
pub fn deliver<I, S>(config: SenderConfig, records: I) -> Result<DeliveryReport, DeliveryError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    AckSender::connect(config)?.run_sequence(records)
}
