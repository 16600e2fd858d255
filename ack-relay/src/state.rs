//! Per-record delivery state machine types.
//!
//! Transitions are driven by [`crate::sender::AckSender`]; this module only
//! names the states and which of them end the sequence.
//!
//! ```text
//!  IDLE ──write ok──▶ SENT ──"OK"──────────▶ ACKED ──▶ IDLE (next record)
//!    │                  │
//!    │ write failed     ├──budget spent────▶ TIMED_OUT
//!    ▼                  ├──0-byte read─────▶ CONN_CLOSED
//!  SEND_ERROR           └──read failed─────▶ RECV_ERROR
//! ```

/// Where the record currently in flight stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordState {
    /// No record in flight.
    #[default]
    Idle,
    /// Frame written; waiting for the acknowledgment.
    Sent,
    /// Peer confirmed the record.
    Acked,
    /// Wait budget exhausted without a valid acknowledgment.
    TimedOut,
    /// Peer closed the connection while we were waiting.
    ConnClosed,
    /// Frame could not be written.
    SendError,
    /// Transport-level read failure.
    RecvError,
}

impl RecordState {
    /// `true` for the states that abort the rest of the sequence.
    pub fn is_abort(self) -> bool {
        matches!(
            self,
            Self::TimedOut | Self::ConnClosed | Self::SendError | Self::RecvError
        )
    }
}

impl std::fmt::Display for RecordState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::Sent => "SENT",
            Self::Acked => "ACKED",
            Self::TimedOut => "TIMED_OUT",
            Self::ConnClosed => "CONN_CLOSED",
            Self::SendError => "SEND_ERROR",
            Self::RecvError => "RECV_ERROR",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_failure_states_abort() {
        assert!(!RecordState::Idle.is_abort());
        assert!(!RecordState::Sent.is_abort());
        assert!(!RecordState::Acked.is_abort());
        assert!(RecordState::TimedOut.is_abort());
        assert!(RecordState::ConnClosed.is_abort());
        assert!(RecordState::SendError.is_abort());
        assert!(RecordState::RecvError.is_abort());
    }

    #[test]
    fn display_uses_wire_log_names() {
        assert_eq!(RecordState::default().to_string(), "IDLE");
        assert_eq!(RecordState::ConnClosed.to_string(), "CONN_CLOSED");
    }
}
