//! Error types.
//!
//! [`DeliveryError`] is the core taxonomy: every variant is fatal to the
//! session and none is retried.  Record indexes are zero-based in the data
//! and one-based ("line N") in messages.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::state::RecordState;

/// Why a delivery session ended early.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Peer unreachable, refused, or its address did not resolve.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Frame write failed after the connection was established.
    #[error("line {}: send failed: {source}", .index + 1)]
    Send {
        index: usize,
        #[source]
        source: io::Error,
    },

    /// Peer shut the connection down while we waited for an acknowledgment.
    #[error("line {}: connection closed by peer", .index + 1)]
    ConnectionClosed { index: usize },

    /// No valid acknowledgment within the wait budget.
    #[error("line {}: no valid ACK within {waited:?}", .index + 1)]
    AckTimeout { index: usize, waited: Duration },

    /// Read failed for a reason other than a slice timeout.
    #[error("line {}: receive failed: {source}", .index + 1)]
    Recv {
        index: usize,
        #[source]
        source: io::Error,
    },
}

impl DeliveryError {
    /// Zero-based index of the record that was in flight, if any.
    pub fn record_index(&self) -> Option<usize> {
        match self {
            Self::Connect { .. } => None,
            Self::Send { index, .. }
            | Self::ConnectionClosed { index }
            | Self::AckTimeout { index, .. }
            | Self::Recv { index, .. } => Some(*index),
        }
    }

    /// Terminal record state this error corresponds to.
    pub fn record_state(&self) -> Option<RecordState> {
        match self {
            Self::Connect { .. } => None,
            Self::Send { .. } => Some(RecordState::SendError),
            Self::ConnectionClosed { .. } => Some(RecordState::ConnClosed),
            Self::AckTimeout { .. } => Some(RecordState::TimedOut),
            Self::Recv { .. } => Some(RecordState::RecvError),
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("host must not be empty")]
    EmptyHost,
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Failure reading the record file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no record file at {0}")]
    NotFound(PathBuf),
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure locating or copying the CSV from removable storage.
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("cannot scan {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Any failure of the end-to-end relay pipeline.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Staging(#[from] StagingError),
    #[error("delivery aborted: {0}")]
    Delivery(#[from] DeliveryError),
}
