//! `ack-relay` — ordered, acknowledged, non-retransmitting line delivery.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────┐  records  ┌──────────────┐  frames   ┌──────────┐
//!  │  source  │──────────▶│  AckSender   │──────────▶│   peer   │
//!  │ (CSV col)│           │ (one session)│◀──────────│          │
//!  └────▲─────┘           └──────┬───────┘   "OK"    └──────────┘
//!       │ staged file            │
//!  ┌────┴─────┐           ┌──────▼───────┐
//!  │ staging  │           │    Socket    │  (blocking std TcpStream)
//!  │  (USB)   │           └──────────────┘
//!  └──────────┘
//! ```
//!
//! One record is in flight at a time.  Each is written once, then the sender
//! waits for the peer's `"OK"` before moving on.  The first failure (send
//! error, read error, peer close, or ACK timeout) ends the whole session.
//!
//! Each module has a single responsibility:
//! - [`frame`]   — wire format (STX + header + text + footer + ETX)
//! - [`ack`]     — inbound chunk classification (exact `"OK"` match)
//! - [`timer`]   — monotonic wait budget for one acknowledgment
//! - [`state`]   — per-record state machine types
//! - [`socket`]  — blocking TCP socket abstraction
//! - [`sender`]  — the send / wait-for-ack session loop
//! - [`source`]  — records from the first column of a CSV file
//! - [`staging`] — USB detection and CSV copy
//! - [`relay`]   — end-to-end pipeline used by the binary
//! - [`config`]  — immutable configuration values
//! - [`error`]   — error types

pub mod ack;
pub mod config;
pub mod error;
pub mod frame;
pub mod relay;
pub mod sender;
pub mod socket;
pub mod source;
pub mod staging;
pub mod state;
pub mod timer;

pub use config::{RelayConfig, SenderConfig, StagingConfig};
pub use error::{DeliveryError, RelayError};
pub use frame::FrameFormat;
pub use sender::{deliver, AckSender, DeliveryReport};
