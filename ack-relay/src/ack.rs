//! Classification of inbound bytes while a record awaits its acknowledgment.
//!
//! The peer confirms a record by sending the literal token [`ACK_TOKEN`].
//! Every chunk returned by one read is judged on its own:
//! - decode as UTF-8, dropping any invalid byte sequence (never fails),
//! - trim surrounding whitespace,
//! - compare for exact, case-sensitive equality with `"OK"`.
//!
//! Anything else is a [`Reply::Ignored`] message.  It neither advances nor
//! aborts the protocol.

/// The only acknowledgment the peer can send.
pub const ACK_TOKEN: &str = "OK";

/// Verdict on one inbound chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The chunk is a valid acknowledgment.
    Ack,
    /// Any other content, decoded and trimmed (kept for logging).
    Ignored(String),
}

impl Reply {
    pub fn is_ack(&self) -> bool {
        matches!(self, Reply::Ack)
    }
}

/// Decode `bytes` as UTF-8, skipping undecodable sequences.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

/// Classify one inbound chunk.
pub fn classify(bytes: &[u8]) -> Reply {
    let text = decode_lossy(bytes);
    let text = text.trim();
    if text == ACK_TOKEN {
        Reply::Ack
    } else {
        Reply::Ignored(text.to_owned())
    }
}
