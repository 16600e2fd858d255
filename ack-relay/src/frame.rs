//! Wire-format definitions for outbound record frames.
//!
//! Every record sent to the peer travels as exactly one frame.  This module
//! is responsible for:
//! - Serialising a record into the byte sequence that goes on the wire.
//! - Parsing a complete frame back into its record text (peer side, tests).
//! - Splitting an arbitrary inbound byte stream into frames ([`FrameDecoder`]).
//!
//! No I/O happens here — this is pure data transformation.
//!
//! # Wire format
//!
//! ```text
//! +-----+----------------+------------------+----------------+-----+
//! | STX |     header     |   record text    |     footer     | ETX |
//! | 02  | "STM:1:1::1"   |  UTF-8, verbatim |      ":"       | 03  |
//! +-----+----------------+------------------+----------------+-----+
//! ```
//!
//! There is no length prefix and no escaping.  A record that itself contains
//! [`STX`] or [`ETX`] produces an ambiguous frame; see
//! [`contains_control_bytes`].

/// Start-of-text marker opening every frame.
pub const STX: u8 = 0x02;
/// End-of-text marker closing every frame.
pub const ETX: u8 = 0x03;

/// Header string used by the reference deployment.
pub const DEFAULT_HEADER: &str = "STM:1:1::1";
/// Footer string used by the reference deployment.
pub const DEFAULT_FOOTER: &str = ":";

/// Fixed header/footer pair wrapped around every record.
///
/// Neither value is derived from the record; both are configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFormat {
    pub header: String,
    pub footer: String,
}

impl Default for FrameFormat {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_owned(),
            footer: DEFAULT_FOOTER.to_owned(),
        }
    }
}

impl FrameFormat {
    pub fn new(header: impl Into<String>, footer: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            footer: footer.into(),
        }
    }

    /// Number of bytes [`encode`](Self::encode) produces for `record`.
    pub fn encoded_len(&self, record: &str) -> usize {
        2 + self.header.len() + record.len() + self.footer.len()
    }

    /// Serialise `record` into a newly allocated frame.
    ///
    /// Accepts any text; never fails.
    pub fn encode(&self, record: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len(record));
        buf.push(STX);
        buf.extend_from_slice(self.header.as_bytes());
        buf.extend_from_slice(record.as_bytes());
        buf.extend_from_slice(self.footer.as_bytes());
        buf.push(ETX);
        buf
    }

    /// Recover the record text from one complete frame (markers included).
    ///
    /// Returns [`Err`] if:
    /// - the frame does not start with [`STX`] or end with [`ETX`],
    /// - the body is not valid UTF-8, or
    /// - the body does not carry this format's header and footer.
    pub fn decode(&self, frame: &[u8]) -> Result<String, FrameError> {
        let body = match frame {
            [STX, body @ .., ETX] => body,
            _ => return Err(FrameError::MissingMarkers),
        };
        let text = std::str::from_utf8(body).map_err(|_| FrameError::InvalidUtf8)?;
        let rest = text
            .strip_prefix(self.header.as_str())
            .ok_or(FrameError::HeaderMismatch)?;
        let record = rest
            .strip_suffix(self.footer.as_str())
            .ok_or(FrameError::FooterMismatch)?;
        Ok(record.to_owned())
    }
}

/// `true` if `record` contains a byte that would be read as a frame marker.
///
/// Such records are still sent unchanged; the peer may split them wrongly.
pub fn contains_control_bytes(record: &str) -> bool {
    record.bytes().any(|b| b == STX || b == ETX)
}

/// Errors that can arise when parsing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Frame is not delimited by STX ... ETX.
    MissingMarkers,
    /// Frame body is not valid UTF-8.
    InvalidUtf8,
    /// Frame body does not begin with the configured header.
    HeaderMismatch,
    /// Frame body does not end with the configured footer.
    FooterMismatch,
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::MissingMarkers => write!(f, "frame is not delimited by STX/ETX"),
            FrameError::InvalidUtf8 => write!(f, "frame body is not valid UTF-8"),
            FrameError::HeaderMismatch => write!(f, "frame body does not start with header"),
            FrameError::FooterMismatch => write!(f, "frame body does not end with footer"),
        }
    }
}

impl std::error::Error for FrameError {}

// ---------------------------------------------------------------------------
// FrameDecoder
// ---------------------------------------------------------------------------

/// Incremental splitter for a stream of frames.
///
/// Bytes are fed in arbitrary chunks with [`push`](Self::push); complete
/// frames (markers included) come out of [`next_frame`](Self::next_frame).
/// Anything preceding an STX is discarded as line noise.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append freshly received bytes.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pop the next complete frame, or `None` if more bytes are needed.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        let Some(start) = self.buf.iter().position(|&b| b == STX) else {
            self.buf.clear();
            return None;
        };
        if start > 0 {
            self.buf.drain(..start);
        }
        let end = self.buf.iter().position(|&b| b == ETX)?;
        Some(self.buf.drain(..=end).collect())
    }

    /// Bytes held back waiting for the rest of a frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}
