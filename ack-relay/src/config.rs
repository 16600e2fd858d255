//! Immutable configuration values.
//!
//! Everything the sender needs is handed to it at construction; nothing is
//! read from process-wide state.  Two sessions with different settings can
//! run side by side (as the integration tests do against mock peers).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::frame::FrameFormat;
use crate::timer::{DEFAULT_ACK_BUDGET, DEFAULT_READ_SLICE};

/// Peer address used by the reference deployment.
pub const DEFAULT_HOST: &str = "192.168.50.2";
pub const DEFAULT_PORT: u16 = 1024;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Mount point of the USB stick on the reference device.
pub const DEFAULT_USB_PATH: &str = "/media/pi/USB DEVICE";
/// Where the CSV is staged before sending.
pub const DEFAULT_STAGING_PATH: &str = "/home/pi/usb_project/usb_data.csv";

/// Settings for one delivery session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderConfig {
    pub host: String,
    pub port: u16,
    /// Header/footer wrapped around each record.
    pub format: FrameFormat,
    /// Bound on establishing the connection.
    pub connect_timeout: Duration,
    /// Bound on a single read attempt while waiting for an ACK.
    pub read_timeout: Duration,
    /// Total wait for one record's ACK before the session is aborted.
    pub ack_timeout: Duration,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            format: FrameFormat::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_SLICE,
            ack_timeout: DEFAULT_ACK_BUDGET,
        }
    }
}

impl SenderConfig {
    /// Default settings aimed at `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// `host:port`, as shown in logs and errors.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reject values a socket cannot honour.
    ///
    /// A zero read timeout would mean "block forever" to the OS, so every
    /// timeout must be strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("connect timeout"));
        }
        if self.read_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("read timeout"));
        }
        if self.ack_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("ack timeout"));
        }
        Ok(())
    }
}

/// Where records come from before they reach the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingConfig {
    /// Mount point of the removable drive.
    pub usb_path: PathBuf,
    /// Local copy of the CSV; also the file sent when no drive is present.
    pub staging_path: PathBuf,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            usb_path: PathBuf::from(DEFAULT_USB_PATH),
            staging_path: PathBuf::from(DEFAULT_STAGING_PATH),
        }
    }
}

/// Settings for the full pipeline run by the binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayConfig {
    pub sender: SenderConfig,
    pub staging: StagingConfig,
    /// Send the staged file straight after copying it from the drive.
    ///
    /// Off in the reference deployment: a drive run only stages, and the
    /// next run without the drive sends.
    pub send_after_copy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let cfg = SenderConfig::default();
        assert_eq!(cfg.addr(), "192.168.50.2:1024");
        assert_eq!(cfg.format.header, "STM:1:1::1");
        assert_eq!(cfg.format.footer, ":");
        assert_eq!(cfg.connect_timeout, Duration::from_secs(5));
        assert_eq!(cfg.read_timeout, Duration::from_secs(3));
        assert_eq!(cfg.ack_timeout, Duration::from_secs(300));
        assert!(cfg.validate().is_ok());

        let relay = RelayConfig::default();
        assert!(!relay.send_after_copy);
        assert_eq!(relay.staging.usb_path, PathBuf::from("/media/pi/USB DEVICE"));
    }

    #[test]
    fn new_overrides_only_address() {
        let cfg = SenderConfig::new("127.0.0.1", 9000);
        assert_eq!(cfg.addr(), "127.0.0.1:9000");
        assert_eq!(cfg.ack_timeout, DEFAULT_ACK_BUDGET);
    }

    #[test]
    fn validate_rejects_empty_host() {
        let cfg = SenderConfig::new("  ", 1);
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyHost));
    }

    #[test]
    fn validate_rejects_zero_timeouts() {
        let mut cfg = SenderConfig::default();
        cfg.read_timeout = Duration::ZERO;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTimeout("read timeout")));

        let mut cfg = SenderConfig::default();
        cfg.connect_timeout = Duration::ZERO;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroTimeout("connect timeout"))
        );

        let mut cfg = SenderConfig::default();
        cfg.ack_timeout = Duration::ZERO;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTimeout("ack timeout")));
    }
}
