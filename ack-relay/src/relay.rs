//! End-to-end relay pipeline.
//!
//! Decides where the records come from and hands them to the sender:
//!
//! ```text
//!   USB mounted? ──yes──▶ copy first CSV ──▶ Staged (send only if configured)
//!        │                      └─ none ───▶ NoCsvOnUsb
//!        no
//!        ▼
//!   staging file exists? ──yes──▶ load records ──▶ deliver ──▶ Delivered
//!        └─ no ────────────────▶ NoLocalCsv
//! ```
//!
//! Nothing about delivery progress is persisted.  A failed run is repeated
//! from the first record.

use std::path::{Path, PathBuf};

use crate::config::{RelayConfig, SenderConfig, StagingConfig};
use crate::error::RelayError;
use crate::sender::{self, DeliveryReport};
use crate::source;
use crate::staging;

/// How a pipeline run ended (when it did not fail).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A CSV was copied from the drive and not sent in this run.
    Staged { from: PathBuf, to: PathBuf },
    /// Every record was delivered and acknowledged.
    Delivered(DeliveryReport),
    /// The drive is mounted but holds no CSV.
    NoCsvOnUsb,
    /// No drive, and no previously staged file to send.
    NoLocalCsv,
}

/// Run the pipeline once.
pub fn run(config: &RelayConfig) -> Result<RunOutcome, RelayError> {
    let drive_mounted = staging::is_mounted(&config.staging.usb_path);
    run_with_drive(config, drive_mounted)
}

fn run_with_drive(config: &RelayConfig, drive_mounted: bool) -> Result<RunOutcome, RelayError> {
    let staging_cfg = &config.staging;

    if drive_mounted {
        log::info!("[usb] drive detected at {}", staging_cfg.usb_path.display());
        return stage_and_maybe_send(config);
    }

    log::info!("[usb] no drive detected; checking for local CSV");
    if !staging_cfg.staging_path.exists() {
        log::info!(
            "[relay] no local CSV at {}",
            staging_cfg.staging_path.display()
        );
        return Ok(RunOutcome::NoLocalCsv);
    }
    send_file(&config.sender, &staging_cfg.staging_path).map(RunOutcome::Delivered)
}

/// Copy the drive's CSV into place only.
pub fn stage(config: &StagingConfig) -> Result<RunOutcome, RelayError> {
    match staging::copy_first_csv(&config.usb_path, &config.staging_path)? {
        Some(from) => Ok(RunOutcome::Staged {
            from,
            to: config.staging_path.clone(),
        }),
        None => Ok(RunOutcome::NoCsvOnUsb),
    }
}

fn stage_and_maybe_send(config: &RelayConfig) -> Result<RunOutcome, RelayError> {
    let outcome = stage(&config.staging)?;
    match outcome {
        RunOutcome::Staged { .. } if config.send_after_copy => {
            log::info!("[relay] CSV staged; sending to {}", config.sender.addr());
            send_file(&config.sender, &config.staging.staging_path).map(RunOutcome::Delivered)
        }
        RunOutcome::Staged { .. } => {
            log::info!("[relay] CSV staged; it will be sent on a run without the drive");
            Ok(outcome)
        }
        other => Ok(other),
    }
}

/// Load the records in `path` and deliver them.
///
/// The file is read before any connection is opened, so a bad file never
/// touches the network.
pub fn send_file(config: &SenderConfig, path: &Path) -> Result<DeliveryReport, RelayError> {
    config.validate()?;
    let records = source::load_records(path)?;
    Ok(sender::deliver(config.clone(), &records)?)
}
