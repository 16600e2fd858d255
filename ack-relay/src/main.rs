//! Entry point for `ack-relay`.
//!
//! Parses CLI arguments and dispatches into one of the pipeline modes.  All
//! protocol work is delegated to library modules; `main.rs` owns only process
//! setup (logging, argument parsing, exit status).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use ack_relay::config::{
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_STAGING_PATH, DEFAULT_USB_PATH,
};
use ack_relay::frame::{DEFAULT_FOOTER, DEFAULT_HEADER};
use ack_relay::relay::{self, RunOutcome};
use ack_relay::{FrameFormat, RelayConfig, SenderConfig, StagingConfig};

/// Deliver CSV lines to a peer one at a time, each confirmed by "OK".
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    peer: PeerArgs,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Args)]
struct PeerArgs {
    /// Peer host name or IP address.
    #[arg(long, global = true, env = "ACK_RELAY_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Peer TCP port.
    #[arg(long, global = true, env = "ACK_RELAY_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Text placed between STX and each record.
    #[arg(long, global = true, env = "ACK_RELAY_HEADER", default_value = DEFAULT_HEADER)]
    header: String,

    /// Text placed between each record and ETX.
    #[arg(long, global = true, env = "ACK_RELAY_FOOTER", default_value = DEFAULT_FOOTER)]
    footer: String,

    /// Seconds allowed for the connection to be established.
    #[arg(
        long,
        global = true,
        env = "ACK_RELAY_CONNECT_TIMEOUT_SECS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    connect_timeout_secs: u64,

    /// Seconds one read attempt may block while waiting for an ACK.
    #[arg(
        long,
        global = true,
        env = "ACK_RELAY_READ_TIMEOUT_SECS",
        default_value_t = 3,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    read_timeout_secs: u64,

    /// Seconds to wait for one line's ACK before giving up on the whole run.
    #[arg(
        long,
        global = true,
        env = "ACK_RELAY_ACK_TIMEOUT_SECS",
        default_value_t = 300,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    ack_timeout_secs: u64,
}

impl PeerArgs {
    fn into_config(self) -> SenderConfig {
        SenderConfig {
            host: self.host,
            port: self.port,
            format: FrameFormat::new(self.header, self.footer),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            ack_timeout: Duration::from_secs(self.ack_timeout_secs),
        }
    }
}

#[derive(Args)]
struct PathArgs {
    /// Mount point of the USB drive.
    #[arg(long, env = "ACK_RELAY_USB_PATH", default_value = DEFAULT_USB_PATH)]
    usb_path: PathBuf,

    /// Local path the CSV is staged to (and sent from).
    #[arg(long, env = "ACK_RELAY_STAGING_PATH", default_value = DEFAULT_STAGING_PATH)]
    staging_path: PathBuf,
}

impl PathArgs {
    fn into_config(self) -> StagingConfig {
        StagingConfig {
            usb_path: self.usb_path,
            staging_path: self.staging_path,
        }
    }
}

#[derive(Subcommand)]
enum Mode {
    /// Stage the CSV from the USB drive if present, otherwise send the staged CSV.
    Run {
        #[command(flatten)]
        paths: PathArgs,

        /// Also send the CSV right after copying it from the drive.
        #[arg(long, env = "ACK_RELAY_SEND_AFTER_COPY")]
        send_after_copy: bool,
    },
    /// Send the records of one CSV file.
    Send {
        /// CSV file whose first column holds the records.
        file: PathBuf,
    },
    /// Copy the first CSV from the USB drive to the staging path, nothing else.
    Stage {
        #[command(flatten)]
        paths: PathArgs,
    },
}

fn main() -> Result<()> {
    // Set RUST_LOG to control verbosity; defaults to info.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let sender = cli.peer.into_config();

    match cli.mode {
        Mode::Run {
            paths,
            send_after_copy,
        } => {
            let config = RelayConfig {
                sender,
                staging: paths.into_config(),
                send_after_copy,
            };
            let outcome = relay::run(&config).context("relay run failed")?;
            report(&outcome);
        }
        Mode::Send { file } => {
            let delivered = relay::send_file(&sender, &file)
                .with_context(|| format!("sending {} failed", file.display()))?;
            report(&RunOutcome::Delivered(delivered));
        }
        Mode::Stage { paths } => {
            let outcome = relay::stage(&paths.into_config()).context("staging failed")?;
            report(&outcome);
        }
    }
    Ok(())
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Staged { from, to } => {
            log::info!("[system] staged {} → {}", from.display(), to.display());
        }
        RunOutcome::Delivered(report) => {
            log::info!(
                "[system] delivered {} line(s) to {}",
                report.records,
                report.peer
            );
        }
        RunOutcome::NoCsvOnUsb => log::warn!("[system] CSV not found on USB"),
        RunOutcome::NoLocalCsv => log::warn!("[system] no local CSV file available to send"),
    }
}
