//! M-net command-line driver.
//!
//! # Usage
//!
//! ```bash
//! mnet-cli --address 10.0.0.5:4001 --dst 0x01 read wind-speed
//! mnet-cli --address 10.0.0.5:4001 --dst 0x01 login 1
//! ```
//!
//! This binary is a demonstration surface over [`mnet_client::Client`], one
//! operation per invocation — it does not poll, publish, or serve a
//! dashboard; those are the external monitor application's job (out of scope
//! here).

use std::{process::ExitCode, time::Duration};

use clap::{Parser, Subcommand};
use mnet_client::{Client, ClientError, Command as TurbineCommand, RetryPolicy};
use mnet_core::TcpByteChannel;
use mnet_proto::{
    Averaging, DataPointDescriptor, Timestamp,
    datapoint::{
        CURRENT_STATUS_CODES, GENERATOR_RPM, GRID_CURRENT, GRID_POWER, GRID_VOLTAGE, ROTOR_RPM, RUNTIME_HOURS,
        WIND_SPEED,
    },
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// M-net protocol client
#[derive(Parser, Debug)]
#[command(name = "mnet-cli")]
#[command(about = "Command-line driver for the M-net WP3000/IC1000 client")]
#[command(version)]
struct Args {
    /// Address of the transparent TCP tunnel to the controller (§6.7).
    #[arg(short, long, default_value = "127.0.0.1:4001")]
    address: String,

    /// Controller node address on the M-net bus.
    #[arg(long, default_value = "1")]
    dst: u8,

    /// Host node address this client presents as `SRC`.
    #[arg(long, default_value = "251")]
    src: u8,

    /// Per-request reply timeout, in milliseconds. Defaults to §6.4's 2000ms.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    operation: Operation,
}

#[derive(Subcommand, Debug)]
enum Operation {
    /// Fetch and cache the controller's serial number (mandatory first call).
    Serial,
    /// Authenticate against the controller.
    Login {
        /// Manufacturer code (1 = Mita-Teknik master, §6.5).
        manufacturer_code: u8,
    },
    /// Read a single named data point.
    Read {
        /// Data point name (wind-speed, rotor-rpm, generator-rpm, grid-power,
        /// grid-voltage, grid-current, status-codes, runtime-hours).
        name: String,
        /// Averaging window code (0 = current, §4.5).
        #[arg(long, default_value = "0")]
        averaging: u8,
    },
    /// Read several named data points in one batched request.
    ReadBatch {
        /// Data point names, space separated.
        names: Vec<String>,
    },
    /// Read the controller's current time-of-day.
    TimeGet,
    /// Set the controller's time-of-day to this host's current time.
    TimeSync,
    /// Read up to `limit` recent event-stack entries.
    Events {
        /// Number of entries, most recent first.
        #[arg(default_value = "10")]
        limit: u8,
    },
    /// Read alarm records for the given sub-identifiers.
    Alarms {
        /// Alarm sub-identifiers, space separated.
        sub_ids: Vec<u16>,
    },
    /// Read the remote display buffer as text lines.
    Lcd,
    /// Send a turbine command (requires prior login).
    Command {
        /// start, stop, reset, or manual-start.
        cmd: String,
    },
}

fn resolve_data_point(name: &str) -> Option<DataPointDescriptor> {
    match name.to_ascii_lowercase().as_str() {
        "wind-speed" => Some(WIND_SPEED),
        "rotor-rpm" => Some(ROTOR_RPM),
        "generator-rpm" => Some(GENERATOR_RPM),
        "grid-power" => Some(GRID_POWER),
        "grid-voltage" => Some(GRID_VOLTAGE),
        "grid-current" => Some(GRID_CURRENT),
        "status-codes" => Some(CURRENT_STATUS_CODES),
        "runtime-hours" => Some(RUNTIME_HOURS),
        _ => None,
    }
}

fn resolve_command(name: &str) -> Option<TurbineCommand> {
    match name.to_ascii_lowercase().as_str() {
        "start" => Some(TurbineCommand::Start),
        "stop" => Some(TurbineCommand::Stop),
        "reset" => Some(TurbineCommand::Reset),
        "manual-start" => Some(TurbineCommand::ManualStart),
        _ => None,
    }
}

fn run(args: &Args) -> Result<(), ClientError> {
    let channel = TcpByteChannel::connect(&args.address).map_err(ClientError::Transport)?;
    let mut client = Client::new(channel);
    client.set_host_address(args.src);
    if let Some(timeout_ms) = args.timeout_ms {
        let mut policy = RetryPolicy::default();
        policy.per_request_timeout = Duration::from_millis(timeout_ms);
        client.set_retry_policy(policy);
    }

    // Every operation past `serial` needs the serial/key pair cached first.
    client.get_serial_number(args.dst)?;

    match &args.operation {
        Operation::Serial => {
            tracing::info!(serial = ?client.serial_number(), "serial number");
        },
        Operation::Login { manufacturer_code } => {
            client.login(args.dst, *manufacturer_code)?;
            tracing::info!("authenticated");
        },
        Operation::Read { name, averaging } => {
            let descriptor = resolve_data_point(name)
                .ok_or_else(|| ClientError::Protocol(format!("unknown data point: {name}")))?;
            let value = client.request_data(args.dst, &descriptor, Averaging::from_code(*averaging))?;
            tracing::info!(point = descriptor.name, ?value, "read");
        },
        Operation::ReadBatch { names } => {
            let mut items = Vec::with_capacity(names.len());
            for name in names {
                let descriptor = resolve_data_point(name)
                    .ok_or_else(|| ClientError::Protocol(format!("unknown data point: {name}")))?;
                items.push((descriptor, Averaging::Current));
            }
            let values = client.request_multiple_data(args.dst, &items)?;
            for (descriptor_value, value) in items.iter().zip(values) {
                tracing::info!(point = descriptor_value.0.name, ?value, "read");
            }
        },
        Operation::TimeGet => {
            let ts = client.get_controller_time(args.dst)?;
            tracing::info!(epoch_seconds = ts.epoch_seconds(), "controller time");
        },
        Operation::TimeSync => {
            let now = Timestamp::from_system_time(std::time::SystemTime::now());
            client.set_controller_time(args.dst, now)?;
            tracing::info!(epoch_seconds = now.epoch_seconds(), "controller time synced");
        },
        Operation::Events { limit } => {
            let events = client.get_events_batch(args.dst, *limit)?;
            for event in events {
                tracing::info!(index = event.index, code = event.code, text = %event.text, "event");
            }
        },
        Operation::Alarms { sub_ids } => {
            let records = client.get_alarm_history_batch(args.dst, sub_ids, false)?;
            for record in records {
                tracing::info!(
                    sub_id = record.sub_id,
                    description = %record.description,
                    has_occurred = record.has_occurred,
                    "alarm"
                );
            }
        },
        Operation::Lcd => {
            for (row, line) in client.get_remote_display_text(args.dst)?.iter().enumerate() {
                tracing::info!(row, text = %line, "lcd");
            }
        },
        Operation::Command { cmd } => {
            let command = resolve_command(cmd).ok_or_else(|| ClientError::Protocol(format!("unknown command: {cmd}")))?;
            client.send_command(args.dst, command)?;
            tracing::info!(?command, "command sent");
        },
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "operation failed");
            ExitCode::FAILURE
        },
    }
}
