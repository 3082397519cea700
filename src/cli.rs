//! Command-line shell.
//!
//! Parses arguments, prompts for interactive input, and renders the outcome
//! of registry and availability-log operations as short status messages.
//! Running without a subcommand starts the monitoring loop, which the binary
//! drives itself.

use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Parser, Subcommand};

use crate::config::{AppConfig, ConfigError};
use crate::registry::{DeviceRegistry, RegistryError};
use crate::storage::{AvailabilityLog, DeviceId};

pub const DEVICE_NOT_FOUND: &str = "DEVICE WITH THIS ID NOT FOUND";
pub const DEVICE_ID_NOT_PROVIDED: &str = "DEVICE ID NOT PROVIDED";
pub const DEVICE_ID_ALREADY_EXISTS: &str = "DEVICE WITH THIS ID ALREADY EXISTS";
pub const DEVICE_ID_NOT_A_NUMBER: &str = "DEVICE ID SHOULD BE A NUMBER";
pub const DEVICE_NAME_IP_NOT_PROVIDED: &str = "DEVICE NAME OR IP IS NOT PROVIDED";
pub const DEVICE_ADDED: &str = "DEVICE ADDED SUCCESSFULLY";
pub const DEVICE_DELETED: &str = "DEVICE DELETED SUCCESSFULLY";
pub const DEVICE_UPDATED: &str = "DEVICE UPDATED SUCCESSFULLY";
pub const UNKNOWN_COMMAND: &str = "UNKNOWN COMMAND";

/// pingwatch - uptime monitor for a handful of hosts
#[derive(Parser, Debug)]
#[command(name = "pingwatch", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "PINGWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Registry document path (overrides config file)
    #[arg(long, env = "PINGWATCH_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Availability log path (overrides config file)
    #[arg(long, env = "PINGWATCH_LOG")]
    pub log: Option<PathBuf>,

    /// Monitoring interval such as `5m` (overrides config file)
    #[arg(long, env = "PINGWATCH_INTERVAL", value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Management command; without one the monitoring loop runs
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// One-shot management commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List every registered device
    ListDevices,
    /// Show one device
    ListDevice { id: DeviceId },
    /// Register a device (prompts for id, name and address)
    AddDevice,
    /// Update a device (prompts for name and address; empty keeps the current value)
    UpdateDevice { id: DeviceId },
    /// Remove a device
    DeleteDevice { id: DeviceId },
    /// Print availability records, optionally only those of one device
    ListAvailability { id: Option<DeviceId> },
}

/// Result of argument parsing.
#[derive(Debug)]
pub enum ParsedArgs {
    /// Arguments are valid.
    Run(Cli),
    /// Arguments are invalid in a way the shell reports with a fixed message.
    Message(&'static str),
    /// Help, version, or any other clap-rendered outcome.
    Clap(clap::Error),
}

/// Parse arguments, translating the common mistakes into shell messages.
pub fn parse_args<I, T>(args: I) -> ParsedArgs
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let err = match Cli::try_parse_from(args) {
        Ok(cli) => return ParsedArgs::Run(cli),
        Err(err) => err,
    };

    match err.kind() {
        ErrorKind::InvalidSubcommand => ParsedArgs::Message(UNKNOWN_COMMAND),
        ErrorKind::MissingRequiredArgument => ParsedArgs::Message(DEVICE_ID_NOT_PROVIDED),
        ErrorKind::ValueValidation | ErrorKind::InvalidValue if is_id_arg(&err) => {
            ParsedArgs::Message(DEVICE_ID_NOT_A_NUMBER)
        }
        _ => ParsedArgs::Clap(err),
    }
}

fn is_id_arg(err: &clap::Error) -> bool {
    matches!(
        err.get(ContextKind::InvalidArg),
        Some(ContextValue::String(arg)) if arg == "<ID>"
    )
}

impl Cli {
    /// Build the effective configuration.
    ///
    /// Precedence: command-line flag, then environment variable (both handled
    /// by clap), then configuration file, then built-in defaults.
    pub fn resolve_config(&self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        if let Some(registry) = &self.registry {
            config.registry_path = registry.clone();
        }
        if let Some(log) = &self.log {
            config.log.path = log.clone();
        }
        if let Some(interval) = self.interval {
            config.monitor.interval = interval;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Run a management command against the registry and log.
///
/// Recoverable registry errors are reported on `out` and are not errors of
/// this function. Storage failures are returned.
pub fn execute<R: BufRead, W: Write>(
    command: &Command,
    registry: &DeviceRegistry,
    log: &AvailabilityLog,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::ListDevices => {
            for device in registry.list()? {
                writeln!(out, "{device}")?;
            }
        }
        Command::ListDevice { id } => match registry.find(*id)? {
            Some(device) => writeln!(out, "{device}")?,
            None => writeln!(out, "{DEVICE_NOT_FOUND}")?,
        },
        Command::AddDevice => {
            let raw_id = prompt(input, out, "Enter Device ID (it must be a number)")?;
            let Ok(id) = raw_id.trim().parse::<DeviceId>() else {
                writeln!(out, "{DEVICE_ID_NOT_A_NUMBER}")?;
                return Ok(());
            };
            let name = prompt(input, out, "Enter Device Name")?;
            let address = prompt(input, out, "Enter Device IP")?;
            report(out, registry.add(id, &name, &address), DEVICE_ADDED)?;
        }
        Command::UpdateDevice { id } => {
            let name = prompt(input, out, "Enter Device Name")?;
            let address = prompt(input, out, "Enter Device IP")?;
            report(out, registry.update(*id, &name, &address), DEVICE_UPDATED)?;
        }
        Command::DeleteDevice { id } => {
            report(out, registry.delete(*id), DEVICE_DELETED)?;
        }
        Command::ListAvailability { id } => {
            let rows = match id {
                Some(id) => log.find_by_device_id(*id)?,
                None => log.load_all()?,
            };
            for row in rows {
                writeln!(out, "{}", row.join(","))?;
            }
        }
    }
    Ok(())
}

/// Print `label`, then read one line without its terminator. End of input
/// reads as empty.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> anyhow::Result<String> {
    write!(out, "{label}: ")?;
    out.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read from standard input")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn report<T, W: Write>(
    out: &mut W,
    result: Result<T, RegistryError>,
    success: &str,
) -> anyhow::Result<()> {
    let message = match result {
        Ok(_) => success,
        Err(RegistryError::Validation) => DEVICE_NAME_IP_NOT_PROVIDED,
        Err(RegistryError::DuplicateId(_)) => DEVICE_ID_ALREADY_EXISTS,
        Err(RegistryError::NotFound(_)) => DEVICE_NOT_FOUND,
        Err(e @ RegistryError::Storage(_)) => return Err(e.into()),
    };
    writeln!(out, "{message}")?;
    Ok(())
}
