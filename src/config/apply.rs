use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{
    PositiveU32, PositiveUsize, ServeArgs, delay_micros, parse_listen_addr, validate_buffer_size,
};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies configuration values to `serve` arguments. Options given on the
/// command line win over the file.
///
/// # Errors
///
/// Returns an error when config values are invalid or conflict with each other.
pub fn apply_config(
    args: &mut ServeArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if config.jitter.is_some() && config.schedule.is_some() {
        return Err(AppError::config(ConfigError::Conflict {
            left: "jitter",
            right: "schedule",
        }));
    }

    if !is_cli(matches, "listen")
        && let Some(listen) = config.listen.as_deref()
    {
        args.listen = parse_listen_addr(listen)
            .map_err(|err| AppError::config(ConfigError::InvalidListen { source: err }))?;
    }

    if !is_cli(matches, "iterations")
        && let Some(value) = config.iterations
    {
        args.iterations = ensure_positive_u32(value, "iterations")?;
    }

    if !is_cli(matches, "rate_limit")
        && let Some(value) = config.rate
    {
        args.rate_limit = Some(ensure_positive_u32(value, "rate")?);
    }

    if !is_cli(matches, "client_limit")
        && let Some(value) = config.clients
    {
        args.client_limit = Some(ensure_positive_u32(value, "clients")?);
    }

    if !is_cli(matches, "no_nagle")
        && let Some(value) = config.no_nagle
    {
        args.no_nagle = value;
    }

    if !is_cli(matches, "send_buffer")
        && let Some(value) = config.send_buffer
    {
        args.send_buffer = Some(ensure_buffer_size(value, "send-buffer")?);
    }

    if !is_cli(matches, "recv_buffer")
        && let Some(value) = config.recv_buffer
    {
        args.recv_buffer = Some(ensure_buffer_size(value, "recv-buffer")?);
    }

    if !is_cli(matches, "fan_out_size")
        && let Some(value) = config.fan_out
    {
        args.fan_out_size = ensure_positive_u32(value, "fan-out")?;
    }

    if !is_cli(matches, "fan_in_size")
        && let Some(value) = config.fan_in
    {
        args.fan_in_size = ensure_positive_u32(value, "fan-in")?;
    }

    if !is_cli(matches, "histogram_file")
        && let Some(path) = config.histogram_file.clone()
    {
        args.histogram_file = Some(path);
    }

    // A delay method on the command line replaces whichever one the file sets.
    let delay_on_cli = is_cli(matches, "jitter") || is_cli(matches, "schedule");
    if !delay_on_cli {
        if let Some(value) = config.jitter {
            args.jitter = Some(ensure_delay(value, "jitter")?);
        }
        if let Some(value) = config.schedule {
            args.schedule = Some(ensure_delay(value, "schedule")?);
        }
    }

    if !is_cli(matches, "report_delay")
        && let Some(value) = config.report_delay
    {
        args.report_delay = value;
    }

    if !is_cli(matches, "histogram_bins")
        && let Some(value) = config.histogram_bins
    {
        args.histogram_bins = PositiveUsize::try_from(value).map_err(|err| {
            AppError::config(ConfigError::FieldMustBePositive {
                field: "histogram-bins",
                source: err,
            })
        })?;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u32(value: u32, field: &'static str) -> AppResult<PositiveU32> {
    PositiveU32::try_from(value)
        .map_err(|err| AppError::config(ConfigError::FieldMustBePositive { field, source: err }))
}

fn ensure_buffer_size(value: u32, field: &'static str) -> AppResult<u32> {
    validate_buffer_size(value)
        .map_err(|err| AppError::config(ConfigError::InvalidValue { field, source: err }))
}

fn ensure_delay(value: u32, field: &'static str) -> AppResult<PositiveU32> {
    let millis = ensure_positive_u32(value, field)?;
    delay_micros(millis)
        .map_err(|err| AppError::config(ConfigError::InvalidValue { field, source: err }))?;
    Ok(millis)
}
