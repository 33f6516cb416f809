use std::time::Duration;

use clap::Parser;

use crate::args::{Command, IncastArgs, PeerArgs, ServeArgs};
use crate::error::{AppError, AppResult, ValidationError};
use crate::protocol::DelayMode;

fn serve(argv: &[&str]) -> AppResult<ServeArgs> {
    let args = IncastArgs::try_parse_from(argv)?;
    match args.command {
        Command::Serve(serve) => Ok(serve),
        Command::Peer(_) => Err(AppError::validation("Expected serve subcommand")),
    }
}

fn peer(argv: &[&str]) -> AppResult<PeerArgs> {
    let args = IncastArgs::try_parse_from(argv)?;
    match args.command {
        Command::Peer(peer) => Ok(peer),
        Command::Serve(_) => Err(AppError::validation("Expected peer subcommand")),
    }
}

#[test]
fn serve_defaults_match_documented_values() -> AppResult<()> {
    let args = serve(&["incast", "serve"])?;
    let settings = args.run_settings()?;
    if settings.iterations != 10_000
        || settings.fan_out_size != 256
        || settings.fan_in_size != 4096
        || !settings.nagle
        || settings.rate_limit.is_some()
        || settings.client_limit.is_some()
        || settings.delay_mode != DelayMode::None
        || settings.histogram
    {
        return Err(AppError::validation(format!(
            "Unexpected defaults: {:?}",
            settings
        )));
    }
    if args.listen.port() != 27779 || args.histogram_bins.get() != 10_000 {
        return Err(AppError::validation("Unexpected listen/bins defaults"));
    }
    Ok(())
}

#[test]
fn serve_flags_map_to_run_settings() -> AppResult<()> {
    let args = serve(&[
        "incast", "serve", "-n", "500", "-r", "200", "-c", "3", "-d", "-o", "64", "-i", "1024",
        "-s", "4", "-f", "hist.csv", "--report-delay", "--send-buffer", "65536",
    ])?;
    let settings = args.run_settings()?;
    if settings.iterations != 500
        || settings.rate_limit != Some(200)
        || settings.client_limit != Some(3)
        || settings.nagle
        || settings.fan_out_size != 64
        || settings.fan_in_size != 1024
        || settings.delay_mode != DelayMode::UniformScheduled
        || settings.delay_us != 4_000
        || !settings.histogram
        || !settings.report_delay
        || settings.send_buffer != Some(65_536)
        || settings.recv_buffer.is_some()
    {
        return Err(AppError::validation(format!(
            "Unexpected settings: {:?}",
            settings
        )));
    }
    Ok(())
}

#[test]
fn jitter_sets_random_delay_mode() -> AppResult<()> {
    let settings = serve(&["incast", "serve", "--jitter", "2"])?.run_settings()?;
    if settings.delay_mode != DelayMode::RandomJitter || settings.delay_us != 2_000 {
        return Err(AppError::validation("Unexpected jitter settings"));
    }
    Ok(())
}

#[test]
fn jitter_and_schedule_conflict() -> AppResult<()> {
    if IncastArgs::try_parse_from(["incast", "serve", "-j", "1", "-s", "1"]).is_ok() {
        return Err(AppError::validation("Expected delay methods to conflict"));
    }
    Ok(())
}

#[test]
fn run_settings_rejects_both_delay_methods() -> AppResult<()> {
    let mut args = serve(&["incast", "serve", "-j", "1"])?;
    args.schedule = args.jitter;
    match args.run_settings() {
        Err(ValidationError::DelayMethodConflict) => Ok(()),
        Err(err) => Err(AppError::validation(format!("Unexpected error: {}", err))),
        Ok(_) => Err(AppError::validation("Expected conflict error")),
    }
}

#[test]
fn zero_iterations_rejected() -> AppResult<()> {
    if IncastArgs::try_parse_from(["incast", "serve", "-n", "0"]).is_ok() {
        return Err(AppError::validation("Expected zero iterations to be rejected"));
    }
    Ok(())
}

#[test]
fn peer_options_from_args() -> AppResult<()> {
    let args = peer(&["incast", "peer", "10.1.1.1", "--once", "--reconnect-ms", "250"])?;
    let options = args.options();
    if options.server != "10.1.1.1:27779"
        || !options.once
        || options.reconnect != Duration::from_millis(250)
    {
        return Err(AppError::validation(format!(
            "Unexpected options: {:?}",
            options
        )));
    }
    Ok(())
}

#[test]
fn global_verbose_after_subcommand() -> AppResult<()> {
    let args = IncastArgs::try_parse_from(["incast", "peer", "host", "-v"])?;
    if !args.verbose {
        return Err(AppError::validation("Expected verbose flag"));
    }
    Ok(())
}
