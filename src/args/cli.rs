use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use super::defaults::DEFAULT_LISTEN;
use super::parsers::{
    delay_micros, parse_buffer_size, parse_delay_ms, parse_listen_addr, parse_positive_u32,
    parse_positive_u64, parse_positive_usize, parse_server_address,
};
use super::types::{PositiveU32, PositiveU64, PositiveUsize};
use crate::error::ValidationError;
use crate::peer::PeerOptions;
use crate::protocol::DelayMode;
use crate::session::RunSettings;

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "incast",
    version,
    arg_required_else_help = true,
    about = "Synchronized many-to-one (incast) traffic generator - one coordinator drives N peers through lock-step request/response rounds and reports round latency, throughput, and TCP retransmits."
)]
pub struct IncastArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Coordinate a test: accept peers, run the rounds, print the report
    Serve(ServeArgs),
    /// Join tests run by a coordinator
    Peer(PeerArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Address to accept peers on
    #[arg(long, default_value = DEFAULT_LISTEN, value_parser = parse_listen_addr)]
    pub listen: SocketAddr,

    /// Measured rounds per test
    #[arg(long, short = 'n', default_value = "10000", value_parser = parse_positive_u32)]
    pub iterations: PositiveU32,

    /// Limit the test to this many rounds per second
    #[arg(long = "rate", short = 'r', value_parser = parse_positive_u32)]
    pub rate_limit: Option<PositiveU32>,

    /// Start the test as soon as this many peers have connected
    #[arg(long = "clients", short = 'c', value_parser = parse_positive_u32)]
    pub client_limit: Option<PositiveU32>,

    /// Disable Nagle's algorithm on every connection
    #[arg(long = "no-nagle", short = 'd')]
    pub no_nagle: bool,

    /// Socket send buffer size in bytes (OS default when unset)
    #[arg(long = "send-buffer", value_parser = parse_buffer_size)]
    pub send_buffer: Option<u32>,

    /// Socket receive buffer size in bytes (OS default when unset)
    #[arg(long = "recv-buffer", value_parser = parse_buffer_size)]
    pub recv_buffer: Option<u32>,

    /// Bytes the coordinator sends to each peer per round
    #[arg(long = "fan-out", short = 'o', default_value = "256", value_parser = parse_positive_u32)]
    pub fan_out_size: PositiveU32,

    /// Bytes each peer sends back per round
    #[arg(long = "fan-in", short = 'i', default_value = "4096", value_parser = parse_positive_u32)]
    pub fan_in_size: PositiveU32,

    /// Write binned latency histograms to this file
    #[arg(long = "histogram-file", short = 'f')]
    pub histogram_file: Option<PathBuf>,

    /// Delay each peer's fan-out by a random 0..MSEC every round
    #[arg(
        long,
        short = 'j',
        value_name = "MSEC",
        conflicts_with = "schedule",
        value_parser = parse_delay_ms
    )]
    pub jitter: Option<PositiveU32>,

    /// Spread the peers' fan-outs evenly across MSEC every round
    #[arg(long, short = 's', value_name = "MSEC", value_parser = parse_delay_ms)]
    pub schedule: Option<PositiveU32>,

    /// Also report the distribution of applied delays
    #[arg(long = "report-delay")]
    pub report_delay: bool,

    /// Bins per section in the histogram file
    #[arg(long = "histogram-bins", default_value = "10000", value_parser = parse_positive_usize)]
    pub histogram_bins: PositiveUsize,

    /// Path to config file (TOML/JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ServeArgs {
    /// # Errors
    ///
    /// Returns an error when both delay methods are set or the delay does not
    /// fit the wire format.
    pub fn run_settings(&self) -> Result<RunSettings, ValidationError> {
        let (delay_mode, delay_us) = match (self.jitter, self.schedule) {
            (Some(_), Some(_)) => return Err(ValidationError::DelayMethodConflict),
            (Some(millis), None) => (DelayMode::RandomJitter, delay_micros(millis)?),
            (None, Some(millis)) => (DelayMode::UniformScheduled, delay_micros(millis)?),
            (None, None) => (DelayMode::None, 0),
        };
        Ok(RunSettings {
            iterations: self.iterations.get(),
            rate_limit: self.rate_limit.map(PositiveU32::get),
            fan_out_size: self.fan_out_size.get(),
            fan_in_size: self.fan_in_size.get(),
            client_limit: self.client_limit.map(PositiveU32::get),
            delay_us,
            delay_mode,
            nagle: !self.no_nagle,
            send_buffer: self.send_buffer,
            recv_buffer: self.recv_buffer,
            histogram: self.histogram_file.is_some(),
            report_delay: self.report_delay,
        })
    }
}

#[derive(Debug, Args, Clone)]
pub struct PeerArgs {
    /// Coordinator address, `host` or `host:port`
    #[arg(value_parser = parse_server_address)]
    pub server: String,

    /// Exit after one test instead of reconnecting for the next
    #[arg(long)]
    pub once: bool,

    /// Milliseconds between connection attempts
    #[arg(long = "reconnect-ms", default_value = "100", value_parser = parse_positive_u64)]
    pub reconnect_ms: PositiveU64,
}

impl PeerArgs {
    #[must_use]
    pub fn options(&self) -> PeerOptions {
        PeerOptions {
            server: self.server.clone(),
            once: self.once,
            reconnect: Duration::from_millis(self.reconnect_ms.get()),
        }
    }
}
