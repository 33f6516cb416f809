//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::{Command, IncastArgs, PeerArgs, ServeArgs};
pub use types::{PositiveU32, PositiveU64, PositiveUsize};

pub(crate) use defaults::DEFAULT_CONFIG_FILES;
pub(crate) use parsers::{delay_micros, parse_listen_addr, validate_buffer_size};
