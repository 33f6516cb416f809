use std::net::{IpAddr, SocketAddr};

use super::types::{PositiveU32, PositiveU64, PositiveUsize};
use crate::error::{AppError, AppResult, ValidationError};
use crate::protocol::DEFAULT_PORT;

const MICROS_PER_MILLI: u32 = 1_000;

pub(super) fn parse_positive_u32(s: &str) -> AppResult<PositiveU32> {
    s.parse::<PositiveU32>().map_err(AppError::from)
}

pub(super) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.parse::<PositiveU64>().map_err(AppError::from)
}

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

/// Socket buffer sizes travel as signed 32-bit values.
pub(crate) fn validate_buffer_size(value: u32) -> Result<u32, ValidationError> {
    let max = i32::MAX.unsigned_abs();
    if value > max {
        return Err(ValidationError::ValueTooLarge {
            max: u64::from(max),
        });
    }
    Ok(value)
}

pub(super) fn parse_buffer_size(s: &str) -> AppResult<u32> {
    let value: u32 = s
        .trim()
        .parse()
        .map_err(|err| AppError::validation(ValidationError::InvalidNumber { source: err }))?;
    validate_buffer_size(value).map_err(AppError::from)
}

/// Delay magnitude in microseconds for a millisecond option value.
pub(crate) fn delay_micros(millis: PositiveU32) -> Result<u32, ValidationError> {
    millis
        .get()
        .checked_mul(MICROS_PER_MILLI)
        .ok_or(ValidationError::DelayTooLarge {
            millis: u64::from(millis.get()),
        })
}

pub(super) fn parse_delay_ms(s: &str) -> AppResult<PositiveU32> {
    let millis = parse_positive_u32(s)?;
    delay_micros(millis)?;
    Ok(millis)
}

pub(crate) fn parse_listen_addr(s: &str) -> Result<SocketAddr, ValidationError> {
    s.trim()
        .parse()
        .map_err(|err| ValidationError::InvalidListenAddress {
            value: s.to_owned(),
            source: err,
        })
}

/// Normalizes `host` or `host:port` to `host:port`, filling in the default
/// coordinator port.
pub(super) fn parse_server_address(s: &str) -> Result<String, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::InvalidServerAddress {
            value: s.to_owned(),
        });
    }
    if let Ok(addr) = value.parse::<SocketAddr>() {
        return Ok(addr.to_string());
    }
    if let Ok(ip) = value.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT).to_string());
    }
    match value.rsplit_once(':') {
        Some((host, port)) => {
            if host.is_empty() || host.contains(':') {
                return Err(ValidationError::InvalidServerAddress {
                    value: s.to_owned(),
                });
            }
            let port: u16 = port
                .parse()
                .map_err(|err| ValidationError::InvalidServerPort {
                    value: s.to_owned(),
                    source: err,
                })?;
            Ok(format!("{}:{}", host, port))
        }
        None => Ok(format!("{}:{}", value, DEFAULT_PORT)),
    }
}
