use thiserror::Error;

use super::{ConfigError, ProtocolError, SessionError, StatsError, ValidationError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("TOML error: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },
    #[error("Join error: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation<E>(error: E) -> Self
    where
        E: Into<ValidationError>,
    {
        error.into().into()
    }

    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    pub fn protocol<E>(error: E) -> Self
    where
        E: Into<ProtocolError>,
    {
        error.into().into()
    }

    pub fn session<E>(error: E) -> Self
    where
        E: Into<SessionError>,
    {
        error.into().into()
    }

    pub fn stats<E>(error: E) -> Self
    where
        E: Into<StatsError>,
    {
        error.into().into()
    }

    /// Peer index the error was raised for, when it is peer-specific.
    #[must_use]
    pub const fn peer(&self) -> Option<usize> {
        match self {
            AppError::Protocol(err) => err.peer(),
            AppError::Session(err) => err.peer(),
            AppError::Io { .. }
            | AppError::Clap { .. }
            | AppError::Json { .. }
            | AppError::Toml { .. }
            | AppError::Join { .. }
            | AppError::Validation(_)
            | AppError::Config(_)
            | AppError::Stats(_) => None,
        }
    }
}
