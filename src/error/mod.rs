mod app;
mod config;
mod protocol;
mod session;
mod stats;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use protocol::{Endpoint, ProtocolError, RecordField};
pub use session::SessionError;
pub use stats::StatsError;
pub use validation::ValidationError;
