use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Value must be <= {max}.")]
    ValueTooLarge { max: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Cannot combine --jitter with --schedule; pick one delay method.")]
    DelayMethodConflict,
    #[error("Delay of {millis} ms does not fit the wire format.")]
    DelayTooLarge { millis: u64 },
    #[error("Invalid server address '{value}'.")]
    InvalidServerAddress { value: String },
    #[error("Invalid server port in '{value}': {source}")]
    InvalidServerPort {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid listen address '{value}': {source}")]
    InvalidListenAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("Failed to build runtime: {source}")]
    RuntimeBuildFailed {
        #[source]
        source: std::io::Error,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
