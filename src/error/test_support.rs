use super::{ConfigError, ProtocolError, SessionError, StatsError, ValidationError};

impl From<&'static str> for ValidationError {
    fn from(message: &'static str) -> Self {
        ValidationError::TestExpectation { message }
    }
}

impl From<String> for ValidationError {
    fn from(value: String) -> Self {
        ValidationError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for ConfigError {
    fn from(message: &'static str) -> Self {
        ConfigError::TestExpectation { message }
    }
}

impl From<String> for ConfigError {
    fn from(value: String) -> Self {
        ConfigError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for ProtocolError {
    fn from(message: &'static str) -> Self {
        ProtocolError::TestExpectation { message }
    }
}

impl From<String> for ProtocolError {
    fn from(value: String) -> Self {
        ProtocolError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for SessionError {
    fn from(message: &'static str) -> Self {
        SessionError::TestExpectation { message }
    }
}

impl From<String> for SessionError {
    fn from(value: String) -> Self {
        SessionError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for StatsError {
    fn from(message: &'static str) -> Self {
        StatsError::TestExpectation { message }
    }
}

impl From<String> for StatsError {
    fn from(value: String) -> Self {
        StatsError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}
