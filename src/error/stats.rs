use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Percentile must be >= 0 and <= 1 (got {value}).")]
    PercentileOutOfRange { value: f64 },
    #[error("Percentile is undefined for {samples} sample(s) at p={value}.")]
    PercentileUndefined { value: f64, samples: u64 },
    #[error("Histogram is empty; cannot compute {query}.")]
    EmptyHistogram { query: &'static str },
    #[error("Overflow while accumulating {context}.")]
    Overflow { context: &'static str },
    #[error("Histogram needs at least one bin.")]
    ZeroBins,
    #[error("Histogram range is inverted (low {low} > high {high}).")]
    InvertedRange { low: f64, high: f64 },
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
