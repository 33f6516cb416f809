//! Frequency-map histogram and the derived statistics used by the report.
mod histogram;

#[cfg(test)]
mod tests;

pub use histogram::{Histogram, HistogramBin, HistogramCsv, Sample};
