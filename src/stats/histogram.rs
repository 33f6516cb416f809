use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::error::StatsError;

/// A value that can be counted by [`Histogram`].
pub trait Sample: Copy + Ord + Hash + fmt::Display {
    fn to_f64(self) -> f64;
}

macro_rules! impl_sample {
    ($($ty:ty),*) => {
        $(
            impl Sample for $ty {
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_sample!(u32, u64, i32, i64);

/// Frequency map from sample value to occurrence count.
///
/// Derived queries are recomputed from the map on every call, so they always
/// reflect the samples added so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram<T: Sample> {
    data: HashMap<T, u64>,
    samples: u64,
}

impl<T: Sample> Default for Histogram<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> Histogram<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            samples: 0,
        }
    }

    pub fn add(&mut self, value: T) {
        let count = self.data.entry(value).or_insert(0);
        *count = count.saturating_add(1);
        self.samples = self.samples.saturating_add(1);
    }

    /// Pointwise sum of both frequency maps and their totals.
    pub fn merge(&mut self, other: &Histogram<T>) {
        for (value, count) in &other.data {
            let slot = self.data.entry(*value).or_insert(0);
            *slot = slot.saturating_add(*count);
        }
        self.samples = self.samples.saturating_add(other.samples);
    }

    #[must_use]
    pub const fn sample_count(&self) -> u64 {
        self.samples
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.samples == 0
    }

    /// Smallest recorded value.
    ///
    /// # Errors
    ///
    /// Returns an error when the histogram is empty.
    pub fn min(&self) -> Result<T, StatsError> {
        self.data
            .keys()
            .copied()
            .min()
            .ok_or(StatsError::EmptyHistogram { query: "min" })
    }

    /// Largest recorded value.
    ///
    /// # Errors
    ///
    /// Returns an error when the histogram is empty.
    pub fn max(&self) -> Result<T, StatsError> {
        self.data
            .keys()
            .copied()
            .max()
            .ok_or(StatsError::EmptyHistogram { query: "max" })
    }

    /// Smallest value whose cumulative count reaches `p` of all samples.
    ///
    /// `percentile(0.0)` is the minimum. Values are walked in ascending order
    /// so ties always resolve to the smallest qualifying value.
    ///
    /// # Errors
    ///
    /// Returns an error when `p` is outside `[0, 1]`, the histogram is empty,
    /// or no value reaches the target.
    pub fn percentile(&self, p: f64) -> Result<T, StatsError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(StatsError::PercentileOutOfRange { value: p });
        }
        if self.is_empty() {
            return Err(StatsError::EmptyHistogram {
                query: "percentile",
            });
        }

        let target = self.samples.to_f64() * p;
        let mut cumulative: u64 = 0;
        for (value, count) in self.sorted() {
            cumulative = cumulative.saturating_add(count);
            if cumulative.to_f64() >= target {
                return Ok(value);
            }
        }

        Err(StatsError::PercentileUndefined {
            value: p,
            samples: self.samples,
        })
    }

    /// # Errors
    ///
    /// Returns an error when the histogram is empty.
    pub fn median(&self) -> Result<T, StatsError> {
        self.percentile(0.5)
    }

    /// Weighted mean, accumulated one bucket at a time.
    ///
    /// # Errors
    ///
    /// Returns an error when the histogram is empty or the running sum stops
    /// being a finite number.
    pub fn mean(&self) -> Result<f64, StatsError> {
        if self.is_empty() {
            return Err(StatsError::EmptyHistogram { query: "mean" });
        }
        let samples = self.samples.to_f64();
        let mut sum = 0.0_f64;
        for (value, count) in self.sorted() {
            let bucket = value.to_f64() * count.to_f64() / samples;
            let next = sum + bucket;
            if !next.is_finite() {
                return Err(StatsError::Overflow { context: "mean" });
            }
            sum = next;
        }
        Ok(sum)
    }

    /// Population standard deviation around [`Histogram::mean`].
    ///
    /// # Errors
    ///
    /// Returns an error when the mean cannot be computed.
    pub fn standard_deviation(&self) -> Result<f64, StatsError> {
        let mean = self.mean()?;
        let mut squared = 0.0_f64;
        for (value, count) in self.sorted() {
            let deviation = value.to_f64() - mean;
            squared += count.to_f64() * deviation * deviation;
        }
        if !squared.is_finite() {
            return Err(StatsError::Overflow {
                context: "standard deviation",
            });
        }
        Ok((squared / self.samples.to_f64()).sqrt())
    }

    /// Buckets the samples into `bins` equal-width bins spanning `[low, high]`.
    ///
    /// Every bin is half-open `[lower, upper)` except the last, which is
    /// closed so that `high` itself lands in it. Samples below `low` count
    /// toward the first bin and samples above `high` toward the last, so the
    /// bin counts always add up to [`Histogram::sample_count`].
    ///
    /// # Errors
    ///
    /// Returns an error when `bins` is zero or `low > high`.
    pub fn histogram_csv(
        &self,
        bins: usize,
        low: T,
        high: T,
    ) -> Result<HistogramCsv, StatsError> {
        if bins == 0 {
            return Err(StatsError::ZeroBins);
        }
        let low = low.to_f64();
        let high = high.to_f64();
        if low > high {
            return Err(StatsError::InvertedRange { low, high });
        }

        let width = (high - low) / usize_to_f64(bins);
        let sorted = self.sorted();
        let mut pending = sorted.iter().peekable();
        let mut cumulative: u64 = 0;
        let mut out = Vec::with_capacity(bins);

        for bin in 1..=bins {
            let last = bin == bins;
            let upper_bound = if last {
                high
            } else {
                low + width * usize_to_f64(bin)
            };
            let mut count: u64 = 0;
            while let Some((_, n)) =
                pending.next_if(|(value, _)| last || value.to_f64() < upper_bound)
            {
                count = count.saturating_add(*n);
            }
            cumulative = cumulative.saturating_add(count);
            out.push(HistogramBin {
                upper_bound,
                count,
                cumulative,
            });
        }

        Ok(HistogramCsv { bins: out })
    }

    /// [`Histogram::histogram_csv`] over the recorded `[min, max]` range.
    ///
    /// # Errors
    ///
    /// Returns an error when the histogram is empty or `bins` is zero.
    pub fn histogram_csv_full(&self, bins: usize) -> Result<HistogramCsv, StatsError> {
        self.histogram_csv(bins, self.min()?, self.max()?)
    }

    /// `value,count` lines in ascending value order.
    #[must_use]
    pub fn raw_csv(&self) -> String {
        self.sorted()
            .into_iter()
            .map(|(value, count)| format!("{},{}\n", value, count))
            .collect()
    }

    fn sorted(&self) -> Vec<(T, u64)> {
        let mut entries: Vec<(T, u64)> = self
            .data
            .iter()
            .map(|(value, count)| (*value, *count))
            .collect();
        entries.sort_unstable_by_key(|(value, _)| *value);
        entries
    }
}

fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub upper_bound: f64,
    pub count: u64,
    pub cumulative: u64,
}

/// Binned view of a histogram; renders as `upper,count,cumulative` lines.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramCsv {
    bins: Vec<HistogramBin>,
}

impl HistogramCsv {
    #[must_use]
    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }
}

impl fmt::Display for HistogramCsv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bin in &self.bins {
            writeln!(f, "{},{},{}", bin.upper_bound, bin.count, bin.cumulative)?;
        }
        Ok(())
    }
}
