use crate::error::{AppError, AppResult, SessionError, StatsError};
use crate::session::{Measurement, RunOutcome};
use crate::stats::Histogram;
use crate::timing::ticks_to_micros;

/// Per-round completion times of a run, in clock ticks.
#[derive(Debug, Clone)]
pub struct LatencyHistograms {
    /// Last stop minus first start of every round, across all peers.
    pub inclusive: Histogram<u64>,
    /// The same span with each peer's injected delay removed from its stop.
    /// Present only when delay injection was on.
    pub exclusive: Option<Histogram<u64>>,
    /// Every applied delay, when delay reporting was requested.
    pub delay: Option<Histogram<u64>>,
    /// Start of the first round and stop of the last one.
    pub first_start: u64,
    pub last_stop: u64,
}

/// Scalars printed for one latency histogram, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,
}

impl LatencyStats {
    /// # Errors
    ///
    /// Returns an error when the histogram is empty or its mean overflows.
    pub fn from_ticks(
        histogram: &Histogram<u64>,
        ticks_per_second: u64,
    ) -> Result<Self, StatsError> {
        let micros = |ticks: f64| ticks_to_micros(ticks, ticks_per_second);
        Ok(Self {
            min: micros(tick_f64(histogram.min()?)),
            max: micros(tick_f64(histogram.max()?)),
            mean: micros(histogram.mean()?),
            median: micros(tick_f64(histogram.median()?)),
            p95: micros(tick_f64(histogram.percentile(0.95)?)),
            p99: micros(tick_f64(histogram.percentile(0.99)?)),
        })
    }
}

fn tick_f64(ticks: u64) -> f64 {
    ticks as f64
}

/// Reduces every peer's measurements to per-round latency histograms.
///
/// # Errors
///
/// Returns an error when a peer recorded fewer rounds than configured, a
/// peer's round stops before it starts, or a round's last stop is not after
/// its first start.
pub fn latency_histograms(outcome: &RunOutcome) -> AppResult<LatencyHistograms> {
    let params = &outcome.parameters;
    let iterations = params.iterations_usize();
    for peer in &outcome.peers {
        if peer.measurements.len() < iterations {
            return Err(AppError::session(SessionError::MissingRounds {
                peer: peer.identity,
                expected: iterations,
                actual: peer.measurements.len(),
            }));
        }
        if let Some((round, measurement)) = peer
            .measurements
            .iter()
            .take(iterations)
            .enumerate()
            .find(|(_, measurement)| measurement.stop <= measurement.start)
        {
            return Err(AppError::session(SessionError::RoundOrdering {
                peer: peer.identity,
                round,
                start: measurement.start,
                stop: measurement.stop,
            }));
        }
    }
    let delay_on = params.delay_enabled();

    let mut inclusive = Histogram::new();
    let mut exclusive = delay_on.then(Histogram::new);
    let mut delay = (delay_on && params.report_delay).then(Histogram::new);
    let mut first_start = None;
    let mut last_stop = 0;

    for round in 0..iterations {
        let measurements: Vec<&Measurement> = outcome
            .peers
            .iter()
            .filter_map(|peer| peer.measurements.get(round))
            .collect();

        let (start, stop) = round_span(round, &measurements, |m| m.stop)?;
        inclusive.add(stop.saturating_sub(start));
        first_start.get_or_insert(start);
        last_stop = stop;

        if let Some(exclusive) = exclusive.as_mut() {
            let (start, stop) = round_span(round, &measurements, Measurement::exclusive_stop)?;
            exclusive.add(stop.saturating_sub(start));
        }
        if let Some(delay) = delay.as_mut() {
            for measurement in &measurements {
                delay.add(measurement.applied_delay);
            }
        }
    }

    Ok(LatencyHistograms {
        inclusive,
        exclusive,
        delay,
        first_start: first_start.unwrap_or_default(),
        last_stop,
    })
}

fn round_span<F>(round: usize, measurements: &[&Measurement], stop_of: F) -> AppResult<(u64, u64)>
where
    F: Fn(&Measurement) -> u64,
{
    let first_start = measurements.iter().map(|m| m.start).min().unwrap_or_default();
    let last_stop = measurements.iter().map(|&m| stop_of(m)).max().unwrap_or_default();
    if last_stop <= first_start {
        return Err(AppError::session(SessionError::RoundSpan {
            round,
            first_start,
            last_stop,
        }));
    }
    Ok((first_start, last_stop))
}
