//! Turns a finished run into latency, throughput and retransmit figures.
mod dump;
mod latency;
mod lines;
mod retransmits;
mod throughput;


pub use dump::write_histogram_dump;
pub use latency::{LatencyHistograms, LatencyStats, latency_histograms};
pub use lines::{parameter_lines, report_lines};
pub use retransmits::{RetransmitSummary, summarize_retransmits};
pub use throughput::{RATE_FUDGE_FACTOR, Throughput};

use crate::error::AppResult;
use crate::session::RunOutcome;

/// Every derived figure of one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub latency: LatencyHistograms,
    pub throughput: Throughput,
    pub retransmits: RetransmitSummary,
}

/// # Errors
///
/// Returns an error when the measurements are inconsistent: a peer missing
/// rounds, or a round whose last stop is not after its first start.
pub fn build_report(outcome: &RunOutcome) -> AppResult<RunReport> {
    let latency = latency_histograms(outcome)?;
    let throughput = Throughput::from_run(outcome, &latency);
    let retransmits = summarize_retransmits(outcome);
    Ok(RunReport {
        latency,
        throughput,
        retransmits,
    })
}
