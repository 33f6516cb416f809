use super::RunReport;
use super::latency::LatencyStats;
use crate::error::AppResult;
use crate::protocol::TestParameters;
use crate::stats::Histogram;

/// The "Test parameters" block printed before the results.
#[must_use]
pub fn parameter_lines(params: &TestParameters) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("Test parameters:".to_owned());
    lines.push(format!("\tpeers:                {}", params.peer_count));
    lines.push(format!("\titerations:           {}", params.iterations));
    lines.push(format!(
        "\ttarget iter/sec:      {}",
        params
            .rate_limit
            .map_or_else(|| "unlimited".to_owned(), |rate| rate.to_string())
    ));
    lines.push(format!("\tfan-out size:         {}", params.fan_out_size));
    lines.push(format!("\tfan-in size:          {}", params.fan_in_size));
    lines.push(format!("\tNagle:                {}", on_off(params.nagle)));
    lines.push(format!("\tsend buffer size:     {}", buffer_label(params.send_buffer)));
    lines.push(format!("\treceive buffer size:  {}", buffer_label(params.recv_buffer)));
    if params.delay_enabled() {
        lines.push(format!("\tdelay method:         {}", params.delay_mode.label()));
        lines.push(format!("\tdelay:                {} ms", params.delay().as_millis()));
    }
    lines
}

/// Full report: parameters, latency, throughput and retransmits.
///
/// # Errors
///
/// Returns an error when a latency histogram cannot be summarized.
pub fn report_lines(
    params: &TestParameters,
    report: &RunReport,
    ticks_per_second: u64,
) -> AppResult<Vec<String>> {
    let mut lines = parameter_lines(params);
    let latency = &report.latency;

    lines.push(String::new());
    if latency.exclusive.is_some() {
        lines.push("Latency (inclusive):".to_owned());
    } else {
        lines.push("Latency:".to_owned());
    }
    lines.extend(stat_lines(&latency.inclusive, ticks_per_second)?);

    if let Some(exclusive) = &latency.exclusive {
        lines.push(String::new());
        lines.push("Latency (exclusive):".to_owned());
        lines.extend(stat_lines(exclusive, ticks_per_second)?);
    }
    if let Some(delay) = &latency.delay {
        lines.push(String::new());
        lines.push("Delay:".to_owned());
        lines.extend(stat_lines(delay, ticks_per_second)?);
    }

    let throughput = &report.throughput;
    lines.push(String::new());
    lines.push("Throughput:".to_owned());
    lines.push(format!("\tmbit/sec send:        {:10.3}", throughput.send_mbps));
    lines.push(format!("\tmbit/sec recv:        {:10.3}", throughput.recv_mbps));
    lines.push(format!("\tmbit/sec tot:         {:10.3}", throughput.total_mbps));
    lines.push(format!("\titer/sec:             {:10.3}", throughput.iterations_per_sec));
    if throughput.missed_target()
        && let Some(target) = throughput.target_rate
    {
        lines.push(String::new());
        lines.push(format!("Warning: missed target of {} iterations/sec", target));
    }

    let retransmits = &report.retransmits;
    lines.push(String::new());
    lines.push("Retransmits (system-wide):".to_owned());
    lines.push(format!(
        "\tcoordinator:          {:>3}",
        count_label(retransmits.coordinator)
    ));
    lines.push(format!(
        "\tpeers:                {:>3}",
        count_label(retransmits.peers)
    ));
    lines.push(format!(
        "\ttotal:                {:>3}",
        count_label(retransmits.total())
    ));
    Ok(lines)
}

fn stat_lines(histogram: &Histogram<u64>, ticks_per_second: u64) -> AppResult<Vec<String>> {
    let stats = LatencyStats::from_ticks(histogram, ticks_per_second)?;
    Ok(vec![
        format!("\tminimum usec/iter:    {:10.3}", stats.min),
        format!("\tmaximum usec/iter:    {:10.3}", stats.max),
        format!("\taverage usec/iter:    {:10.3}", stats.mean),
        format!("\tmedian usec/iter:     {:10.3}", stats.median),
        format!("\t95th %ile usec/iter:  {:10.3}", stats.p95),
        format!("\t99th %ile usec/iter:  {:10.3}", stats.p99),
    ])
}

const fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

fn buffer_label(size: Option<u32>) -> String {
    size.map_or_else(|| "OS default".to_owned(), |size| size.to_string())
}

fn count_label(count: Option<u64>) -> String {
    count.map_or_else(|| "n/a".to_owned(), |count| count.to_string())
}
